// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use talent_scan::{
    AnalysisPipeline, BatchCoordinator, BatchOutcome, Config, DocumentRecord, DocumentSource,
    DocumentStatus, FileScanner, FsArtifactStore, GroqChatClient, JsonFileStore, PipelineStats,
    ProgressTracker, SearchEngine, SearchQuery, TextAcquirer, Validator,
};
use talent_scan::store::{ArtifactStore, DocumentStore};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "talent_scan")]
#[command(version = "0.1.0")]
#[command(about = "Resume analysis pipeline with tag taxonomy and candidate search", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a resume file or a directory of resumes
    Ingest {
        path: PathBuf,

        /// Run the analysis pipeline immediately after ingestion
        #[arg(long)]
        analyze: bool,

        #[arg(long, value_name = "NUM")]
        limit: Option<usize>,
    },

    /// Run the analysis pipeline for one document
    Analyze {
        id: String,
    },

    /// Analyze every document that is not yet completed
    Batch {
        /// Re-analyze completed documents as well
        #[arg(long)]
        all: bool,
    },

    /// Search stored candidate records
    Search {
        /// Free-text term (ranked by relevance when present)
        query: Option<String>,

        /// Required tag, repeatable; records must carry all of them
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        min_age: Option<u8>,

        #[arg(long)]
        max_age: Option<u8>,

        #[arg(long)]
        min_salary: Option<u32>,

        #[arg(long)]
        max_salary: Option<u32>,

        #[arg(short, long, default_value_t = 1)]
        page: usize,

        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Print one document record as JSON
    Show {
        id: String,
    },

    Stats,

    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

struct App {
    config: Config,
    store: Arc<JsonFileStore>,
    artifacts: Arc<FsArtifactStore>,
    pipeline: Arc<AnalysisPipeline>,
}

impl App {
    fn build(config: Config) -> Result<Self> {
        let store = Arc::new(
            JsonFileStore::new(&config.storage.data_dir).context("Failed to open record store")?,
        );
        let artifacts = Arc::new(
            FsArtifactStore::new(&config.storage.artifact_dir)
                .context("Failed to open artifact store")?,
        );

        if config.llm.api_key.is_none() {
            warn!("No API key configured; OCR, fixer, and extractor calls will fail");
        }

        let client = Arc::new(GroqChatClient::new(config.llm.clone()));
        let pipeline = Arc::new(AnalysisPipeline::new(
            store.clone(),
            artifacts.clone(),
            TextAcquirer::new(client.clone()),
            client.clone(),
            client,
            Duration::from_secs(config.pipeline.capability_timeout_secs),
        ));

        Ok(Self {
            config,
            store,
            artifacts,
            pipeline,
        })
    }

    fn coordinator(&self) -> BatchCoordinator {
        BatchCoordinator::new(self.pipeline.clone(), self.config.pipeline.parallel_workers)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    talent_scan::utils::logging::init_logger(cli.color, cli.verbose);

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Ingest {
            path,
            analyze,
            limit,
        } => {
            cmd_ingest(config, path, analyze, limit).await?;
        }
        Commands::Analyze { id } => {
            cmd_analyze(config, &id).await?;
        }
        Commands::Batch { all } => {
            cmd_batch(config, all).await?;
        }
        Commands::Search {
            query,
            tags,
            name,
            department,
            min_age,
            max_age,
            min_salary,
            max_salary,
            page,
            page_size,
        } => {
            let search = SearchQuery {
                term: query,
                tags,
                name,
                department,
                age_min: min_age,
                age_max: max_age,
                salary_min: min_salary,
                salary_max: max_salary,
                page,
                page_size: page_size.unwrap_or(config.search.page_size),
            };
            cmd_search(config, search).await?;
        }
        Commands::Show { id } => {
            cmd_show(config, &id).await?;
        }
        Commands::Stats => {
            cmd_stats(config).await?;
        }
        Commands::Reset { confirm } => {
            cmd_reset(config, confirm).await?;
        }
    }

    Ok(())
}

async fn ingest_one(app: &App, source: DocumentSource) -> Result<String> {
    if let DocumentSource::Path(path) = &source {
        Validator::validate_file_path(path)?;
    }

    let http = reqwest::Client::new();
    let max_bytes = (app.config.pipeline.max_file_size_mb as u64) * 1024 * 1024;
    let bytes = source.load_bytes(&http, max_bytes).await?;

    let file_id = DocumentRecord::compute_file_id(&bytes);
    app.artifacts.put(&file_id, &bytes).await?;

    let filename = source.filename();
    let record = DocumentRecord::new(filename.clone(), file_id);
    let id = app.store.insert(record).await?;

    info!("Ingested {} as {}", filename, id);
    Ok(id)
}

async fn cmd_ingest(
    config: Config,
    path: PathBuf,
    analyze: bool,
    limit: Option<usize>,
) -> Result<()> {
    let app = App::build(config)?;
    let path_str = path.to_string_lossy();

    let sources: Vec<DocumentSource> = if path_str.starts_with("http://")
        || path_str.starts_with("https://")
    {
        vec![DocumentSource::Url(path_str.into_owned())]
    } else if path.is_dir() {
        let scanner = FileScanner::new(app.config.pipeline.clone());
        let scanned = scanner
            .scan_directory(&path)
            .context("Failed to scan directory")?;
        scanned
            .into_iter()
            .map(|f| DocumentSource::Path(f.path))
            .collect()
    } else {
        vec![DocumentSource::Path(path)]
    };

    let sources: Vec<DocumentSource> = match limit {
        Some(limit) => sources.into_iter().take(limit).collect(),
        None => sources,
    };

    if sources.is_empty() {
        warn!("No resume files found to ingest");
        return Ok(());
    }

    let total = sources.len();
    let mut ids = Vec::new();
    for source in sources {
        let label = source.filename();
        match ingest_one(&app, source).await {
            Ok(id) => ids.push(id),
            Err(e) => warn!("Failed to ingest {}: {}", label, e),
        }
    }

    info!("Ingested {} of {} files", ids.len(), total);

    if analyze && !ids.is_empty() {
        let progress = Arc::new(ProgressTracker::new(ids.len()));
        let outcomes = app
            .coordinator()
            .analyze_many(ids, Some(progress.clone()))
            .await;

        let stats = progress.get_stats();
        progress.finish();
        log_final_stats(&stats);

        for (id, outcome) in &outcomes {
            if let BatchOutcome::Failed(reason) = outcome {
                warn!("Document {} failed: {}", id, reason);
            }
        }
    }

    Ok(())
}

async fn cmd_analyze(config: Config, id: &str) -> Result<()> {
    Validator::validate_document_id(id)?;
    let app = App::build(config)?;

    let outcome = app.pipeline.analyze(id).await?;

    println!("\nAnalysis complete for {}", outcome.document_id);
    println!("Tags ({}):", outcome.tags.len());
    for tag in &outcome.tags {
        println!("  {}", tag);
    }

    Ok(())
}

async fn cmd_batch(config: Config, all: bool) -> Result<()> {
    let app = App::build(config)?;

    let ids: Vec<String> = app
        .store
        .list()
        .await
        .context("Record store unreachable")?
        .into_iter()
        .filter(|r| all || r.status != DocumentStatus::Completed)
        .map(|r| r.id)
        .collect();

    if ids.is_empty() {
        info!("Nothing to analyze");
        return Ok(());
    }

    info!("Analyzing {} documents", ids.len());
    let progress = Arc::new(ProgressTracker::new(ids.len()));
    let outcomes = app
        .coordinator()
        .analyze_many(ids, Some(progress.clone()))
        .await;

    let stats = progress.get_stats();
    progress.finish();
    log_final_stats(&stats);

    let failed: Vec<_> = outcomes
        .iter()
        .filter_map(|(id, o)| match o {
            BatchOutcome::Failed(reason) => Some((id, reason)),
            BatchOutcome::Completed(_) => None,
        })
        .collect();
    for (id, reason) in failed {
        warn!("Document {} failed: {}", id, reason);
    }

    Ok(())
}

async fn cmd_search(config: Config, query: SearchQuery) -> Result<()> {
    let app = App::build(config)?;
    let engine = SearchEngine::new(app.store.clone());

    let page = engine.search(&query).await?;

    if page.records.is_empty() {
        println!("\nNo matching candidates (page {} of {})\n", page.page, page.pages);
        return Ok(());
    }

    println!(
        "\nCandidates: page {} of {} ({} total)\n",
        page.page, page.pages, page.total
    );
    println!("{}", "=".repeat(80));

    for (idx, record) in page.records.iter().enumerate() {
        let name = match (&record.first_name, &record.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => record.filename.clone(),
        };

        println!(
            "\n{}. {} [{}]",
            (query.page - 1) * query.page_size + idx + 1,
            name,
            record.id
        );
        println!("   File: {} | Status: {:?}", record.filename, record.status);
        if let Some(department) = &record.department {
            println!("   Department: {}", department);
        }
        if !record.tags.is_empty() {
            println!(
                "   Tags: {}",
                Validator::truncate_text(&record.tags.join(", "), 120)
            );
        }
        if let Some(error) = &record.error {
            println!("   Error: {}", error);
        }
    }

    println!("\n{}", "=".repeat(80));

    Ok(())
}

async fn cmd_show(config: Config, id: &str) -> Result<()> {
    Validator::validate_document_id(id)?;
    let app = App::build(config)?;

    let record = app
        .store
        .get(id)
        .await?
        .with_context(|| format!("No record with id {}", id))?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn cmd_stats(config: Config) -> Result<()> {
    let app = App::build(config)?;

    let records = app
        .store
        .list()
        .await
        .context("Record store unreachable")?;

    let completed = records
        .iter()
        .filter(|r| r.status == DocumentStatus::Completed)
        .count();
    let failed = records
        .iter()
        .filter(|r| r.status == DocumentStatus::Error)
        .count();
    let pending = records.len() - completed - failed;
    let total_tags: usize = records.iter().map(|r| r.tags.len()).sum();

    info!("Stored documents: {}", records.len());
    info!("  Completed: {}", completed);
    info!("  Failed: {}", failed);
    info!("  Pending/processing: {}", pending);
    info!("Total tags: {}", total_tags);

    Ok(())
}

async fn cmd_reset(config: Config, confirm: bool) -> Result<()> {
    if !confirm {
        anyhow::bail!("This will delete all records. Use --confirm to proceed");
    }

    warn!("Resetting record store - all records will be lost");

    let app = App::build(config)?;
    app.store.clear().await.context("Failed to clear records")?;

    info!("Record store cleared");
    Ok(())
}

fn log_final_stats(stats: &PipelineStats) {
    info!("=== Batch Analysis Summary ===");
    info!("Duration: {} seconds", stats.duration_secs);
    info!("Documents completed: {}", stats.documents_completed);
    info!("Documents failed: {}", stats.documents_failed);
    info!("Success rate: {:.2}%", stats.success_rate());
    info!("Tags derived: {}", stats.tags_derived);
    info!(
        "Processing speed: {:.2} documents/sec",
        stats.documents_per_second()
    );
    info!("==============================");
}
