// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod acquire;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod store;
pub mod taxonomy;
pub mod utils;

pub use acquire::{DocumentKind, DocumentSource, FileScanner, ScannedFile, TextAcquirer};
pub use config::{Config, LlmConfig, PipelineConfig, SearchConfig, StorageConfig};
pub use error::{PipelineError, Result};
pub use llm::{GroqChatClient, ProfileExtractor, TextFixer, VisionOcr};
pub use models::{
    AnalysisSummary, CandidateAnalysis, DocumentRecord, DocumentStatus, ExperienceLevel, Tag,
};
pub use pipeline::{
    AnalysisOutcome, AnalysisPipeline, BatchCoordinator, BatchOutcome, PipelineStats,
    ProgressTracker,
};
pub use search::{SearchEngine, SearchPage, SearchQuery};
pub use store::{
    ArtifactStore, DocumentStore, FsArtifactStore, JsonFileStore, MemoryArtifactStore, MemoryStore,
};
pub use taxonomy::{derive_tag_strings, derive_tags};
pub use utils::Validator;
