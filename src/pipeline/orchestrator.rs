// file: src/pipeline/orchestrator.rs
// description: sequences acquisition, normalization, extraction, and derivation per document
// reference: orchestrates the per-document analysis workflow

use crate::acquire::TextAcquirer;
use crate::error::{PipelineError, Result};
use crate::llm::{ProfileExtractor, TextFixer};
use crate::models::{AnalysisSummary, CandidateAnalysis, DocumentRecord};
use crate::store::{ArtifactStore, DocumentStore, fixed_text_key, original_text_key};
use crate::taxonomy::derive_tag_strings;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Result of a fully-completed analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub document_id: String,
    pub tags: Vec<String>,
    pub summary: AnalysisSummary,
}

/// Per-document pipeline. Each stage persists its artifact before the next
/// stage starts, so a failure at any point leaves every earlier checkpoint
/// on disk. All stage writes are whole-field overwrites, which is what
/// makes re-running `analyze` on any document safe.
pub struct AnalysisPipeline {
    store: Arc<dyn DocumentStore>,
    artifacts: Arc<dyn ArtifactStore>,
    acquirer: TextAcquirer,
    fixer: Arc<dyn TextFixer>,
    extractor: Arc<dyn ProfileExtractor>,
    capability_timeout: Duration,
}

impl AnalysisPipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        artifacts: Arc<dyn ArtifactStore>,
        acquirer: TextAcquirer,
        fixer: Arc<dyn TextFixer>,
        extractor: Arc<dyn ProfileExtractor>,
        capability_timeout: Duration,
    ) -> Self {
        Self {
            store,
            artifacts,
            acquirer,
            fixer,
            extractor,
            capability_timeout,
        }
    }

    /// Run the full analysis for one document. `Ok` if and only if the
    /// record ends in `Completed`; every stage failure lands the record in
    /// `Error` with a stage-prefixed reason and returns that error.
    pub async fn analyze(&self, document_id: &str) -> Result<AnalysisOutcome> {
        let mut record = self
            .store
            .get(document_id)
            .await?
            .ok_or_else(|| PipelineError::Storage(format!("no record with id {}", document_id)))?;

        info!("Analyzing document {} ({})", record.id, record.filename);

        record.mark_processing();
        self.store.update(&record).await?;

        // Stage 1: acquire text from the stored raw bytes
        let bytes = match self.artifacts.get(&record.file_id).await? {
            Some(bytes) => bytes,
            None => {
                let err = PipelineError::Acquisition("raw document bytes missing".to_string());
                return Err(self.fail(&mut record, "acquisition", err).await);
            }
        };

        let acquired = match self
            .with_timeout("acquisition", self.acquirer.acquire(&bytes))
            .await
        {
            Ok(acquired) => acquired,
            Err(e) => return Err(self.fail(&mut record, "acquisition", e).await),
        };

        // Stage 2: checkpoint the raw extracted text
        let original_key = original_text_key(&record.id);
        self.artifacts
            .put(&original_key, acquired.text.as_bytes())
            .await?;
        record.original_text_key = Some(original_key);
        self.store.update(&record).await?;

        // Stage 3: normalize. Failure is non-fatal for the text: the
        // pipeline continues on the raw text and the record surfaces the
        // failure at the end.
        let mut normalization_failure: Option<String> = None;
        let working_text = match self
            .with_timeout("normalization", self.fixer.fix_text(&acquired.text))
            .await
        {
            Ok(fixed) => {
                // Stage 4: checkpoint the normalized text
                let fixed_key = fixed_text_key(&record.id);
                self.artifacts.put(&fixed_key, fixed.as_bytes()).await?;
                record.fixed_text_key = Some(fixed_key);
                self.store.update(&record).await?;
                fixed
            }
            Err(e) => {
                warn!("Normalization failed for {}, using raw text: {}", record.id, e);
                normalization_failure = Some(format!("normalization failed: {}", e));
                acquired.text.clone()
            }
        };

        // Stage 5: structured extraction
        let analysis = match self
            .with_timeout("extraction", self.extractor.extract_profile(&working_text))
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => return Err(self.fail(&mut record, "extraction", e).await),
        };

        // Stage 6: pure derivation; cannot fail on a validated profile
        let tags = derive_tag_strings(&analysis);
        let summary = AnalysisSummary::from_analysis(&analysis);
        let parsed_data = serde_json::to_value(&analysis)?;

        apply_demographics(&mut record, &analysis);

        // Stage 7: terminal state
        if let Some(reason) = normalization_failure {
            // Derived fields stay searchable; the record is visible as
            // failed until a clean re-run
            record.analysis = Some(summary);
            record.tags = tags;
            record.parsed_data = Some(parsed_data);
            record.mark_error(reason.clone());
            self.store.update(&record).await?;
            return Err(PipelineError::Normalization(reason));
        }

        record.mark_completed(summary.clone(), tags.clone(), parsed_data);
        self.store.update(&record).await?;

        info!(
            "Completed analysis for {} with {} tags",
            record.id,
            record.tags.len()
        );

        Ok(AnalysisOutcome {
            document_id: record.id,
            tags: record.tags,
            summary,
        })
    }

    async fn with_timeout<T>(
        &self,
        stage: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.capability_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Capability(format!(
                "{} stage timed out after {}s",
                stage,
                self.capability_timeout.as_secs()
            ))),
        }
    }

    /// Record a terminal per-document failure. Store faults while writing
    /// the failure state replace the stage error, since at that point the
    /// store itself is the problem.
    async fn fail(
        &self,
        record: &mut DocumentRecord,
        stage: &str,
        err: PipelineError,
    ) -> PipelineError {
        let reason = format!("{} failed: {}", stage, err);
        warn!("Document {}: {}", record.id, reason);
        record.mark_error(reason);
        match self.store.update(record).await {
            Ok(()) => err,
            Err(store_err) => store_err,
        }
    }
}

fn apply_demographics(record: &mut DocumentRecord, analysis: &CandidateAnalysis) {
    let demo = &analysis.demographics;

    record.first_name = demo.first_name.clone().or_else(|| {
        analysis
            .candidate_name
            .split_whitespace()
            .next()
            .map(str::to_string)
    });
    record.last_name = demo.last_name.clone().or_else(|| {
        let mut parts = analysis.candidate_name.split_whitespace();
        parts.next();
        let rest: Vec<&str> = parts.collect();
        (!rest.is_empty()).then(|| rest.join(" "))
    });
    record.age = analysis.age;
    record.department = Some(analysis.primary_department.clone());
    record.email = demo.email.clone();
    record.phone = demo.phone.clone();
    record.birthdate = demo.birthdate.clone();
    record.gender = demo.gender.clone();
    record.expected_salary = analysis.personal.salary_expectation;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm::VisionOcr;
    use crate::models::DocumentStatus;
    use crate::models::analysis::sample_analysis;
    use crate::store::{MemoryArtifactStore, MemoryStore};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    pub(crate) struct StubOcr;

    #[async_trait]
    impl VisionOcr for StubOcr {
        async fn ocr_image(&self, _bytes: &[u8], _mime: &str) -> Result<String> {
            Ok("ocr text".to_string())
        }
    }

    pub(crate) struct StubFixer {
        pub fail: bool,
    }

    #[async_trait]
    impl TextFixer for StubFixer {
        async fn fix_text(&self, text: &str) -> Result<String> {
            if self.fail {
                return Err(PipelineError::Normalization("model unavailable".to_string()));
            }
            Ok(format!("{} [fixed]", text))
        }
    }

    pub(crate) struct StubExtractor {
        pub fail: bool,
    }

    #[async_trait]
    impl ProfileExtractor for StubExtractor {
        async fn extract_profile(&self, _text: &str) -> Result<CandidateAnalysis> {
            if self.fail {
                return Err(PipelineError::Extraction("model returned garbage".to_string()));
            }
            Ok(sample_analysis())
        }
    }

    pub(crate) struct TestHarness {
        pub store: Arc<MemoryStore>,
        pub artifacts: Arc<MemoryArtifactStore>,
        pub pipeline: AnalysisPipeline,
    }

    pub(crate) fn harness(fixer_fails: bool, extractor_fails: bool) -> TestHarness {
        let store = Arc::new(MemoryStore::new());
        let artifacts = Arc::new(MemoryArtifactStore::new());
        let pipeline = AnalysisPipeline::new(
            store.clone(),
            artifacts.clone(),
            TextAcquirer::new(Arc::new(StubOcr)),
            Arc::new(StubFixer { fail: fixer_fails }),
            Arc::new(StubExtractor {
                fail: extractor_fails,
            }),
            Duration::from_secs(5),
        );
        TestHarness {
            store,
            artifacts,
            pipeline,
        }
    }

    pub(crate) async fn ingest(harness: &TestHarness, filename: &str, bytes: &[u8]) -> String {
        use crate::store::{ArtifactStore, DocumentStore};

        let file_id = DocumentRecord::compute_file_id(bytes);
        harness.artifacts.put(&file_id, bytes).await.unwrap();
        harness
            .store
            .insert(DocumentRecord::new(filename.to_string(), file_id))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_run_completes_record() {
        use crate::store::DocumentStore;

        let h = harness(false, false);
        let id = ingest(&h, "resume.txt", b"Maria Lindqvist, room attendant.").await;

        let outcome = h.pipeline.analyze(&id).await.unwrap();
        assert!(outcome.tags.contains(&"dept:Housekeeping".to_string()));

        let record = h.store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.status, DocumentStatus::Completed);
        assert!(record.analyzed);
        assert!(record.error.is_none());
        assert!(record.analysis.is_some());
        assert!(record.parsed_data.is_some());
        assert_eq!(record.first_name.as_deref(), Some("Maria"));
        assert_eq!(record.department.as_deref(), Some("Housekeeping"));
        assert_eq!(record.expected_salary, Some(32000));
    }

    #[tokio::test]
    async fn test_artifacts_checkpointed_in_order() {
        use crate::store::ArtifactStore;

        let h = harness(false, false);
        let id = ingest(&h, "resume.txt", b"plain resume text").await;
        h.pipeline.analyze(&id).await.unwrap();

        let original = h
            .artifacts
            .get(&original_text_key(&id))
            .await
            .unwrap()
            .unwrap();
        let fixed = h.artifacts.get(&fixed_text_key(&id)).await.unwrap().unwrap();

        assert_eq!(original, b"plain resume text");
        assert_eq!(fixed, b"plain resume text [fixed]");
    }

    #[tokio::test]
    async fn test_analyze_is_idempotent() {
        use crate::store::DocumentStore;

        let h = harness(false, false);
        let id = ingest(&h, "resume.txt", b"deterministic input").await;

        h.pipeline.analyze(&id).await.unwrap();
        let first = h.store.get(&id).await.unwrap().unwrap();

        h.pipeline.analyze(&id).await.unwrap();
        let second = h.store.get(&id).await.unwrap().unwrap();

        assert_eq!(first.tags, second.tags);
        assert_eq!(first.analysis, second.analysis);
        assert_eq!(first.parsed_data, second.parsed_data);
    }

    #[tokio::test]
    async fn test_extraction_failure_marks_error_keeps_artifacts() {
        use crate::store::{ArtifactStore, DocumentStore};

        let h = harness(false, true);
        let id = ingest(&h, "resume.txt", b"some resume text").await;

        let err = h.pipeline.analyze(&id).await.unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(_)));

        let record = h.store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.status, DocumentStatus::Error);
        assert!(!record.analyzed);
        assert!(record.error.as_deref().unwrap().starts_with("extraction failed"));

        // Earlier checkpoints survive the failure
        assert!(h.artifacts.get(&original_text_key(&id)).await.unwrap().is_some());
        assert!(h.artifacts.get(&fixed_text_key(&id)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fixer_failure_continues_on_raw_text() {
        use crate::store::{ArtifactStore, DocumentStore};

        let h = harness(true, false);
        let id = ingest(&h, "resume.txt", b"raw but usable text").await;

        let err = h.pipeline.analyze(&id).await.unwrap_err();
        assert!(matches!(err, PipelineError::Normalization(_)));

        let record = h.store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.status, DocumentStatus::Error);
        assert!(record.error.as_deref().unwrap().starts_with("normalization failed"));

        // Raw text checkpoint exists, fixed one was skipped
        assert!(h.artifacts.get(&original_text_key(&id)).await.unwrap().is_some());
        assert!(h.artifacts.get(&fixed_text_key(&id)).await.unwrap().is_none());

        // Extraction still ran on the raw text, so the record is searchable
        assert!(record.analysis.is_some());
        assert!(!record.tags.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_document_is_acquisition_failure() {
        use crate::store::DocumentStore;

        let h = harness(false, false);
        let id = ingest(&h, "binary.bin", &[0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00]).await;

        h.pipeline.analyze(&id).await.unwrap_err();
        let record = h.store.get(&id).await.unwrap().unwrap();
        assert!(record.error.as_deref().unwrap().starts_with("acquisition failed"));
        assert!(record.original_text_key.is_none());
    }

    #[tokio::test]
    async fn test_missing_raw_bytes_is_acquisition_failure() {
        use crate::store::DocumentStore;

        let h = harness(false, false);
        // Record exists but no artifact was stored for its file_id
        let record = DocumentRecord::new("ghost.pdf".to_string(), "deadbeef".to_string());
        let id = h.store.insert(record).await.unwrap();

        h.pipeline.analyze(&id).await.unwrap_err();
        let record = h.store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.status, DocumentStatus::Error);
    }

    #[tokio::test]
    async fn test_unknown_document_id_is_storage_error() {
        let h = harness(false, false);
        let err = h.pipeline.analyze("no-such-id").await.unwrap_err();
        assert!(matches!(err, PipelineError::Storage(_)));
    }

    #[tokio::test]
    async fn test_capability_timeout_fails_stage() {
        use crate::store::DocumentStore;

        struct SlowExtractor;

        #[async_trait]
        impl ProfileExtractor for SlowExtractor {
            async fn extract_profile(&self, _text: &str) -> Result<CandidateAnalysis> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(sample_analysis())
            }
        }

        let store = Arc::new(MemoryStore::new());
        let artifacts = Arc::new(MemoryArtifactStore::new());
        let pipeline = AnalysisPipeline::new(
            store.clone(),
            artifacts.clone(),
            TextAcquirer::new(Arc::new(StubOcr)),
            Arc::new(StubFixer { fail: false }),
            Arc::new(SlowExtractor),
            Duration::from_millis(50),
        );
        let h = TestHarness {
            store,
            artifacts,
            pipeline,
        };

        let id = ingest(&h, "resume.txt", b"text").await;
        let err = h.pipeline.analyze(&id).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));

        let record = h.store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.status, DocumentStatus::Error);
    }
}
