// file: src/pipeline/batch.rs
// description: concurrent fan-out of the analysis pipeline over many documents
// reference: https://docs.rs/futures

use crate::pipeline::orchestrator::{AnalysisOutcome, AnalysisPipeline};
use crate::pipeline::progress::ProgressTracker;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Per-document result of a batch run.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Completed(AnalysisOutcome),
    Failed(String),
}

impl BatchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, BatchOutcome::Completed(_))
    }
}

/// Fans `analyze` out over a set of document ids. Every document runs
/// independently: outcomes are joined per document, never short-circuited,
/// so one failure cannot cancel or delay its siblings.
pub struct BatchCoordinator {
    pipeline: Arc<AnalysisPipeline>,
    parallel_workers: usize,
}

impl BatchCoordinator {
    pub fn new(pipeline: Arc<AnalysisPipeline>, parallel_workers: usize) -> Self {
        Self {
            pipeline,
            parallel_workers: parallel_workers.max(1),
        }
    }

    /// Analyze every id concurrently. The returned map covers each distinct
    /// input id exactly once; completion order is not significant.
    pub async fn analyze_many(
        &self,
        ids: Vec<String>,
        progress: Option<Arc<ProgressTracker>>,
    ) -> HashMap<String, BatchOutcome> {
        let mut distinct = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for id in ids {
            if seen.insert(id.clone()) {
                distinct.push(id);
            }
        }

        info!(
            "Analyzing {} documents with {} concurrent tasks",
            distinct.len(),
            self.parallel_workers
        );

        let tasks = distinct.into_iter().map(|id| {
            let pipeline = self.pipeline.clone();
            let progress = progress.clone();

            async move {
                let outcome = match pipeline.analyze(&id).await {
                    Ok(outcome) => {
                        if let Some(p) = &progress {
                            p.inc_completed();
                            p.add_tags(outcome.tags.len());
                        }
                        BatchOutcome::Completed(outcome)
                    }
                    Err(e) => {
                        if let Some(p) = &progress {
                            p.inc_failed();
                        }
                        warn!("Document {} failed: {}", id, e);
                        BatchOutcome::Failed(e.to_string())
                    }
                };
                (id, outcome)
            }
        });

        stream::iter(tasks)
            .buffer_unordered(self.parallel_workers)
            .collect::<HashMap<_, _>>()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::orchestrator::tests::{harness, ingest};

    #[tokio::test]
    async fn test_batch_covers_every_id_once() {
        let h = harness(false, false);
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(ingest(&h, &format!("r{}.txt", i), format!("resume {}", i).as_bytes()).await);
        }
        // Duplicate submission of the same id must not duplicate outcomes
        ids.push(ids[0].clone());

        let pipeline = Arc::new(h.pipeline);
        let coordinator = BatchCoordinator::new(pipeline, 3);
        let outcomes = coordinator.analyze_many(ids.clone(), None).await;

        assert_eq!(outcomes.len(), 5);
        assert!(outcomes.values().all(|o| o.is_completed()));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_siblings() {
        let h = harness(false, false);
        let good_a = ingest(&h, "a.txt", b"resume a").await;
        // Unsupported binary content fails at the acquisition stage
        let bad = ingest(&h, "bad.bin", &[0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00]).await;
        let good_b = ingest(&h, "b.txt", b"resume b").await;

        let coordinator = BatchCoordinator::new(Arc::new(h.pipeline), 4);
        let outcomes = coordinator
            .analyze_many(vec![good_a.clone(), bad.clone(), good_b.clone()], None)
            .await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[&good_a].is_completed());
        assert!(outcomes[&good_b].is_completed());
        assert!(matches!(&outcomes[&bad], BatchOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_unknown_ids_fail_individually() {
        let h = harness(false, false);
        let known = ingest(&h, "a.txt", b"resume a").await;

        let coordinator = BatchCoordinator::new(Arc::new(h.pipeline), 2);
        let outcomes = coordinator
            .analyze_many(vec![known.clone(), "missing-id".to_string()], None)
            .await;

        assert!(outcomes[&known].is_completed());
        assert!(matches!(&outcomes["missing-id"], BatchOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty_map() {
        let h = harness(false, false);
        let coordinator = BatchCoordinator::new(Arc::new(h.pipeline), 2);
        let outcomes = coordinator.analyze_many(Vec::new(), None).await;
        assert!(outcomes.is_empty());
    }
}
