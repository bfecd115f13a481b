// file: src/pipeline/mod.rs
// description: analysis pipeline module exports
// reference: internal module structure

pub mod batch;
pub mod orchestrator;
pub mod progress;

pub use batch::{BatchCoordinator, BatchOutcome};
pub use orchestrator::{AnalysisOutcome, AnalysisPipeline};
pub use progress::{PipelineStats, ProgressTracker};
