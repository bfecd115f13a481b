// file: src/llm/mod.rs
// description: language-model capability contracts consumed by the pipeline
// reference: internal module structure

pub mod client;

use crate::error::Result;
use crate::models::CandidateAnalysis;
use async_trait::async_trait;

pub use client::GroqChatClient;

/// Reads text out of an image or scanned page. Implementations are
/// out-of-process round trips; callers wrap every invocation in a timeout
/// and treat failure as a per-document stage failure.
#[async_trait]
pub trait VisionOcr: Send + Sync {
    async fn ocr_image(&self, bytes: &[u8], mime: &str) -> Result<String>;
}

/// Repairs OCR/extraction artifacts (broken wraps, garbled characters,
/// encoding noise). Safe to skip: the pipeline falls back to raw text.
#[async_trait]
pub trait TextFixer: Send + Sync {
    async fn fix_text(&self, text: &str) -> Result<String>;
}

/// Converts normalized resume text into a validated structured profile.
/// Implementations must run the schema validation gate before reporting
/// success; malformed model output is an extraction failure.
#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    async fn extract_profile(&self, text: &str) -> Result<CandidateAnalysis>;
}
