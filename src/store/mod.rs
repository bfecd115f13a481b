// file: src/store/mod.rs
// description: injected storage contracts for records and per-stage artifacts
// reference: internal module structure

pub mod artifacts;
pub mod json;
pub mod memory;

pub use artifacts::FsArtifactStore;
pub use json::JsonFileStore;
pub use memory::{MemoryArtifactStore, MemoryStore};

use crate::error::Result;
use crate::models::DocumentRecord;
use async_trait::async_trait;

/// Structured record store. Injected everywhere a record is read or
/// written so tests can substitute the in-memory implementation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a record, enforcing `file_id` uniqueness: when a record with
    /// the same `file_id` already exists, its id is returned and the new
    /// record is discarded.
    async fn insert(&self, record: DocumentRecord) -> Result<String>;

    async fn get(&self, id: &str) -> Result<Option<DocumentRecord>>;

    /// Whole-record overwrite keyed by `record.id`.
    async fn update(&self, record: &DocumentRecord) -> Result<()>;

    async fn find_by_file_id(&self, file_id: &str) -> Result<Option<DocumentRecord>>;

    async fn list(&self) -> Result<Vec<DocumentRecord>>;

    async fn count(&self) -> Result<usize>;

    async fn clear(&self) -> Result<()>;
}

/// Content-addressable artifact store, keyed by document id + suffix
/// (`<id>_original`, `<id>_fixed`) plus the raw bytes under the file id.
/// Writes overwrite; a re-analysis replaces each artifact in place.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Artifact key for the raw extracted text of a document.
pub fn original_text_key(document_id: &str) -> String {
    format!("{}_original", document_id)
}

/// Artifact key for the normalized text of a document.
pub fn fixed_text_key(document_id: &str) -> String {
    format!("{}_fixed", document_id)
}
