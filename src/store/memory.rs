// file: src/store/memory.rs
// description: in-memory store implementations for tests and ephemeral runs
// reference: internal data structures

use crate::error::{PipelineError, Result};
use crate::models::DocumentRecord;
use crate::store::{ArtifactStore, DocumentStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory document store backed by a `HashMap` behind `RwLock`.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, DocumentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, record: DocumentRecord) -> Result<String> {
        let mut records = self.records.write().unwrap();

        if let Some(existing) = records.values().find(|r| r.file_id == record.file_id) {
            return Ok(existing.id.clone());
        }

        let id = record.id.clone();
        records.insert(id.clone(), record);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<DocumentRecord>> {
        Ok(self.records.read().unwrap().get(id).cloned())
    }

    async fn update(&self, record: &DocumentRecord) -> Result<()> {
        let mut records = self.records.write().unwrap();
        if !records.contains_key(&record.id) {
            return Err(PipelineError::Storage(format!(
                "no record with id {}",
                record.id
            )));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_file_id(&self, file_id: &str) -> Result<Option<DocumentRecord>> {
        Ok(self
            .records
            .read()
            .unwrap()
            .values()
            .find(|r| r.file_id == file_id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<DocumentRecord>> {
        Ok(self.records.read().unwrap().values().cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().unwrap().len())
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().unwrap().clear();
        Ok(())
    }
}

/// In-memory artifact store.
#[derive(Default)]
pub struct MemoryArtifactStore {
    artifacts: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.artifacts
            .write()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.artifacts.read().unwrap().get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(filename: &str, content: &[u8]) -> DocumentRecord {
        DocumentRecord::new(
            filename.to_string(),
            DocumentRecord::compute_file_id(content),
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryStore::new();
        let rec = record("a.pdf", b"content a");
        let id = store.insert(rec.clone()).await.unwrap();

        let loaded = store.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.filename, "a.pdf");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_same_file_id_returns_existing() {
        let store = MemoryStore::new();
        let first = store.insert(record("a.pdf", b"same bytes")).await.unwrap();
        let second = store.insert(record("copy.pdf", b"same bytes")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_record_fails() {
        let store = MemoryStore::new();
        let rec = record("a.pdf", b"content");
        assert!(store.update(&rec).await.is_err());
    }

    #[tokio::test]
    async fn test_find_by_file_id() {
        let store = MemoryStore::new();
        let rec = record("a.pdf", b"content a");
        let file_id = rec.file_id.clone();
        store.insert(rec).await.unwrap();

        assert!(store.find_by_file_id(&file_id).await.unwrap().is_some());
        assert!(store.find_by_file_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_artifact_overwrite() {
        let store = MemoryArtifactStore::new();
        store.put("doc_original", b"first").await.unwrap();
        store.put("doc_original", b"second").await.unwrap();

        assert_eq!(
            store.get("doc_original").await.unwrap().unwrap(),
            b"second"
        );
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
