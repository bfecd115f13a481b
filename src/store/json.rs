// file: src/store/json.rs
// description: JSON-file document store, one record document per file
// reference: https://docs.rs/serde_json

use crate::error::{PipelineError, Result};
use crate::models::DocumentRecord;
use crate::store::DocumentStore;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable record store for the CLI: each record lives at
/// `<data_dir>/<id>.json`. Scans are linear, which is the right trade at
/// single-operator scale and keeps the store substitutable behind the
/// [`DocumentStore`] trait.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|source| PipelineError::FileOperation {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", id))
    }

    async fn write_record(&self, record: &DocumentRecord) -> Result<()> {
        let path = self.record_path(&record.id);
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| PipelineError::FileOperation { path, source })?;
        Ok(())
    }

    async fn read_record(path: &Path) -> Result<Option<DocumentRecord>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PipelineError::FileOperation {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("Skipping unreadable record {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn insert(&self, record: DocumentRecord) -> Result<String> {
        if let Some(existing) = self.find_by_file_id(&record.file_id).await? {
            debug!(
                "Record for file_id {} already exists as {}",
                record.file_id, existing.id
            );
            return Ok(existing.id);
        }

        let id = record.id.clone();
        self.write_record(&record).await?;
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<DocumentRecord>> {
        Self::read_record(&self.record_path(id)).await
    }

    async fn update(&self, record: &DocumentRecord) -> Result<()> {
        let path = self.record_path(&record.id);
        if !path.exists() {
            return Err(PipelineError::Storage(format!(
                "no record with id {}",
                record.id
            )));
        }
        self.write_record(record).await
    }

    async fn find_by_file_id(&self, file_id: &str) -> Result<Option<DocumentRecord>> {
        for record in self.list().await? {
            if record.file_id == file_id {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<DocumentRecord>> {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.data_dir)
            .await
            .map_err(|source| PipelineError::FileOperation {
                path: self.data_dir.clone(),
                source,
            })?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| PipelineError::FileOperation {
                path: self.data_dir.clone(),
                source,
            })?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = Self::read_record(&path).await? {
                records.push(record);
            }
        }

        Ok(records)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.list().await?.len())
    }

    async fn clear(&self) -> Result<()> {
        for record in self.list().await? {
            let path = self.record_path(&record.id);
            tokio::fs::remove_file(&path)
                .await
                .map_err(|source| PipelineError::FileOperation { path, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(filename: &str, content: &[u8]) -> DocumentRecord {
        DocumentRecord::new(
            filename.to_string(),
            DocumentRecord::compute_file_id(content),
        )
    }

    #[tokio::test]
    async fn test_insert_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let id = {
            let store = JsonFileStore::new(dir.path()).unwrap();
            store.insert(record("a.pdf", b"bytes")).await.unwrap()
        };

        let reopened = JsonFileStore::new(dir.path()).unwrap();
        let loaded = reopened.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.filename, "a.pdf");
    }

    #[tokio::test]
    async fn test_file_id_uniqueness() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let first = store.insert(record("a.pdf", b"same")).await.unwrap();
        let second = store.insert(record("b.pdf", b"same")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let rec = record("a.pdf", b"bytes");
        let id = store.insert(rec.clone()).await.unwrap();

        let mut updated = store.get(&id).await.unwrap().unwrap();
        updated.mark_error("extraction failed: empty output".to_string());
        store.update(&updated).await.unwrap();

        let loaded = store.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.error.as_deref(), Some("extraction failed: empty output"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        store.insert(record("a.pdf", b"bytes")).await.unwrap();

        std::fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();

        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_removes_all() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        store.insert(record("a.pdf", b"one")).await.unwrap();
        store.insert(record("b.pdf", b"two")).await.unwrap();

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
