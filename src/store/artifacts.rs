// file: src/store/artifacts.rs
// description: filesystem artifact store for per-stage text checkpoints
// reference: internal data structures

use crate::error::{PipelineError, Result};
use crate::store::ArtifactStore;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Artifact store writing one file per key under a flat directory. Keys are
/// document ids plus a suffix, so they are already filesystem-safe.
pub struct FsArtifactStore {
    artifact_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Result<Self> {
        let artifact_dir = artifact_dir.into();
        std::fs::create_dir_all(&artifact_dir).map_err(|source| PipelineError::FileOperation {
            path: artifact_dir.clone(),
            source,
        })?;
        Ok(Self { artifact_dir })
    }

    fn artifact_path(&self, key: &str) -> Result<PathBuf> {
        // Keys never address outside the artifact directory
        if key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(PipelineError::Storage(format!(
                "invalid artifact key: {}",
                key
            )));
        }
        Ok(self.artifact_dir.join(key))
    }

    pub fn dir(&self) -> &Path {
        &self.artifact_dir
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.artifact_path(key)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| PipelineError::FileOperation { path, source })
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.artifact_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PipelineError::FileOperation { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();

        store.put("doc1_original", b"raw text").await.unwrap();
        assert_eq!(
            store.get("doc1_original").await.unwrap().unwrap(),
            b"raw text"
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();

        store.put("doc1_fixed", b"first pass").await.unwrap();
        store.put("doc1_fixed", b"second pass").await.unwrap();

        assert_eq!(
            store.get("doc1_fixed").await.unwrap().unwrap(),
            b"second pass"
        );
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();

        assert!(store.put("../escape", b"x").await.is_err());
        assert!(store.get("a/b").await.is_err());
    }
}
