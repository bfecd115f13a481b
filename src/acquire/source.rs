// file: src/acquire/source.rs
// description: document source variants and byte loading with size caps
// reference: internal data structures

use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a document's raw bytes come from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Path(PathBuf),
    Url(String),
    Bytes { filename: String, data: Vec<u8> },
}

impl DocumentSource {
    /// Display filename for the record, stripped of path components.
    pub fn filename(&self) -> String {
        let raw = match self {
            DocumentSource::Path(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("document"),
            DocumentSource::Url(url) => url
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("document"),
            DocumentSource::Bytes { filename, .. } => filename.as_str(),
        };
        sanitize_filename(raw)
    }

    /// Load the raw bytes, enforcing the configured size cap.
    pub async fn load_bytes(&self, http: &reqwest::Client, max_bytes: u64) -> Result<Vec<u8>> {
        let data = match self {
            DocumentSource::Path(path) => read_local_file(path).await?,
            DocumentSource::Url(url) => download(http, url).await?,
            DocumentSource::Bytes { data, .. } => data.clone(),
        };

        if data.is_empty() {
            return Err(PipelineError::Acquisition("document is empty".to_string()));
        }

        if max_bytes > 0 && data.len() as u64 > max_bytes {
            return Err(PipelineError::Acquisition(format!(
                "document too large ({} bytes, limit {})",
                data.len(),
                max_bytes
            )));
        }

        Ok(data)
    }
}

async fn read_local_file(path: &Path) -> Result<Vec<u8>> {
    debug!("Reading document from {}", path.display());
    tokio::fs::read(path)
        .await
        .map_err(|source| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        })
}

async fn download(http: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(PipelineError::Acquisition(format!("invalid URL: {}", url)));
    }

    debug!("Downloading document from {}", url);
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| PipelineError::Acquisition(format!("download failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(PipelineError::Acquisition(format!(
            "download failed with status {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PipelineError::Acquisition(format!("download body failed: {}", e)))?;

    Ok(bytes.to_vec())
}

/// Strip path components and unsafe characters from a display filename.
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .take(255)
        .collect();

    if clean.is_empty() {
        "document".to_string()
    } else {
        clean
    }
}
