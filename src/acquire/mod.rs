// file: src/acquire/mod.rs
// description: text acquisition stage: kind detection, extraction dispatch, OCR routing
// reference: internal module structure

pub mod format;
pub mod scan;
pub mod source;
pub mod text;

pub use format::DocumentKind;
pub use scan::{FileScanner, ScannedFile};
pub use source::{DocumentSource, sanitize_filename};

use crate::error::{PipelineError, Result};
use crate::llm::VisionOcr;
use std::sync::Arc;
use tracing::{debug, info};

/// Raw text pulled from a document, with the detected kind for diagnostics.
#[derive(Debug, Clone)]
pub struct AcquiredText {
    pub text: String,
    pub kind: DocumentKind,
}

/// First pipeline stage. A function of (bytes, detected kind): digital PDFs
/// and DOCX use their text layers, images and scanned PDFs go through the
/// OCR capability, plain text is charset-decoded.
pub struct TextAcquirer {
    ocr: Arc<dyn VisionOcr>,
}

impl TextAcquirer {
    pub fn new(ocr: Arc<dyn VisionOcr>) -> Self {
        Self { ocr }
    }

    pub async fn acquire(&self, bytes: &[u8]) -> Result<AcquiredText> {
        let kind = format::detect_kind(bytes);
        debug!("Detected document kind: {}", kind.as_str());

        let raw = match kind {
            DocumentKind::DigitalPdf => text::extract_pdf_text(bytes)?,
            DocumentKind::Docx => text::extract_docx_text(bytes)?,
            DocumentKind::PlainText => text::decode_plain_text(bytes),
            DocumentKind::Image => {
                let mime = format::image_mime(bytes);
                self.ocr.ocr_image(bytes, mime).await?
            }
            // Scanned PDFs carry no text layer; the OCR capability receives
            // the whole document
            DocumentKind::ScannedPdf => self.ocr.ocr_image(bytes, "application/pdf").await?,
            DocumentKind::Unsupported => {
                return Err(PipelineError::Acquisition(
                    "unsupported document format".to_string(),
                ));
            }
        };

        let cleaned = text::cleanup_text(&raw);
        if cleaned.is_empty() {
            return Err(PipelineError::Acquisition(format!(
                "no text recovered from {} document",
                kind.as_str()
            )));
        }

        info!(
            "Acquired {} chars from {} document",
            cleaned.len(),
            kind.as_str()
        );

        Ok(AcquiredText {
            text: cleaned,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubOcr {
        response: &'static str,
    }

    #[async_trait]
    impl VisionOcr for StubOcr {
        async fn ocr_image(&self, _bytes: &[u8], _mime: &str) -> Result<String> {
            Ok(self.response.to_string())
        }
    }

    struct FailingOcr;

    #[async_trait]
    impl VisionOcr for FailingOcr {
        async fn ocr_image(&self, _bytes: &[u8], _mime: &str) -> Result<String> {
            Err(PipelineError::Capability("model unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_acquire_plain_text() {
        let acquirer = TextAcquirer::new(Arc::new(StubOcr { response: "" }));
        let acquired = acquirer
            .acquire(b"Maria Lindqvist\nRoom attendant, four years.")
            .await
            .unwrap();

        assert_eq!(acquired.kind, DocumentKind::PlainText);
        assert!(acquired.text.contains("Maria Lindqvist"));
    }

    #[tokio::test]
    async fn test_acquire_image_routes_to_ocr() {
        let acquirer = TextAcquirer::new(Arc::new(StubOcr {
            response: "transcribed resume text",
        }));
        let acquired = acquirer.acquire(&[0xFF, 0xD8, 0xFF, 0xE0]).await.unwrap();

        assert_eq!(acquired.kind, DocumentKind::Image);
        assert_eq!(acquired.text, "transcribed resume text");
    }

    #[tokio::test]
    async fn test_acquire_unsupported_format_fails() {
        let acquirer = TextAcquirer::new(Arc::new(StubOcr { response: "" }));
        let err = acquirer
            .acquire(&[0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Acquisition(_)));
    }

    #[tokio::test]
    async fn test_acquire_propagates_ocr_failure() {
        let acquirer = TextAcquirer::new(Arc::new(FailingOcr));
        let err = acquirer.acquire(&[0xFF, 0xD8, 0xFF, 0xE0]).await.unwrap_err();
        assert!(matches!(err, PipelineError::Capability(_)));
    }

    #[tokio::test]
    async fn test_acquire_rejects_whitespace_only_result() {
        let acquirer = TextAcquirer::new(Arc::new(StubOcr { response: "  \n  " }));
        let err = acquirer.acquire(&[0xFF, 0xD8, 0xFF, 0xE0]).await.unwrap_err();
        assert!(matches!(err, PipelineError::Acquisition(_)));
    }
}
