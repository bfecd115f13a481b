// file: src/acquire/format.rs
// description: document kind detection from magic bytes
// reference: file format magic numbers

use serde::{Deserialize, Serialize};

/// Broad document categories the pipeline handles. Detected from magic
/// bytes, never from file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    DigitalPdf,
    ScannedPdf,
    Image,
    Docx,
    PlainText,
    Unsupported,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DigitalPdf => "digital_pdf",
            Self::ScannedPdf => "scanned_pdf",
            Self::Image => "image",
            Self::Docx => "docx",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn needs_ocr(&self) -> bool {
        matches!(self, Self::ScannedPdf | Self::Image)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

pub fn detect_kind(bytes: &[u8]) -> DocumentKind {
    match bytes {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => {
            if pdf_has_text_layer(bytes) {
                DocumentKind::DigitalPdf
            } else {
                DocumentKind::ScannedPdf
            }
        }
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => DocumentKind::Image,
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => DocumentKind::Image,
        // TIFF: little-endian or big-endian header
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => DocumentKind::Image,
        // ZIP container: OOXML if it carries word/document.xml
        [0x50, 0x4B, 0x03, 0x04, ..] => {
            if zip_contains_word_document(bytes) {
                DocumentKind::Docx
            } else {
                DocumentKind::Unsupported
            }
        }
        _ => {
            if is_likely_text(bytes) {
                DocumentKind::PlainText
            } else {
                DocumentKind::Unsupported
            }
        }
    }
}

/// MIME string for an image payload handed to the OCR capability.
pub fn image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        _ => "image/tiff",
    }
}

/// Digital-vs-scanned PDF heuristic: count text-stream operators
/// (BT/ET begin/end text, Tj/TJ show text, Tf set font) in the first
/// 256KB of raw bytes.
fn pdf_has_text_layer(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(256 * 1024)];
    let content = String::from_utf8_lossy(window);

    let text_markers = ["BT", "ET", " Tj", " TJ", " Tf"];
    let marker_count: usize = text_markers
        .iter()
        .map(|m| content.matches(m).count())
        .sum();

    marker_count >= 3
}

fn zip_contains_word_document(bytes: &[u8]) -> bool {
    let cursor = std::io::Cursor::new(bytes);
    match zip::ZipArchive::new(cursor) {
        Ok(archive) => archive.file_names().any(|n| n == "word/document.xml"),
        Err(_) => false,
    }
}

/// Plain-text heuristic: first 4KB decodes as UTF-8 (or carries a UTF-16
/// BOM) with at least 80% printable characters.
fn is_likely_text(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }

    // UTF-16 BOMs are text even though the raw bytes are not UTF-8
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return true;
    }

    let window = &bytes[..bytes.len().min(4096)];
    let text = match std::str::from_utf8(window) {
        Ok(t) => t,
        // The window may cut a codepoint at its very end; anything invalid
        // earlier than that means binary content
        Err(e) if e.valid_up_to() + 3 >= window.len() => {
            std::str::from_utf8(&window[..e.valid_up_to()]).unwrap_or("")
        }
        Err(_) => return false,
    };

    if text.is_empty() {
        return false;
    }

    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    let ratio = printable as f64 / text.chars().count().max(1) as f64;
    ratio > 0.80
}
