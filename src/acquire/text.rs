// file: src/acquire/text.rs
// description: format-specific text extraction and charset decoding
// reference: https://docs.rs/pdf-extract, https://docs.rs/quick-xml

use crate::error::{PipelineError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Read;

// Decompressed-size cap for a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

lazy_static! {
    // Hyphenated line wrap: "experi-\nence" -> "experience"
    static ref HYPHEN_WRAP: Regex = Regex::new(r"(\p{L})-\n(\p{L})").unwrap();
    // Runs of three or more newlines collapse to a paragraph break
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PipelineError::Acquisition(format!("PDF extraction failed: {}", e)))
}

/// Pull the `w:t` runs out of `word/document.xml`.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| PipelineError::Acquisition(format!("DOCX open failed: {}", e)))?;

    let mut doc_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|_| PipelineError::Acquisition("word/document.xml not found".to_string()))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| PipelineError::Acquisition(format!("DOCX read failed: {}", e)))?;
        if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(PipelineError::Acquisition(
                "word/document.xml exceeds size limit".to_string(),
            ));
        }
    }

    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(doc_xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        out.push_str(te.unescape().unwrap_or_default().as_ref());
                        out.push(' ');
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(PipelineError::Acquisition(format!(
                    "DOCX XML parse failed: {}",
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(out.trim_end().to_string())
}

/// Decode plain-text bytes with charset auto-detection: strict UTF-8 first
/// (BOM stripped), then UTF-16 LE/BE via BOM, then Latin-1 as the lossless
/// last resort.
pub fn decode_plain_text(bytes: &[u8]) -> String {
    if let Some(stripped) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(stripped).into_owned();
    }

    if let Some(stripped) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(stripped, u16::from_le_bytes);
    }

    if let Some(stripped) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(stripped, u16::from_be_bytes);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        // Latin-1: every byte maps directly to the same codepoint
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| from_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Mechanical cleanup applied to every extraction result before it is
/// persisted as the original-text artifact: newline normalization, control
/// character stripping, hyphenated wrap rejoining.
pub fn cleanup_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let stripped: String = unified
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let dewrapped = HYPHEN_WRAP.replace_all(&stripped, "$1$2");
    let collapsed = EXCESS_NEWLINES.replace_all(&dewrapped, "\n\n");

    collapsed.trim().to_string()
}
