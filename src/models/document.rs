// file: src/models/document.rs
// description: core document record model with lifecycle state transitions
// reference: internal data structures

use crate::models::analysis::AnalysisSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// Persisted metadata and lifecycle state for one ingested resume.
///
/// `file_id` is the sha256 of the raw bytes: immutable, unique per record,
/// and the identity used for idempotent re-processing. Derived fields
/// (`analysis`, `tags`, demographics) are overwritten wholesale by each
/// analysis run, never appended to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: DocumentStatus,
    pub analyzed: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub file_id: String,
    #[serde(default)]
    pub original_text_key: Option<String>,
    #[serde(default)]
    pub fixed_text_key: Option<String>,
    #[serde(default)]
    pub parsed_data: Option<serde_json::Value>,
    #[serde(default)]
    pub analysis: Option<AnalysisSummary>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub expected_salary: Option<u32>,
}

impl DocumentRecord {
    pub fn new(filename: String, file_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename,
            uploaded_at: Utc::now(),
            status: DocumentStatus::Pending,
            analyzed: false,
            error: None,
            file_id,
            original_text_key: None,
            fixed_text_key: None,
            parsed_data: None,
            analysis: None,
            tags: Vec::new(),
            first_name: None,
            last_name: None,
            age: None,
            department: None,
            email: None,
            phone: None,
            birthdate: None,
            gender: None,
            expected_salary: None,
        }
    }

    pub fn compute_file_id(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Begin an analysis run. Clears any previous terminal state so a
    /// re-run on a completed or failed document starts clean.
    pub fn mark_processing(&mut self) {
        self.status = DocumentStatus::Processing;
        self.analyzed = false;
        self.error = None;
    }

    pub fn mark_error(&mut self, message: String) {
        self.status = DocumentStatus::Error;
        self.analyzed = false;
        self.error = Some(message);
    }

    /// Terminal success state. Overwrites all derived fields.
    pub fn mark_completed(
        &mut self,
        summary: AnalysisSummary,
        tags: Vec<String>,
        parsed_data: serde_json::Value,
    ) {
        self.status = DocumentStatus::Completed;
        self.analyzed = true;
        self.error = None;
        self.analysis = Some(summary);
        self.tags = dedup_preserving_order(tags);
        self.parsed_data = Some(parsed_data);
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Guarantee-present view for search consumers: collections default to
    /// empty, the summary to the empty structure. String demographics stay
    /// `None` (serialized as null) rather than being invented.
    pub fn normalized(mut self) -> Self {
        if self.analysis.is_none() {
            self.analysis = Some(AnalysisSummary::default());
        }
        self
    }
}

fn dedup_preserving_order(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DocumentRecord {
        DocumentRecord::new(
            "resume.pdf".to_string(),
            DocumentRecord::compute_file_id(b"raw bytes"),
        )
    }

    #[test]
    fn test_new_record_is_pending() {
        let rec = record();
        assert_eq!(rec.status, DocumentStatus::Pending);
        assert!(!rec.analyzed);
        assert!(rec.error.is_none());
        assert!(rec.tags.is_empty());
    }

    #[test]
    fn test_file_id_is_deterministic() {
        let a = DocumentRecord::compute_file_id(b"same content");
        let b = DocumentRecord::compute_file_id(b"same content");
        assert_eq!(a, b);
        assert_ne!(a, DocumentRecord::compute_file_id(b"other content"));
    }

    #[test]
    fn test_completed_invariants() {
        let mut rec = record();
        rec.mark_processing();
        rec.mark_completed(
            AnalysisSummary::default(),
            vec!["dept:Housekeeping".to_string()],
            serde_json::json!({}),
        );

        assert_eq!(rec.status, DocumentStatus::Completed);
        assert!(rec.analyzed);
        assert!(rec.analysis.is_some());
        assert!(rec.error.is_none());
    }

    #[test]
    fn test_error_invariants() {
        let mut rec = record();
        rec.mark_processing();
        rec.mark_error("acquisition failed: unreadable".to_string());

        assert_eq!(rec.status, DocumentStatus::Error);
        assert!(!rec.analyzed);
        assert!(rec.error.is_some());
    }

    #[test]
    fn test_reprocessing_clears_previous_error() {
        let mut rec = record();
        rec.mark_error("first attempt failed".to_string());
        rec.mark_processing();

        assert_eq!(rec.status, DocumentStatus::Processing);
        assert!(rec.error.is_none());
    }

    #[test]
    fn test_completed_tags_are_deduplicated() {
        let mut rec = record();
        rec.mark_completed(
            AnalysisSummary::default(),
            vec![
                "skill:Teamwork".to_string(),
                "dept:Housekeeping".to_string(),
                "skill:Teamwork".to_string(),
            ],
            serde_json::json!({}),
        );

        assert_eq!(rec.tags, vec!["skill:Teamwork", "dept:Housekeeping"]);
    }

    #[test]
    fn test_normalized_fills_missing_analysis() {
        let rec = record().normalized();
        assert_eq!(rec.analysis, Some(AnalysisSummary::default()));
        assert!(rec.tags.is_empty());
    }
}
