// file: src/search/mod.rs
// description: weighted full-text and structured search over stored candidate records
// reference: internal data structures

use crate::error::{PipelineError, Result};
use crate::models::DocumentRecord;
use crate::store::DocumentStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

// Per-field relevance weights. Name fields dominate, contact noise barely
// registers.
const WEIGHT_NAME: u32 = 10;
const WEIGHT_FILENAME: u32 = 6;
const WEIGHT_TAGS: u32 = 6;
const WEIGHT_SKILLS: u32 = 4;
const WEIGHT_DEPARTMENT: u32 = 4;
const WEIGHT_LANGUAGES: u32 = 2;
const WEIGHT_EDUCATION: u32 = 2;
const WEIGHT_EMAIL: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text term. Present: results rank by relevance. Absent: newest
    /// first.
    pub term: Option<String>,
    /// Required tag strings; a record must carry every one (AND).
    pub tags: Vec<String>,
    /// Case-insensitive partial match against first/last name.
    pub name: Option<String>,
    /// Case-insensitive partial match against department.
    pub department: Option<String>,
    /// Inclusive age range.
    pub age_min: Option<u8>,
    pub age_max: Option<u8>,
    /// Inclusive expected-salary range.
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    /// 1-indexed page number.
    pub page: usize,
    pub page_size: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            term: None,
            tags: Vec::new(),
            name: None,
            department: None,
            age_min: None,
            age_max: None,
            salary_min: None,
            salary_max: None,
            page: 1,
            page_size: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub records: Vec<DocumentRecord>,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

pub struct SearchEngine {
    store: Arc<dyn DocumentStore>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        if query.page == 0 {
            return Err(PipelineError::Validation(
                "page numbers are 1-indexed".to_string(),
            ));
        }
        if query.page_size == 0 {
            return Err(PipelineError::Validation(
                "page_size must be greater than 0".to_string(),
            ));
        }

        let records = self.store.list().await?;
        debug!("Searching {} stored records", records.len());
        Ok(rank_and_page(records, query))
    }
}

/// Pure filter + rank + paginate step, separated from the store round trip.
pub fn rank_and_page(records: Vec<DocumentRecord>, query: &SearchQuery) -> SearchPage {
    // A blank term is no term
    let term = query
        .term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let mut matched: Vec<(DocumentRecord, u32)> = records
        .into_iter()
        .filter(|r| matches_filters(r, query))
        .filter_map(|r| match term {
            Some(term) => {
                let score = relevance(&r, term);
                (score > 0).then_some((r, score))
            }
            None => Some((r, 0)),
        })
        .collect();

    if term.is_some() {
        matched.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| b.0.uploaded_at.cmp(&a.0.uploaded_at))
        });
    } else {
        matched.sort_by(|a, b| b.0.uploaded_at.cmp(&a.0.uploaded_at));
    }

    let total = matched.len();
    let pages = total.div_ceil(query.page_size);
    let offset = (query.page - 1) * query.page_size;

    let records: Vec<DocumentRecord> = matched
        .into_iter()
        .skip(offset)
        .take(query.page_size)
        .map(|(r, _)| r.normalized())
        .collect();

    SearchPage {
        records,
        total,
        page: query.page,
        pages,
    }
}

fn matches_filters(record: &DocumentRecord, query: &SearchQuery) -> bool {
    for tag in &query.tags {
        if !record.has_tag(tag) {
            return false;
        }
    }

    if let Some(name) = &query.name {
        let haystack = format!(
            "{} {}",
            record.first_name.as_deref().unwrap_or(""),
            record.last_name.as_deref().unwrap_or("")
        )
        .to_lowercase();
        if !haystack.contains(&name.to_lowercase()) {
            return false;
        }
    }

    if let Some(department) = &query.department {
        let matches = record
            .department
            .as_deref()
            .map(|d| d.to_lowercase().contains(&department.to_lowercase()))
            .unwrap_or(false);
        if !matches {
            return false;
        }
    }

    if query.age_min.is_some() || query.age_max.is_some() {
        let Some(age) = record.age else { return false };
        if query.age_min.is_some_and(|min| age < min) {
            return false;
        }
        if query.age_max.is_some_and(|max| age > max) {
            return false;
        }
    }

    if query.salary_min.is_some() || query.salary_max.is_some() {
        let Some(salary) = record.expected_salary else {
            return false;
        };
        if query.salary_min.is_some_and(|min| salary < min) {
            return false;
        }
        if query.salary_max.is_some_and(|max| salary > max) {
            return false;
        }
    }

    true
}

/// Weighted term-frequency relevance: each query token scores every field
/// it appears in, at that field's weight.
fn relevance(record: &DocumentRecord, term: &str) -> u32 {
    let tokens: Vec<String> = term
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return 0;
    }

    let name = format!(
        "{} {}",
        record.first_name.as_deref().unwrap_or(""),
        record.last_name.as_deref().unwrap_or("")
    )
    .to_lowercase();
    let filename = record.filename.to_lowercase();
    let tags = record.tags.join(" ").to_lowercase();
    let department = record.department.as_deref().unwrap_or("").to_lowercase();
    let email = record.email.as_deref().unwrap_or("").to_lowercase();

    let (skills, languages, education) = match &record.analysis {
        Some(summary) => (
            summary
                .technical_skills
                .iter()
                .chain(summary.soft_skills.iter())
                .cloned()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
            summary.languages.join(" ").to_lowercase(),
            summary.education.join(" ").to_lowercase(),
        ),
        None => (String::new(), String::new(), String::new()),
    };

    let fields: [(&str, u32); 8] = [
        (name.as_str(), WEIGHT_NAME),
        (filename.as_str(), WEIGHT_FILENAME),
        (tags.as_str(), WEIGHT_TAGS),
        (skills.as_str(), WEIGHT_SKILLS),
        (department.as_str(), WEIGHT_DEPARTMENT),
        (languages.as_str(), WEIGHT_LANGUAGES),
        (education.as_str(), WEIGHT_EDUCATION),
        (email.as_str(), WEIGHT_EMAIL),
    ];

    let mut score = 0;
    for token in &tokens {
        for (field, weight) in &fields {
            if field.contains(token.as_str()) {
                score += weight;
            }
        }
    }
    score
}
