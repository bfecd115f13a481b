// file: src/taxonomy.rs
// description: deterministic tag derivation from a structured candidate profile
// reference: internal data structures

use crate::models::{CandidateAnalysis, Tag};
use std::collections::HashSet;

/// Department-category scores at or above this emit a `dept:` tag.
pub const DEPT_SCORE_THRESHOLD: u8 = 60;

/// Skills at or above this proficiency level (1-5) emit a `skill:` tag.
pub const SKILL_LEVEL_THRESHOLD: u8 = 3;

/// Derive the canonical tag set for a profile.
///
/// Pure and total: the same profile always yields the same sequence, and a
/// sparsely-populated profile yields a short (possibly empty) one. Scores
/// are carried on the profile itself and never recomputed here.
pub fn derive_tags(analysis: &CandidateAnalysis) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |tag: Tag, tags: &mut Vec<Tag>| {
        if seen.insert(tag.clone()) {
            tags.push(tag);
        }
    };

    for dept in &analysis.department_scores {
        if dept.score >= DEPT_SCORE_THRESHOLD && !dept.department.trim().is_empty() {
            push(Tag::Dept(dept.department.trim().to_string()), &mut tags);
        }
    }

    for skill in analysis.role_skills.iter_all() {
        if skill.level >= SKILL_LEVEL_THRESHOLD && !skill.name.trim().is_empty() {
            push(Tag::Skill(skill.name.trim().to_string()), &mut tags);
        }
    }

    for cert in &analysis.certifications {
        if !cert.name.trim().is_empty() {
            push(Tag::Cert(cert.name.trim().to_string()), &mut tags);
        }
    }

    push(Tag::Exp(analysis.experience_level.label().to_string()), &mut tags);

    tags
}

/// String form of [`derive_tags`], as stored on the document record.
pub fn derive_tag_strings(analysis: &CandidateAnalysis) -> Vec<String> {
    derive_tags(analysis).iter().map(Tag::to_string).collect()
}
