// file: src/models/mod.rs
// description: data model module exports
// reference: internal module structure

pub mod analysis;
pub mod document;
pub mod tag;

pub use analysis::{
    AnalysisSummary, CandidateAnalysis, Certification, DepartmentCategory, DepartmentScore,
    Demographics, ExperienceLevel, LanguageSkill, PersonalAttributes, PositionMatch, RoleSkills,
    ScoreVector, SkillRating,
};
pub use document::{DocumentRecord, DocumentStatus};
pub use tag::Tag;
