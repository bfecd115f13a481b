// file: src/models/analysis.rs
// description: structured candidate profile schema produced by the extractor
// reference: internal data structures

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Full structured output of the profile extractor. Model output is
/// deserialized leniently (every collection defaults to empty) and then
/// gated through [`CandidateAnalysis::validate`] before the pipeline
/// accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAnalysis {
    #[serde(default)]
    pub candidate_name: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub primary_department: String,
    #[serde(default)]
    pub scores: ScoreVector,
    #[serde(default)]
    pub department_scores: Vec<DepartmentScore>,
    #[serde(default)]
    pub role_skills: RoleSkills,
    #[serde(default)]
    pub languages: Vec<LanguageSkill>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub personal: PersonalAttributes,
    #[serde(default)]
    pub recommended_positions: Vec<PositionMatch>,
    #[serde(default)]
    pub demographics: Demographics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExperienceLevel {
    #[default]
    #[serde(rename = "Entry Level")]
    EntryLevel,
    #[serde(rename = "Mid-Level")]
    MidLevel,
    Senior,
    Management,
}

impl ExperienceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::EntryLevel => "Entry Level",
            ExperienceLevel::MidLevel => "Mid-Level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Management => "Management",
        }
    }
}

/// Five-component fit score vector, each 0-100. Carried through from the
/// extractor unmodified; the tag deriver never recomputes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScoreVector {
    #[serde(default)]
    pub department_match: u8,
    #[serde(default)]
    pub technical_qualification: u8,
    #[serde(default)]
    pub experience_value: u8,
    #[serde(default)]
    pub language_proficiency: u8,
    #[serde(default)]
    pub practical_factors: u8,
}

impl ScoreVector {
    fn clamp(&mut self) {
        self.department_match = self.department_match.min(100);
        self.technical_qualification = self.technical_qualification.min(100);
        self.experience_value = self.experience_value.min(100);
        self.language_proficiency = self.language_proficiency.min(100);
        self.practical_factors = self.practical_factors.min(100);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepartmentCategory {
    #[serde(rename = "Guest Services")]
    GuestServices,
    #[serde(rename = "Accommodation Services")]
    AccommodationServices,
    #[serde(rename = "Food & Beverage")]
    FoodBeverage,
    #[serde(rename = "Business Operations")]
    BusinessOperations,
    #[serde(rename = "Facilities Management")]
    FacilitiesManagement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentScore {
    pub category: DepartmentCategory,
    pub department: String,
    #[serde(default)]
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RoleSkills {
    #[serde(default)]
    pub customer_facing: Vec<SkillRating>,
    #[serde(default)]
    pub operational: Vec<SkillRating>,
    #[serde(default)]
    pub administrative: Vec<SkillRating>,
}

impl RoleSkills {
    pub fn iter_all(&self) -> impl Iterator<Item = &SkillRating> {
        self.customer_facing
            .iter()
            .chain(self.operational.iter())
            .chain(self.administrative.iter())
    }
}

/// Skill proficiency on a 1-5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRating {
    pub name: String,
    #[serde(default)]
    pub level: u8,
}

/// Language proficiency on a 1-5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageSkill {
    pub language: String,
    #[serde(default)]
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub expires: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PersonalAttributes {
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub accommodation_needs: Option<String>,
    #[serde(default)]
    pub salary_expectation: Option<u32>,
    #[serde(default)]
    pub notice_period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionMatch {
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub match_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Demographics {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl CandidateAnalysis {
    /// Validation gate applied before the extractor reports success.
    /// Missing required fields reject the whole profile; numeric fields
    /// outside their documented ranges are clamped rather than rejected.
    pub fn validate(mut self) -> Result<Self> {
        if self.candidate_name.trim().is_empty() {
            return Err(PipelineError::Extraction(
                "profile missing candidate name".to_string(),
            ));
        }

        if self.primary_department.trim().is_empty() {
            return Err(PipelineError::Extraction(
                "profile missing primary department".to_string(),
            ));
        }

        self.scores.clamp();
        for dept in &mut self.department_scores {
            dept.score = dept.score.min(100);
        }
        for skill in self
            .role_skills
            .customer_facing
            .iter_mut()
            .chain(self.role_skills.operational.iter_mut())
            .chain(self.role_skills.administrative.iter_mut())
        {
            skill.level = skill.level.clamp(1, 5);
        }
        for lang in &mut self.languages {
            lang.level = lang.level.clamp(1, 5);
        }
        for pos in &mut self.recommended_positions {
            pos.match_score = pos.match_score.min(100);
        }

        Ok(self)
    }
}

/// Flat per-record digest of an analysis, kept on the document record for
/// listing and search. Defaults to the empty structure so consumers never
/// see a missing shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
}

impl AnalysisSummary {
    pub fn from_analysis(analysis: &CandidateAnalysis) -> Self {
        Self {
            languages: analysis
                .languages
                .iter()
                .map(|l| l.language.clone())
                .collect(),
            education: analysis.education.clone(),
            experience: analysis.experience.clone(),
            technical_skills: analysis
                .role_skills
                .operational
                .iter()
                .chain(analysis.role_skills.administrative.iter())
                .map(|s| s.name.clone())
                .collect(),
            soft_skills: analysis
                .role_skills
                .customer_facing
                .iter()
                .map(|s| s.name.clone())
                .collect(),
            certifications: analysis
                .certifications
                .iter()
                .map(|c| c.name.clone())
                .collect(),
        }
    }
}

/// Fully-populated fixture shared by pipeline, taxonomy, and search tests.
#[cfg(test)]
pub(crate) fn sample_analysis() -> CandidateAnalysis {
    CandidateAnalysis {
        candidate_name: "Maria Lindqvist".to_string(),
        age: Some(29),
        experience_level: ExperienceLevel::MidLevel,
        primary_department: "Housekeeping".to_string(),
        scores: ScoreVector {
            department_match: 85,
            technical_qualification: 70,
            experience_value: 60,
            language_proficiency: 90,
            practical_factors: 75,
        },
        department_scores: vec![DepartmentScore {
            category: DepartmentCategory::AccommodationServices,
            department: "Housekeeping".to_string(),
            score: 85,
        }],
        role_skills: RoleSkills {
            customer_facing: vec![SkillRating {
                name: "Teamwork".to_string(),
                level: 4,
            }],
            operational: vec![SkillRating {
                name: "Room Inspection".to_string(),
                level: 5,
            }],
            administrative: vec![],
        },
        languages: vec![LanguageSkill {
            language: "English".to_string(),
            level: 4,
        }],
        education: vec!["Hotel Management Diploma".to_string()],
        experience: vec!["Room attendant, Hotel Nordica, 4 years".to_string()],
        certifications: vec![Certification {
            name: "First Aid".to_string(),
            issuer: "Red Cross".to_string(),
            expires: None,
        }],
        personal: PersonalAttributes {
            availability: Some("Immediate".to_string()),
            accommodation_needs: None,
            salary_expectation: Some(32000),
            notice_period: Some("2 weeks".to_string()),
        },
        recommended_positions: vec![PositionMatch {
            title: "Senior Room Attendant".to_string(),
            department: "Housekeeping".to_string(),
            match_score: 88,
        }],
        demographics: Demographics {
            first_name: Some("Maria".to_string()),
            last_name: Some("Lindqvist".to_string()),
            email: Some("maria.lindqvist@example.com".to_string()),
            phone: None,
            birthdate: None,
            gender: None,
        },
    }
}
