//! Data model for the analysis pipeline — the immutable input, every
//! per-stage result shape, and the final bundle handed to the caller.
//!
//! Structured types deserialize the JSON shapes the prompts demand from the
//! generation endpoint, so field naming is camelCase on the wire. The same
//! types serialize back out through the analysis API unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound for every score in ATS and skill-gap reports.
pub const MAX_SCORE: u8 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Pipeline input
// ────────────────────────────────────────────────────────────────────────────

/// Experience level the applicant applies as. Project suggestions (stage 7)
/// run for freshers only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicantLevel {
    Fresher,
    Experienced,
}

impl ApplicantLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicantLevel::Fresher => "Fresher",
            ApplicantLevel::Experienced => "Experienced",
        }
    }
}

/// Requested tone for the generated cover letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverLetterTone {
    Formal,
    Informal,
    Casual,
}

impl CoverLetterTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverLetterTone::Formal => "Formal",
            CoverLetterTone::Informal => "Informal",
            CoverLetterTone::Casual => "Casual",
        }
    }
}

/// Immutable input to one pipeline run. Created by the caller; every stage
/// reads it, nothing writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInput {
    pub company_name: String,
    pub applicant_level: ApplicantLevel,
    pub job_description: String,
    #[serde(default)]
    pub current_resume: Option<String>,
    pub cover_letter_tone: CoverLetterTone,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage identity
// ────────────────────────────────────────────────────────────────────────────

/// One step of the pipeline: one generation call plus its parse/fallback
/// handling. Order here is the mandatory execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RoleDetection,
    TemplateRecommendation,
    ResumeRewrite,
    CoverLetter,
    AtsBreakdown,
    SkillGap,
    ProjectSuggestions,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RoleDetection => "role_detection",
            Stage::TemplateRecommendation => "template_recommendation",
            Stage::ResumeRewrite => "resume_rewrite",
            Stage::CoverLetter => "cover_letter",
            Stage::AtsBreakdown => "ats_breakdown",
            Stage::SkillGap => "skill_gap",
            Stage::ProjectSuggestions => "project_suggestions",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 2 — template choice
// ────────────────────────────────────────────────────────────────────────────

/// The fixed set of résumé templates the recommendation stage picks from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateChoice {
    Minimal,
    Modern,
    Tech,
    Elegant,
}

impl TemplateChoice {
    pub const ALL: [TemplateChoice; 4] = [
        TemplateChoice::Minimal,
        TemplateChoice::Modern,
        TemplateChoice::Tech,
        TemplateChoice::Elegant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateChoice::Minimal => "Minimal",
            TemplateChoice::Modern => "Modern",
            TemplateChoice::Tech => "Tech",
            TemplateChoice::Elegant => "Elegant",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 3 — rewritten résumé
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub year: String,
}

/// The rewritten résumé produced by stage 3. Downstream stages read it but
/// never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub education: Education,
}

impl ResumeDocument {
    /// Semantic checks beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("résumé summary is empty".to_string());
        }
        if self.skills.is_empty() {
            return Err("résumé has no skills".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 5 — ATS breakdown
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub score: u8,
    pub feedback: String,
}

/// The fixed category set every ATS breakdown carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsCategories {
    pub formatting: CategoryScore,
    pub keywords: CategoryScore,
    pub readability: CategoryScore,
    pub action_verbs: CategoryScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsReport {
    pub overall_score: u8,
    pub categories: AtsCategories,
    pub missing_keywords: Vec<String>,
    pub recommendations: Vec<String>,
}

impl AtsReport {
    /// Clamps every score into [0, 100]. Out-of-range values from the
    /// generation endpoint are bounded here rather than propagated.
    pub fn clamped(mut self) -> Self {
        self.overall_score = self.overall_score.min(MAX_SCORE);
        self.categories.formatting.score = self.categories.formatting.score.min(MAX_SCORE);
        self.categories.keywords.score = self.categories.keywords.score.min(MAX_SCORE);
        self.categories.readability.score = self.categories.readability.score.min(MAX_SCORE);
        self.categories.action_verbs.score = self.categories.action_verbs.score.min(MAX_SCORE);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        let scores = [
            self.overall_score,
            self.categories.formatting.score,
            self.categories.keywords.score,
            self.categories.readability.score,
            self.categories.action_verbs.score,
        ];
        if scores.iter().any(|s| *s > MAX_SCORE) {
            return Err("ATS score out of range".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 6 — skill gap
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Importance {
    Low,
    Medium,
    High,
}

/// One missing or recommended skill with its weight and rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub skill: String,
    pub importance: Importance,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapReport {
    pub missing_skills: Vec<SkillAssessment>,
    pub recommended_skills: Vec<SkillAssessment>,
    pub existing_skills: Vec<String>,
    pub skill_match_percentage: u8,
}

impl SkillGapReport {
    pub fn clamped(mut self) -> Self {
        self.skill_match_percentage = self.skill_match_percentage.min(MAX_SCORE);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.skill_match_percentage > MAX_SCORE {
            return Err("skill match percentage out of range".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 7 — project suggestions (freshers only)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSuggestion {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub learning_outcomes: Vec<String>,
    pub difficulty: Difficulty,
    pub estimated_time: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Final bundle
// ────────────────────────────────────────────────────────────────────────────

/// Aggregated output of a complete pipeline run. Assembled exactly once;
/// the pipeline never surfaces a partially-populated bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBundle {
    pub detected_role: String,
    pub template: TemplateChoice,
    pub resume: ResumeDocument,
    pub cover_letter: String,
    pub ats_report: AtsReport,
    pub skill_gap: SkillGapReport,
    /// Always present; empty unless the applicant level is Fresher.
    pub project_suggestions: Vec<ProjectSuggestion>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
