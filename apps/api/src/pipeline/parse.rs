//! Stage parsers — strict conversion of sanitized generation output into
//! typed stage results.
//!
//! Label-shaped stages (role, template) extract a value from a fixed textual
//! pattern. Structured stages deserialize strictly: a field of the wrong
//! type is a parse failure, never coerced. Any failure here is recoverable —
//! the orchestrator substitutes the stage fallback.

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::pipeline::models::{
    AtsReport, ProjectSuggestion, ResumeDocument, SkillGapReport, Stage, TemplateChoice,
};

/// Max length of the raw snippet carried in a parse error, for log lines.
const SNIPPET_MAX_CHARS: usize = 200;

/// A stage produced output that does not match its declared shape.
#[derive(Debug, Error)]
#[error("stage {stage} returned an unparseable payload: {reason}")]
pub struct ParseError {
    pub stage: Stage,
    pub reason: String,
    /// Truncated raw payload, kept for diagnosability.
    pub snippet: String,
}

impl ParseError {
    fn new(stage: Stage, reason: impl Into<String>, candidate: &str) -> Self {
        ParseError {
            stage,
            reason: reason.into(),
            snippet: snippet_of(candidate),
        }
    }
}

fn snippet_of(candidate: &str) -> String {
    candidate.chars().take(SNIPPET_MAX_CHARS).collect()
}

fn parse_json<T: DeserializeOwned>(stage: Stage, candidate: &str) -> Result<T, ParseError> {
    serde_json::from_str(candidate).map_err(|e| ParseError::new(stage, e.to_string(), candidate))
}

// ────────────────────────────────────────────────────────────────────────────
// Label-shaped stages
// ────────────────────────────────────────────────────────────────────────────

/// Stage 1: extracts the role label. The prompt asks for
/// `Detected Role: <title>`; if the marker is absent the whole trimmed text
/// is the label.
pub fn parse_role_label(candidate: &str) -> Result<String, ParseError> {
    let text = candidate.trim().trim_matches('"').trim();
    const MARKER: &str = "detected role:";
    let label = match text.get(..MARKER.len()) {
        Some(head) if head.eq_ignore_ascii_case(MARKER) => {
            text[MARKER.len()..].trim().trim_matches('"').trim()
        }
        _ => text,
    };

    if label.is_empty() {
        return Err(ParseError::new(
            Stage::RoleDetection,
            "empty role label",
            candidate,
        ));
    }
    Ok(label.to_string())
}

/// Stage 2: maps the response onto one of the fixed template identifiers.
/// Accepts the bare name in any case; otherwise picks the earliest template
/// name mentioned anywhere in the response.
pub fn parse_template_choice(candidate: &str) -> Result<TemplateChoice, ParseError> {
    let text = candidate.trim().trim_matches('"').trim_end_matches('.').trim();

    for template in TemplateChoice::ALL {
        if text.eq_ignore_ascii_case(template.as_str()) {
            return Ok(template);
        }
    }

    // Not a bare label — scan for the first mention.
    let lower = text.to_lowercase();
    let earliest = TemplateChoice::ALL
        .into_iter()
        .filter_map(|t| lower.find(&t.as_str().to_lowercase()).map(|pos| (pos, t)))
        .min_by_key(|(pos, _)| *pos);

    match earliest {
        Some((_, template)) => Ok(template),
        None => Err(ParseError::new(
            Stage::TemplateRecommendation,
            "no known template name in response",
            candidate,
        )),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Structured stages
// ────────────────────────────────────────────────────────────────────────────

/// Stage 3: strict deserialization of the rewritten résumé, plus semantic
/// checks (non-empty summary, at least one skill).
pub fn parse_resume(candidate: &str) -> Result<ResumeDocument, ParseError> {
    let resume: ResumeDocument = parse_json(Stage::ResumeRewrite, candidate)?;
    resume
        .validate()
        .map_err(|reason| ParseError::new(Stage::ResumeRewrite, reason, candidate))?;
    Ok(resume)
}

/// Stage 4: the cover letter is plain text; the only structural requirement
/// is non-emptiness.
pub fn parse_cover_letter(candidate: &str) -> Result<String, ParseError> {
    let text = candidate.trim();
    if text.is_empty() {
        return Err(ParseError::new(
            Stage::CoverLetter,
            "empty cover letter",
            candidate,
        ));
    }
    Ok(text.to_string())
}

/// Stage 5: ATS breakdown. Scores above 100 are clamped; negative or
/// wrong-typed scores fail deserialization and fall through to the fallback.
pub fn parse_ats_report(candidate: &str) -> Result<AtsReport, ParseError> {
    let report: AtsReport = parse_json(Stage::AtsBreakdown, candidate)?;
    Ok(report.clamped())
}

/// Stage 6: skill-gap analysis, clamped like the ATS report.
pub fn parse_skill_gap(candidate: &str) -> Result<SkillGapReport, ParseError> {
    let report: SkillGapReport = parse_json(Stage::SkillGap, candidate)?;
    Ok(report.clamped())
}

/// Stage 7: project suggestions. An empty list is a failure — the stage is
/// only invoked for freshers, who must receive at least one suggestion.
pub fn parse_project_suggestions(candidate: &str) -> Result<Vec<ProjectSuggestion>, ParseError> {
    let projects: Vec<ProjectSuggestion> = parse_json(Stage::ProjectSuggestions, candidate)?;
    if projects.is_empty() {
        return Err(ParseError::new(
            Stage::ProjectSuggestions,
            "empty project list",
            candidate,
        ));
    }
    Ok(projects)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::models::Importance;

    #[test]
    fn test_parse_role_label_strips_marker() {
        let label = parse_role_label("Detected Role: Software Engineer").unwrap();
        assert_eq!(label, "Software Engineer");
    }

    #[test]
    fn test_parse_role_label_strips_marker_and_quotes() {
        let label = parse_role_label("\"Detected Role: Data Analyst\"").unwrap();
        assert_eq!(label, "Data Analyst");
    }

    #[test]
    fn test_parse_role_label_marker_is_case_insensitive() {
        let label = parse_role_label("detected role: Product Manager").unwrap();
        assert_eq!(label, "Product Manager");
    }

    #[test]
    fn test_parse_role_label_without_marker_uses_whole_text() {
        let label = parse_role_label("  Backend Engineer  ").unwrap();
        assert_eq!(label, "Backend Engineer");
    }

    #[test]
    fn test_parse_role_label_rejects_empty() {
        assert!(parse_role_label("   ").is_err());
        assert!(parse_role_label("Detected Role:").is_err());
    }

    #[test]
    fn test_parse_template_choice_exact_name() {
        assert_eq!(parse_template_choice("Tech").unwrap(), TemplateChoice::Tech);
        assert_eq!(parse_template_choice("modern").unwrap(), TemplateChoice::Modern);
        assert_eq!(parse_template_choice("\"Elegant\".").unwrap(), TemplateChoice::Elegant);
    }

    #[test]
    fn test_parse_template_choice_embedded_name_picks_earliest() {
        let choice =
            parse_template_choice("I recommend the Minimal template over Modern here.").unwrap();
        assert_eq!(choice, TemplateChoice::Minimal);
    }

    #[test]
    fn test_parse_template_choice_rejects_unknown() {
        let err = parse_template_choice("Baroque").unwrap_err();
        assert_eq!(err.stage, Stage::TemplateRecommendation);
    }

    #[test]
    fn test_parse_resume_valid_payload() {
        let json = r#"{
            "summary": "Backend engineer focused on distributed systems.",
            "skills": ["Go", "PostgreSQL"],
            "experience": [
                {"title": "Engineer", "company": "Acme", "duration": "2021-2024",
                 "achievements": ["Cut p99 latency by 40%"]}
            ],
            "projects": [
                {"name": "Queue", "description": "Message queue", "technologies": ["Go"],
                 "achievements": ["Handled 10k msg/s"]}
            ],
            "education": {"degree": "B.Sc.", "institution": "State University", "year": "2020"}
        }"#;
        let resume = parse_resume(json).unwrap();
        assert_eq!(resume.skills.len(), 2);
    }

    #[test]
    fn test_parse_resume_rejects_wrong_typed_field() {
        // skills as a string instead of an array must not be coerced
        let json = r#"{
            "summary": "ok",
            "skills": "Go, PostgreSQL",
            "experience": [],
            "projects": [],
            "education": {"degree": "d", "institution": "i", "year": "y"}
        }"#;
        let err = parse_resume(json).unwrap_err();
        assert_eq!(err.stage, Stage::ResumeRewrite);
        assert!(!err.snippet.is_empty());
    }

    #[test]
    fn test_parse_resume_rejects_empty_skills() {
        let json = r#"{
            "summary": "ok",
            "skills": [],
            "experience": [],
            "projects": [],
            "education": {"degree": "d", "institution": "i", "year": "y"}
        }"#;
        assert!(parse_resume(json).is_err());
    }

    #[test]
    fn test_parse_cover_letter_rejects_empty() {
        assert!(parse_cover_letter("\n  \n").is_err());
        assert_eq!(parse_cover_letter(" Dear team, ").unwrap(), "Dear team,");
    }

    #[test]
    fn test_parse_ats_report_clamps_overflow() {
        let json = r#"{
            "overallScore": 180,
            "categories": {
                "formatting": {"score": 90, "feedback": "ok"},
                "keywords": {"score": 80, "feedback": "ok"},
                "readability": {"score": 85, "feedback": "ok"},
                "actionVerbs": {"score": 120, "feedback": "ok"}
            },
            "missingKeywords": [],
            "recommendations": []
        }"#;
        let report = parse_ats_report(json).unwrap();
        assert_eq!(report.overall_score, 100);
        assert_eq!(report.categories.action_verbs.score, 100);
    }

    #[test]
    fn test_parse_ats_report_rejects_negative_score() {
        let json = r#"{
            "overallScore": -5,
            "categories": {
                "formatting": {"score": 90, "feedback": "ok"},
                "keywords": {"score": 80, "feedback": "ok"},
                "readability": {"score": 85, "feedback": "ok"},
                "actionVerbs": {"score": 75, "feedback": "ok"}
            },
            "missingKeywords": [],
            "recommendations": []
        }"#;
        assert!(parse_ats_report(json).is_err());
    }

    #[test]
    fn test_parse_ats_report_truncated_payload_fails() {
        let err = parse_ats_report(r#"{"overallScore": 85, "categories": {"#).unwrap_err();
        assert_eq!(err.stage, Stage::AtsBreakdown);
    }

    #[test]
    fn test_parse_skill_gap_valid_payload() {
        let json = r#"{
            "missingSkills": [{"skill": "Go", "importance": "High", "reason": "Required"}],
            "recommendedSkills": [],
            "existingSkills": ["Python"],
            "skillMatchPercentage": 60
        }"#;
        let report = parse_skill_gap(json).unwrap();
        assert_eq!(report.missing_skills[0].importance, Importance::High);
        assert_eq!(report.skill_match_percentage, 60);
    }

    #[test]
    fn test_parse_skill_gap_rejects_unknown_importance() {
        let json = r#"{
            "missingSkills": [{"skill": "Go", "importance": "Critical", "reason": "r"}],
            "recommendedSkills": [],
            "existingSkills": [],
            "skillMatchPercentage": 60
        }"#;
        assert!(parse_skill_gap(json).is_err());
    }

    #[test]
    fn test_parse_project_suggestions_rejects_empty_list() {
        assert!(parse_project_suggestions("[]").is_err());
    }

    #[test]
    fn test_parse_project_suggestions_valid_list() {
        let json = r#"[{
            "name": "API Gateway",
            "description": "A reverse proxy with rate limiting",
            "technologies": ["Go", "Redis"],
            "learningOutcomes": ["HTTP internals", "Caching"],
            "difficulty": "Intermediate",
            "estimatedTime": "3 weeks"
        }]"#;
        let projects = parse_project_suggestions(json).unwrap();
        assert_eq!(projects.len(), 1);
    }

    #[test]
    fn test_parse_error_snippet_is_truncated() {
        let long_garbage = "x".repeat(1000);
        let err = parse_ats_report(&long_garbage).unwrap_err();
        assert!(err.snippet.chars().count() <= 200);
    }
}
