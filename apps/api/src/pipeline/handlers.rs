//! Axum route handlers for the analysis API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipeline::models::{
    AnalysisBundle, ApplicantLevel, CoverLetterTone, PipelineInput,
};
use crate::pipeline::orchestrator::run_pipeline;
use crate::pipeline::prompts::PromptBuilder;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub company_name: String,
    pub applicant_level: ApplicantLevel,
    pub job_description: String,
    #[serde(default)]
    pub current_resume: Option<String>,
    #[serde(default = "default_tone")]
    pub cover_letter_tone: CoverLetterTone,
}

fn default_tone() -> CoverLetterTone {
    CoverLetterTone::Formal
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub show_project_suggestions: bool,
    #[serde(flatten)]
    pub bundle: AnalysisBundle,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis
///
/// Runs the full generation pipeline and returns the aggregated bundle.
/// The bundle in the response body IS the hand-off to the caller's sink;
/// nothing is persisted here.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.company_name.trim().is_empty() {
        return Err(AppError::Validation("companyName cannot be empty".to_string()));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation("jobDescription cannot be empty".to_string()));
    }

    let input = PipelineInput {
        company_name: request.company_name,
        applicant_level: request.applicant_level,
        job_description: request.job_description,
        current_resume: request.current_resume,
        cover_letter_tone: request.cover_letter_tone,
    };

    let prompts = PromptBuilder::new(state.config.max_input_chars);
    // Axum drops the request future when the client disconnects, which
    // aborts the run; the token exists for callers that cancel explicitly.
    let cancel = CancellationToken::new();

    let bundle = run_pipeline(state.llm.as_ref(), &prompts, &input, &cancel).await?;

    Ok(Json(AnalyzeResponse {
        analysis_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        show_project_suggestions: input.applicant_level == ApplicantLevel::Fresher,
        bundle,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_request_deserializes_with_defaults() {
        let json = serde_json::json!({
            "companyName": "Acme",
            "applicantLevel": "Fresher",
            "jobDescription": "Backend engineer with Go experience"
        });
        let request: AnalyzeRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.cover_letter_tone, CoverLetterTone::Formal);
        assert!(request.current_resume.is_none());
    }

    #[test]
    fn test_analyze_request_rejects_unknown_applicant_level() {
        let json = serde_json::json!({
            "companyName": "Acme",
            "applicantLevel": "Veteran",
            "jobDescription": "jd"
        });
        assert!(serde_json::from_value::<AnalyzeRequest>(json).is_err());
    }
}
