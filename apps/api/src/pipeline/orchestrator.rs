//! Pipeline orchestration — runs the seven generation stages in their fixed
//! dependency order and assembles the final analysis bundle.
//!
//! Flow per stage: build prompt → generate → sanitize → parse → (on any
//! failure) substitute the stage fallback. External and parse failures never
//! abort the run; only an oversized input, caller cancellation, or an
//! internal invariant violation does. Stages 1–4 are strictly sequential
//! because each later prompt embeds earlier outputs; the ATS, skill-gap, and
//! project stages depend only on the rewritten résumé and detected role, so
//! they run concurrently and are joined before the bundle is assembled.

use std::time::Instant;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::llm_client::GenerationClient;
use crate::pipeline::fallback;
use crate::pipeline::models::{AnalysisBundle, ApplicantLevel, PipelineInput, Stage};
use crate::pipeline::parse::{self, ParseError};
use crate::pipeline::prompts::{PromptBuilder, PromptError};
use crate::pipeline::sanitize::sanitize;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input rejected before any generation call was issued.
    #[error(transparent)]
    InputTooLarge(#[from] PromptError),

    /// The caller cancelled the run; no bundle is surfaced.
    #[error("pipeline run cancelled")]
    Cancelled,

    /// Internal invariant violation, e.g. a fallback value failing its own
    /// schema validation. Never triggered by an external or parse failure.
    #[error("pipeline invariant violated at stage {stage}: {message}")]
    Invariant { stage: Stage, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageOutcome {
    Real,
    Fallback,
}

impl StageOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            StageOutcome::Real => "real",
            StageOutcome::Fallback => "fallback",
        }
    }
}

/// Runs the full seven-stage pipeline. Returns a fully-populated bundle or
/// an error — never a partial bundle.
pub async fn run_pipeline(
    client: &dyn GenerationClient,
    prompts: &PromptBuilder,
    input: &PipelineInput,
    cancel: &CancellationToken,
) -> Result<AnalysisBundle, PipelineError> {
    prompts.check_input(input)?;

    // Stage 1 — role detection. Every later prompt embeds the label.
    let detected_role = run_stage(
        client,
        cancel,
        Stage::RoleDetection,
        prompts.role_detection(input)?,
        parse::parse_role_label,
        fallback::role,
        |role: &String| {
            if role.trim().is_empty() {
                Err("empty role label".to_string())
            } else {
                Ok(())
            }
        },
    )
    .await?;

    // Stage 2 — template recommendation.
    let template = run_stage(
        client,
        cancel,
        Stage::TemplateRecommendation,
        prompts.template_recommendation(&detected_role, input.applicant_level),
        parse::parse_template_choice,
        fallback::template,
        |_| Ok(()),
    )
    .await?;

    // Stage 3 — résumé rewrite.
    let resume = run_stage(
        client,
        cancel,
        Stage::ResumeRewrite,
        prompts.resume_rewrite(input, &detected_role)?,
        parse::parse_resume,
        fallback::resume,
        |r| r.validate(),
    )
    .await?;

    // Stage 4 — cover letter.
    let cover_letter = run_stage(
        client,
        cancel,
        Stage::CoverLetter,
        prompts.cover_letter(input, &detected_role)?,
        parse::parse_cover_letter,
        || fallback::cover_letter(&input.company_name, &detected_role),
        |text: &String| {
            if text.trim().is_empty() {
                Err("empty cover letter".to_string())
            } else {
                Ok(())
            }
        },
    )
    .await?;

    // Stages 5–7 depend only on the rewritten résumé and the detected role,
    // so they run concurrently and join before assembly.
    let resume_json = serde_json::to_string(&resume).map_err(|e| PipelineError::Invariant {
        stage: Stage::AtsBreakdown,
        message: format!("failed to serialize résumé context: {e}"),
    })?;

    let ats_prompt = prompts.ats_breakdown(input, &resume_json, &detected_role)?;
    let gap_prompt = prompts.skill_gap(input, &resume_json, &detected_role)?;
    let projects_prompt = match input.applicant_level {
        ApplicantLevel::Fresher => Some(prompts.project_suggestions(input, &detected_role)?),
        ApplicantLevel::Experienced => None,
    };

    let ats_fut = run_stage(
        client,
        cancel,
        Stage::AtsBreakdown,
        ats_prompt,
        parse::parse_ats_report,
        fallback::ats_report,
        |r| r.validate(),
    );
    let gap_fut = run_stage(
        client,
        cancel,
        Stage::SkillGap,
        gap_prompt,
        parse::parse_skill_gap,
        fallback::skill_gap,
        |r| r.validate(),
    );
    // Stage 7 is skipped entirely for non-freshers; the bundle still carries
    // the (empty) field.
    let projects_fut = async {
        match projects_prompt {
            Some(prompt) => {
                run_stage(
                    client,
                    cancel,
                    Stage::ProjectSuggestions,
                    prompt,
                    parse::parse_project_suggestions,
                    fallback::project_suggestions,
                    |projects| {
                        if projects.is_empty() {
                            Err("empty project list".to_string())
                        } else {
                            Ok(())
                        }
                    },
                )
                .await
            }
            None => Ok(Vec::new()),
        }
    };

    let (ats_report, skill_gap, project_suggestions) = tokio::join!(ats_fut, gap_fut, projects_fut);

    Ok(AnalysisBundle {
        detected_role,
        template,
        resume,
        cover_letter,
        ats_report: ats_report?,
        skill_gap: skill_gap?,
        project_suggestions: project_suggestions?,
    })
}

/// Runs one stage: generate → sanitize → parse, degrading to the fallback on
/// any transport or parse failure. A fallback that fails validation is a
/// fatal invariant violation.
async fn run_stage<T, P, F, V>(
    client: &dyn GenerationClient,
    cancel: &CancellationToken,
    stage: Stage,
    prompt: String,
    parse: P,
    fallback: F,
    validate: V,
) -> Result<T, PipelineError>
where
    P: FnOnce(&str) -> Result<T, ParseError>,
    F: FnOnce() -> T,
    V: FnOnce(&T) -> Result<(), String>,
{
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let started = Instant::now();

    let generated = tokio::select! {
        _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
        result = client.generate(&prompt) => result,
    };

    let (value, outcome) = match generated {
        Ok(raw) => match parse(sanitize(&raw)) {
            Ok(value) => (value, StageOutcome::Real),
            Err(e) => {
                warn!(stage = %stage, snippet = %e.snippet, "unparseable stage payload, using fallback: {e}");
                (fallback(), StageOutcome::Fallback)
            }
        },
        Err(e) => {
            warn!(stage = %stage, "generation call failed, using fallback: {e}");
            (fallback(), StageOutcome::Fallback)
        }
    };

    // Real outputs were validated by their parser; a fallback has no excuse.
    if outcome == StageOutcome::Fallback {
        validate(&value).map_err(|message| PipelineError::Invariant { stage, message })?;
    }

    info!(
        stage = %stage,
        outcome = outcome.as_str(),
        latency_ms = started.elapsed().as_millis() as u64,
        "stage completed"
    );

    Ok(value)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
