//! Axum route handlers for video analysis, reports and frameworks.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::assessment::framework::{FrameworkConfig, ScoringMethod};
use crate::assessment::orchestrator::{AssessmentOutcome, CustomConfig, RunAssessment};
use crate::assessment::report::{compute_job_stats, JobStats};
use crate::assessment::store::NewFramework;
use crate::errors::AppError;
use crate::models::assessment::AssessmentRow;
use crate::models::framework::FrameworkRow;
use crate::models::interview::InterviewRow;
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;
use crate::state::AppState;

const NOT_STARTED: &str = "NOT_STARTED";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeVideoRequest {
    pub assessor_id: Uuid,
    pub framework_id: Option<Uuid>,
    pub custom_config: Option<CustomConfig>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeVideoResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: AssessmentOutcome,
}

#[derive(Debug, Serialize)]
pub struct AnalysisStatusResponse {
    pub interview_id: Uuid,
    /// Status of the newest attempt, or NOT_STARTED.
    pub status: String,
    /// True once the newest attempt is COMPLETED or FAILED; pollers stop here.
    pub is_final: bool,
    pub assessment: Option<AssessmentRow>,
}

#[derive(Debug, Serialize)]
pub struct AssessmentHistoryResponse {
    pub interview_id: Uuid,
    pub attempts: Vec<AssessmentRow>,
}

#[derive(Debug, Serialize)]
pub struct InterviewReport {
    pub interview: InterviewRow,
    pub duration_minutes: Option<i64>,
    pub job: JobRow,
    pub applicant_name: String,
    pub latest_resume: Option<ResumeRow>,
    pub assessment: Option<AssessmentRow>,
    pub stats: JobStats,
}

#[derive(Debug, Deserialize)]
pub struct CreateFrameworkRequest {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub criteria: Value,
    pub weights: Value,
    pub scoring_method: Option<String>,
    #[serde(default)]
    pub analysis_config: Value,
    #[serde(default)]
    pub red_flags_config: Value,
    pub is_active: Option<bool>,
    pub creator_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct FrameworkListResponse {
    pub frameworks: Vec<FrameworkRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Video analysis
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews/:id/analyze-video
///
/// Runs one assessment attempt synchronously: fetch recording → evaluate →
/// score → persist. Earlier attempts stay in the history.
pub async fn handle_analyze_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnalyzeVideoRequest>,
) -> Result<Json<AnalyzeVideoResponse>, AppError> {
    let outcome = state
        .assessments
        .run_assessment(RunAssessment {
            interview_id: id,
            assessor_id: request.assessor_id,
            framework_id: request.framework_id,
            custom_config: request.custom_config,
        })
        .await?;

    Ok(Json(AnalyzeVideoResponse {
        message: "Video analysis completed".to_string(),
        outcome,
    }))
}

/// GET /api/v1/interviews/:id/analyze-video
pub async fn handle_analysis_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisStatusResponse>, AppError> {
    let latest = state.assessments.store().latest_attempt(id).await?;
    let (status, is_final) = attempt_status(latest.as_ref());

    Ok(Json(AnalysisStatusResponse {
        interview_id: id,
        status,
        is_final,
        assessment: latest,
    }))
}

fn attempt_status(latest: Option<&AssessmentRow>) -> (String, bool) {
    match latest {
        None => (NOT_STARTED.to_string(), false),
        Some(row) => match row.status() {
            Some(status) => (status.as_str().to_string(), status.is_terminal()),
            None => {
                warn!(
                    "Assessment {} has unknown status '{}'",
                    row.id, row.analysis_status
                );
                (row.analysis_status.clone(), false)
            }
        },
    }
}

/// GET /api/v1/interviews/:id/assessments
pub async fn handle_assessment_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssessmentHistoryResponse>, AppError> {
    let attempts = state.assessments.store().attempt_history(id).await?;
    Ok(Json(AssessmentHistoryResponse {
        interview_id: id,
        attempts,
    }))
}

/// GET /api/v1/interviews/:id/report
///
/// Current assessment plus how it compares with other candidates for the same job.
pub async fn handle_interview_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewReport>, AppError> {
    let store = state.assessments.store();
    let snapshot = store
        .load_interview(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;

    let assessment = store.current_assessment(id).await?;
    let summaries = store.job_interview_summaries(snapshot.job.id).await?;
    let stats = compute_job_stats(&summaries, assessment.as_ref().map(|a| a.overall_score));

    Ok(Json(InterviewReport {
        duration_minutes: snapshot.interview.duration_minutes(),
        interview: snapshot.interview,
        job: snapshot.job,
        applicant_name: snapshot.applicant_name,
        latest_resume: snapshot.latest_resume,
        assessment,
        stats,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Frameworks
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/frameworks
pub async fn handle_list_frameworks(
    State(state): State<AppState>,
) -> Result<Json<FrameworkListResponse>, AppError> {
    let frameworks = state.assessments.store().list_frameworks().await?;
    Ok(Json(FrameworkListResponse { frameworks }))
}

/// GET /api/v1/frameworks/:id
pub async fn handle_get_framework(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FrameworkRow>, AppError> {
    let framework = state
        .assessments
        .store()
        .load_framework(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment framework {id} not found")))?;
    Ok(Json(framework))
}

/// POST /api/v1/frameworks
///
/// Rejects rubrics that fail validation (weights must sum to 100) and
/// duplicate name/version pairs.
pub async fn handle_create_framework(
    State(state): State<AppState>,
    Json(request): Json<CreateFrameworkRequest>,
) -> Result<Json<FrameworkRow>, AppError> {
    if request.name.trim().is_empty() || request.version.trim().is_empty() {
        return Err(AppError::Validation(
            "name and version are required".to_string(),
        ));
    }

    let scoring_method = request
        .scoring_method
        .unwrap_or_else(|| ScoringMethod::WeightedAverage.as_str().to_string());

    FrameworkConfig::from_json(
        &request.criteria,
        &request.weights,
        &scoring_method,
        &request.analysis_config,
        &request.red_flags_config,
    )
    .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = state.assessments.store();
    let exists = store
        .list_frameworks()
        .await?
        .iter()
        .any(|f| f.name == request.name && f.version == request.version);
    if exists {
        return Err(AppError::Validation(format!(
            "Framework '{}' v{} already exists",
            request.name, request.version
        )));
    }

    let framework = store
        .create_framework(NewFramework {
            name: request.name,
            version: request.version,
            description: request.description,
            is_active: request.is_active.unwrap_or(true),
            criteria: request.criteria,
            weights: request.weights,
            scoring_method,
            analysis_config: empty_object_if_null(request.analysis_config),
            red_flags_config: empty_object_if_null(request.red_flags_config),
            creator_id: request.creator_id,
        })
        .await?;

    Ok(Json(framework))
}

fn empty_object_if_null(value: Value) -> Value {
    if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    }
}
