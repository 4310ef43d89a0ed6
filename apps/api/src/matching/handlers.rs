//! Axum route handler for resume-to-job matching.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::queries::{load_job, load_resume, load_user};
use crate::matching::matcher::{MatchReport, ResumeMatcher};
use crate::matching::prompts::NO_CANDIDATE_NAME;
use crate::models::job::JobRow;
use crate::state::AppState;

const ACTIVE_JOB_STATUS: &str = "ACTIVE";

#[derive(Debug, Deserialize)]
pub struct ResumeMatchQuery {
    pub resume_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ResumeMatchResponse {
    pub job_id: Uuid,
    pub resume_id: Uuid,
    pub report: MatchReport,
}

/// GET /api/v1/jobs/:id/resume-match?resume_id=
///
/// Scores one resume against an active job. Falls back to keyword matching
/// when the model call fails.
pub async fn handle_resume_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ResumeMatchQuery>,
) -> Result<Json<ResumeMatchResponse>, AppError> {
    let job = load_job(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    ensure_active(&job)?;

    let resume = load_resume(&state.db, query.resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {} not found", query.resume_id)))?;
    let applicant_name = load_user(&state.db, resume.applicant_id)
        .await?
        .map(|user| user.full_name())
        .unwrap_or_else(|| NO_CANDIDATE_NAME.to_string());

    let report = state.matcher.score(&job, &resume, &applicant_name).await?;

    Ok(Json(ResumeMatchResponse {
        job_id: job.id,
        resume_id: resume.id,
        report,
    }))
}

fn ensure_active(job: &JobRow) -> Result<(), AppError> {
    if job.status == ACTIVE_JOB_STATUS {
        Ok(())
    } else {
        Err(AppError::PreconditionFailed(format!(
            "Job {} is not active (status {})",
            job.id, job.status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::assessment::orchestrator::tests::job;

    #[test]
    fn test_active_job_accepted() {
        assert!(ensure_active(&job(Uuid::new_v4())).is_ok());
    }

    #[test]
    fn test_closed_job_rejected() {
        let mut closed = job(Uuid::new_v4());
        closed.status = "CLOSED".to_string();
        match ensure_active(&closed) {
            Err(AppError::PreconditionFailed(msg)) => assert!(msg.contains("CLOSED")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
