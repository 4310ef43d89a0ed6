use sqlx::PgPool;
use uuid::Uuid;

use crate::models::interview::{InterviewRow, InterviewSnapshot};
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;
use crate::models::user::UserRow;

/// Loads an interview together with its job, applicant and latest resume.
/// Returns `None` when the interview, its job, or its applicant does not exist.
pub async fn load_interview_snapshot(
    pool: &PgPool,
    interview_id: Uuid,
) -> Result<Option<InterviewSnapshot>, sqlx::Error> {
    let Some(interview) =
        sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
            .bind(interview_id)
            .fetch_optional(pool)
            .await?
    else {
        return Ok(None);
    };

    let Some(job) = load_job(pool, interview.job_id).await? else {
        return Ok(None);
    };

    let Some(applicant) = load_user(pool, interview.applicant_id).await? else {
        return Ok(None);
    };

    let latest_resume = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE applicant_id = $1 ORDER BY uploaded_at DESC LIMIT 1",
    )
    .bind(applicant.id)
    .fetch_optional(pool)
    .await?;

    Ok(Some(InterviewSnapshot {
        interview,
        job,
        applicant_name: applicant.full_name(),
        latest_resume,
    }))
}

pub async fn load_job(pool: &PgPool, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

pub async fn load_resume(pool: &PgPool, resume_id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
        .bind(resume_id)
        .fetch_optional(pool)
        .await
}

pub async fn load_user(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
