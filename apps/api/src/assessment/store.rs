//! Assessment persistence.
//!
//! `AssessmentService` talks to storage only through `AssessmentStore`, so the
//! orchestration can run against an in-memory fake in tests. `PgAssessmentStore`
//! is the production implementation.
//!
//! Attempts are append-only: a rerun inserts a new row with the next attempt
//! number, and completing it points every earlier attempt at the new one via
//! `superseded_by`. Nothing is ever deleted.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::assessment::status::AnalysisStatus;
use crate::interview::queries::load_interview_snapshot;
use crate::models::assessment::{AssessmentRow, JobInterviewSummary};
use crate::models::framework::FrameworkRow;
use crate::models::interview::InterviewSnapshot;

#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub interview_id: Uuid,
    pub framework_id: Uuid,
    pub assessor_id: Uuid,
}

/// Results written when an attempt completes.
#[derive(Debug, Clone)]
pub struct CompletedAssessment {
    pub scores: Value,
    pub overall_score: i32,
    pub recommendation: String,
    pub confidence: f64,
    pub feedback: Option<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub red_flags: Vec<String>,
    pub processing_time_secs: i32,
    pub analysis_results: Value,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFramework {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub criteria: Value,
    pub weights: Value,
    pub scoring_method: String,
    pub analysis_config: Value,
    pub red_flags_config: Value,
    pub creator_id: Option<Uuid>,
}

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn load_interview(&self, interview_id: Uuid)
        -> Result<Option<InterviewSnapshot>, sqlx::Error>;

    async fn load_framework(&self, framework_id: Uuid) -> Result<Option<FrameworkRow>, sqlx::Error>;

    /// Most recently updated active framework with this name.
    async fn find_active_framework(&self, name: &str) -> Result<Option<FrameworkRow>, sqlx::Error>;

    async fn list_frameworks(&self) -> Result<Vec<FrameworkRow>, sqlx::Error>;

    async fn create_framework(&self, framework: NewFramework) -> Result<FrameworkRow, sqlx::Error>;

    /// Inserts a PENDING attempt numbered one past the interview's highest attempt.
    async fn create_attempt(&self, attempt: NewAttempt) -> Result<AssessmentRow, sqlx::Error>;

    /// Moves an attempt from `from` to `to`. Fails if the row is no longer in `from`.
    async fn transition(
        &self,
        assessment_id: Uuid,
        from: AnalysisStatus,
        to: AnalysisStatus,
    ) -> Result<(), sqlx::Error>;

    /// Writes results, marks the attempt COMPLETED and supersedes earlier attempts.
    async fn complete_attempt(
        &self,
        assessment_id: Uuid,
        results: CompletedAssessment,
    ) -> Result<AssessmentRow, sqlx::Error>;

    /// Marks the attempt FAILED and records the error text in `notes`.
    async fn fail_attempt(
        &self,
        assessment_id: Uuid,
        from: AnalysisStatus,
        error: &str,
    ) -> Result<(), sqlx::Error>;

    /// Newest attempt regardless of status.
    async fn latest_attempt(&self, interview_id: Uuid) -> Result<Option<AssessmentRow>, sqlx::Error>;

    /// The completed attempt nothing has superseded.
    async fn current_assessment(&self, interview_id: Uuid)
        -> Result<Option<AssessmentRow>, sqlx::Error>;

    /// All attempts, newest first.
    async fn attempt_history(&self, interview_id: Uuid) -> Result<Vec<AssessmentRow>, sqlx::Error>;

    async fn job_interview_summaries(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<JobInterviewSummary>, sqlx::Error>;
}

pub struct PgAssessmentStore {
    pool: PgPool,
}

impl PgAssessmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssessmentStore for PgAssessmentStore {
    async fn load_interview(
        &self,
        interview_id: Uuid,
    ) -> Result<Option<InterviewSnapshot>, sqlx::Error> {
        load_interview_snapshot(&self.pool, interview_id).await
    }

    async fn load_framework(&self, framework_id: Uuid) -> Result<Option<FrameworkRow>, sqlx::Error> {
        sqlx::query_as::<_, FrameworkRow>("SELECT * FROM assessment_frameworks WHERE id = $1")
            .bind(framework_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_active_framework(&self, name: &str) -> Result<Option<FrameworkRow>, sqlx::Error> {
        sqlx::query_as::<_, FrameworkRow>(
            r#"
            SELECT * FROM assessment_frameworks
            WHERE name = $1 AND is_active = TRUE
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_frameworks(&self) -> Result<Vec<FrameworkRow>, sqlx::Error> {
        sqlx::query_as::<_, FrameworkRow>(
            "SELECT * FROM assessment_frameworks ORDER BY is_active DESC, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn create_framework(&self, framework: NewFramework) -> Result<FrameworkRow, sqlx::Error> {
        sqlx::query_as::<_, FrameworkRow>(
            r#"
            INSERT INTO assessment_frameworks
                (id, name, version, description, is_active, criteria, weights,
                 scoring_method, analysis_config, red_flags_config, creator_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&framework.name)
        .bind(&framework.version)
        .bind(&framework.description)
        .bind(framework.is_active)
        .bind(&framework.criteria)
        .bind(&framework.weights)
        .bind(&framework.scoring_method)
        .bind(&framework.analysis_config)
        .bind(&framework.red_flags_config)
        .bind(framework.creator_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_attempt(&self, attempt: NewAttempt) -> Result<AssessmentRow, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Serialises concurrent reruns of the same interview.
        sqlx::query("SELECT id FROM interviews WHERE id = $1 FOR UPDATE")
            .bind(attempt.interview_id)
            .execute(&mut *tx)
            .await?;

        let current_max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(attempt) FROM assessments WHERE interview_id = $1")
                .bind(attempt.interview_id)
                .fetch_one(&mut *tx)
                .await?;

        let row = sqlx::query_as::<_, AssessmentRow>(
            r#"
            INSERT INTO assessments
                (id, interview_id, framework_id, assessor_id, attempt, analysis_status,
                 scores, overall_score, recommendation, strengths, weaknesses, red_flags)
            VALUES ($1, $2, $3, $4, $5, $6, '{}'::jsonb, 0, 'PENDING', '{}', '{}', '{}')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(attempt.interview_id)
        .bind(attempt.framework_id)
        .bind(attempt.assessor_id)
        .bind(current_max.unwrap_or(0) + 1)
        .bind(AnalysisStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn transition(
        &self,
        assessment_id: Uuid,
        from: AnalysisStatus,
        to: AnalysisStatus,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE assessments
            SET analysis_status = $3, updated_at = NOW()
            WHERE id = $1 AND analysis_status = $2
            "#,
        )
        .bind(assessment_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn complete_attempt(
        &self,
        assessment_id: Uuid,
        results: CompletedAssessment,
    ) -> Result<AssessmentRow, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AssessmentRow>(
            r#"
            UPDATE assessments
            SET analysis_status = $2,
                scores = $3,
                overall_score = $4,
                recommendation = $5,
                confidence = $6,
                feedback = $7,
                strengths = $8,
                weaknesses = $9,
                red_flags = $10,
                processing_time_secs = $11,
                analysis_results = $12,
                notes = $13,
                updated_at = NOW()
            WHERE id = $1 AND analysis_status = $14
            RETURNING *
            "#,
        )
        .bind(assessment_id)
        .bind(AnalysisStatus::Completed.as_str())
        .bind(&results.scores)
        .bind(results.overall_score)
        .bind(&results.recommendation)
        .bind(results.confidence)
        .bind(&results.feedback)
        .bind(&results.strengths)
        .bind(&results.weaknesses)
        .bind(&results.red_flags)
        .bind(results.processing_time_secs)
        .bind(&results.analysis_results)
        .bind(&results.notes)
        .bind(AnalysisStatus::InProgress.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE assessments
            SET superseded_by = $1, updated_at = NOW()
            WHERE interview_id = $2 AND id <> $1 AND attempt < $3 AND superseded_by IS NULL
            "#,
        )
        .bind(row.id)
        .bind(row.interview_id)
        .bind(row.attempt)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn fail_attempt(
        &self,
        assessment_id: Uuid,
        from: AnalysisStatus,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE assessments
            SET analysis_status = $3, notes = $4, updated_at = NOW()
            WHERE id = $1 AND analysis_status = $2
            "#,
        )
        .bind(assessment_id)
        .bind(from.as_str())
        .bind(AnalysisStatus::Failed.as_str())
        .bind(error)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn latest_attempt(&self, interview_id: Uuid) -> Result<Option<AssessmentRow>, sqlx::Error> {
        sqlx::query_as::<_, AssessmentRow>(
            "SELECT * FROM assessments WHERE interview_id = $1 ORDER BY attempt DESC LIMIT 1",
        )
        .bind(interview_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn current_assessment(
        &self,
        interview_id: Uuid,
    ) -> Result<Option<AssessmentRow>, sqlx::Error> {
        sqlx::query_as::<_, AssessmentRow>(
            r#"
            SELECT * FROM assessments
            WHERE interview_id = $1 AND analysis_status = $2 AND superseded_by IS NULL
            ORDER BY attempt DESC
            LIMIT 1
            "#,
        )
        .bind(interview_id)
        .bind(AnalysisStatus::Completed.as_str())
        .fetch_optional(&self.pool)
        .await
    }

    async fn attempt_history(&self, interview_id: Uuid) -> Result<Vec<AssessmentRow>, sqlx::Error> {
        sqlx::query_as::<_, AssessmentRow>(
            "SELECT * FROM assessments WHERE interview_id = $1 ORDER BY attempt DESC",
        )
        .bind(interview_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn job_interview_summaries(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<JobInterviewSummary>, sqlx::Error> {
        sqlx::query_as::<_, JobInterviewSummary>(
            r#"
            SELECT i.id AS interview_id,
                   i.status AS interview_status,
                   a.overall_score,
                   a.recommendation
            FROM interviews i
            LEFT JOIN assessments a
                ON a.interview_id = i.id
               AND a.analysis_status = $2
               AND a.superseded_by IS NULL
            WHERE i.job_id = $1
            ORDER BY i.created_at ASC
            "#,
        )
        .bind(job_id)
        .bind(AnalysisStatus::Completed.as_str())
        .fetch_all(&self.pool)
        .await
    }
}
