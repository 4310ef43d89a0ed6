use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::assessment::status::AnalysisStatus;

/// One analysis attempt for an interview. Attempts are never deleted; a newer
/// completed attempt points older ones at itself via `superseded_by`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub framework_id: Uuid,
    pub assessor_id: Uuid,
    pub attempt: i32,
    /// PENDING | IN_PROGRESS | COMPLETED | FAILED
    pub analysis_status: String,
    pub scores: Value,
    pub overall_score: i32,
    /// HIRE | REJECT | REQUIRES_CLARIFICATION | PENDING
    pub recommendation: String,
    pub confidence: Option<f64>,
    pub feedback: Option<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub red_flags: Vec<String>,
    pub processing_time_secs: Option<i32>,
    pub analysis_results: Option<Value>,
    pub notes: Option<String>,
    pub superseded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentRow {
    pub fn status(&self) -> Option<AnalysisStatus> {
        AnalysisStatus::parse(&self.analysis_status)
    }
}

/// One interview of a job joined with its current assessment, if any.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobInterviewSummary {
    pub interview_id: Uuid,
    pub interview_status: String,
    pub overall_score: Option<i32>,
    pub recommendation: Option<String>,
}
