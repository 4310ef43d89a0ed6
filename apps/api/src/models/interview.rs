use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;

/// Lifecycle of the video interview itself (not of its assessment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCHEDULED" => Some(Self::Scheduled),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl InterviewRow {
    pub fn status(&self) -> Option<InterviewStatus> {
        InterviewStatus::parse(&self.status)
    }

    pub fn duration_minutes(&self) -> Option<i64> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some((end - start).num_minutes()),
            _ => None,
        }
    }
}

/// Everything the prompt builders need about one interview, loaded in one go.
#[derive(Debug, Clone)]
pub struct InterviewSnapshot {
    pub interview: InterviewRow,
    pub job: JobRow,
    pub applicant_name: String,
    /// Most recently uploaded resume, if the applicant has one.
    pub latest_resume: Option<ResumeRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_round_trips_known_values() {
        assert_eq!(InterviewStatus::parse("COMPLETED"), Some(InterviewStatus::Completed));
        assert_eq!(InterviewStatus::parse("IN_PROGRESS"), Some(InterviewStatus::InProgress));
        assert_eq!(InterviewStatus::parse("completed"), None);
    }
}
