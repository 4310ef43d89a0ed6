use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub file_name: String,
    pub content: Option<String>,
    pub skills: Vec<String>,
    /// Declared years of experience.
    pub experience: Option<i32>,
    pub education: Option<String>,
    pub ai_summary: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}
