use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub skills: Vec<String>,
    /// Free-text experience band, e.g. "3-5 лет".
    pub experience: Option<String>,
    pub salary: Option<String>,
    /// DRAFT | ACTIVE | CLOSED
    pub status: String,
    pub assessment_framework_id: Option<Uuid>,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
