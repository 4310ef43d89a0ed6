use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromptSimulationRow {
    pub id: Uuid,
    pub name: String,
    pub job_id: Uuid,
    pub resume_id: Uuid,
    /// Custom HR prompt under test; empty means the production prompt was used.
    pub hr_prompt: String,
    /// PENDING | COMPLETED | FAILED
    pub status: String,
    pub dialogue: Option<Value>,
    pub analysis: Option<Value>,
    /// Overall prompt-quality score from the analysis.
    pub score: Option<i32>,
    pub error_message: Option<String>,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
