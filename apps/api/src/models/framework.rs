use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::assessment::framework::{FrameworkConfig, FrameworkError};

/// Stored rubric. The JSON columns are only trusted after `config()` validates them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FrameworkRow {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FrameworkRow {
    /// Parses and validates the stored configuration.
    pub fn config(&self) -> Result<FrameworkConfig, FrameworkError> {
        FrameworkConfig::from_json(
            &self.criteria,
            &self.weights,
            &self.scoring_method,
            &self.analysis_config,
            &self.red_flags_config,
        )
    }
}
