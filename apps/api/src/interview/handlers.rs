use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::prompt_builder::{
    construct_interview_prompt, interview_prompt_data, InterviewPromptData,
};
use crate::interview::queries::load_interview_snapshot;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AgentPromptResponse {
    pub interview_id: Uuid,
    pub prompt: String,
    /// The structured inputs the prompt was rendered from.
    pub data: InterviewPromptData,
}

/// GET /api/v1/interviews/:id/agent-prompt
///
/// Returns the instruction string for the video-interview agent.
pub async fn handle_agent_prompt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AgentPromptResponse>, AppError> {
    let snapshot = load_interview_snapshot(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;

    let data = interview_prompt_data(&snapshot, &state.config.company_name);
    let prompt = construct_interview_prompt(&data);

    Ok(Json(AgentPromptResponse {
        interview_id: id,
        prompt,
        data,
    }))
}
