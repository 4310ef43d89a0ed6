//! Axum route handlers for prompt simulations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::simulation::PromptSimulationRow;
use crate::simulation::simulator::CreateSimulation;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SimulationListResponse {
    pub simulations: Vec<PromptSimulationRow>,
}

#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub simulation: PromptSimulationRow,
}

/// GET /api/v1/simulations
pub async fn handle_list_simulations(
    State(state): State<AppState>,
) -> Result<Json<SimulationListResponse>, AppError> {
    let simulations = state.simulations.store().list().await?;
    Ok(Json(SimulationListResponse { simulations }))
}

/// POST /api/v1/simulations
///
/// Creates the simulation and runs it synchronously. A failed run is still
/// stored (status FAILED) and the error is returned.
pub async fn handle_create_simulation(
    State(state): State<AppState>,
    Json(request): Json<CreateSimulation>,
) -> Result<Json<SimulationResponse>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let simulation = state.simulations.run_simulation(request).await?;
    Ok(Json(SimulationResponse { simulation }))
}

/// GET /api/v1/simulations/:id
pub async fn handle_get_simulation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SimulationResponse>, AppError> {
    let simulation = state
        .simulations
        .store()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Simulation {id} not found")))?;
    Ok(Json(SimulationResponse { simulation }))
}

/// DELETE /api/v1/simulations/:id
pub async fn handle_delete_simulation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.simulations.store().delete(id).await? {
        return Err(AppError::NotFound(format!("Simulation {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
