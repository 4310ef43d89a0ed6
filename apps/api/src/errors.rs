use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assessment::orchestrator::AssessmentError;
use crate::matching::matcher::MatchError;
use crate::simulation::simulator::SimulationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A run was attempted and failed; `details` carries the underlying cause.
    #[error("{message}: {details}")]
    RunFailed { message: String, details: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AssessmentError> for AppError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            AssessmentError::PreconditionFailed(msg) => AppError::PreconditionFailed(msg),
            AssessmentError::InvalidFramework { .. } => AppError::UnprocessableEntity(err.to_string()),
            AssessmentError::Database(e) => AppError::Database(e),
            other => AppError::RunFailed {
                message: "Video analysis failed".to_string(),
                details: other.to_string(),
            },
        }
    }
}

impl From<SimulationError> for AppError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            SimulationError::Database(e) => AppError::Database(e),
            other => AppError::RunFailed {
                message: "Prompt simulation failed".to_string(),
                details: other.to_string(),
            },
        }
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        AppError::RunFailed {
            message: "Resume match failed".to_string(),
            details: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PreconditionFailed(msg) => {
                (StatusCode::BAD_REQUEST, "PRECONDITION_FAILED", msg.clone())
            }
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::RunFailed {
                message,
                details: cause,
            } => {
                tracing::error!("{message}: {cause}");
                details = Some(cause.clone());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RUN_FAILED",
                    message.clone(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "details": details
            }
        }));

        (status, body).into_response()
    }
}
