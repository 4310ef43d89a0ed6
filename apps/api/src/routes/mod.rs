pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::interview::handlers as interview;
use crate::matching::handlers as matching;
use crate::simulation::handlers as simulation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interviews
        .route(
            "/api/v1/interviews/:id/agent-prompt",
            get(interview::handle_agent_prompt),
        )
        .route(
            "/api/v1/interviews/:id/analyze-video",
            post(assessment::handle_analyze_video).get(assessment::handle_analysis_status),
        )
        .route(
            "/api/v1/interviews/:id/assessments",
            get(assessment::handle_assessment_history),
        )
        .route(
            "/api/v1/interviews/:id/report",
            get(assessment::handle_interview_report),
        )
        // Jobs
        .route(
            "/api/v1/jobs/:id/resume-match",
            get(matching::handle_resume_match),
        )
        // Assessment frameworks
        .route(
            "/api/v1/frameworks",
            get(assessment::handle_list_frameworks).post(assessment::handle_create_framework),
        )
        .route("/api/v1/frameworks/:id", get(assessment::handle_get_framework))
        // Prompt simulations
        .route(
            "/api/v1/simulations",
            get(simulation::handle_list_simulations).post(simulation::handle_create_simulation),
        )
        .route(
            "/api/v1/simulations/:id",
            get(simulation::handle_get_simulation).delete(simulation::handle_delete_simulation),
        )
        .with_state(state)
}
