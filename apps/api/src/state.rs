use std::sync::Arc;

use sqlx::PgPool;

use crate::assessment::orchestrator::AssessmentService;
use crate::config::Config;
use crate::matching::matcher::ResumeMatcher;
use crate::simulation::simulator::SimulationService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator is built once in `main` and passed in; nothing is global.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Video analysis over `Arc<dyn AssessmentStore>`, `Arc<dyn RecordingStore>`
    /// and `Arc<dyn GenerativeModel>`.
    pub assessments: AssessmentService,
    pub simulations: SimulationService,
    pub matcher: Arc<dyn ResumeMatcher>,
}
