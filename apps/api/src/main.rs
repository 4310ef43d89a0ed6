mod assessment;
mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod matching;
mod models;
mod recordings;
mod routes;
mod simulation;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::orchestrator::AssessmentService;
use crate::assessment::store::PgAssessmentStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::matching::matcher::{FallbackMatcher, LlmResumeMatcher, ResumeMatcher};
use crate::recordings::S3RecordingStore;
use crate::routes::build_router;
use crate::simulation::simulator::{PgSimulationStore, SimulationService};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hiring API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize model clients (one connection pool, three models)
    let evaluator = LlmClient::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    let simulator = evaluator.with_model(config.simulation_model.clone());
    let match_model = evaluator.with_model(config.matching_model.clone());
    info!(
        "LLM clients initialized (assessment: {}, simulation: {}, matching: {})",
        config.gemini_model, config.simulation_model, config.matching_model
    );

    let assessments = AssessmentService::new(
        Arc::new(PgAssessmentStore::new(db.clone())),
        Arc::new(S3RecordingStore::new(s3, config.s3_bucket.clone())),
        Arc::new(evaluator),
        config.default_framework_name.clone(),
    );

    let simulations = SimulationService::new(
        Arc::new(PgSimulationStore::new(db.clone())),
        Arc::new(simulator),
        config.company_name.clone(),
    );

    let matcher: Arc<dyn ResumeMatcher> = Arc::new(FallbackMatcher::new(Arc::new(
        LlmResumeMatcher::new(Arc::new(match_model)),
    )));

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        assessments,
        simulations,
        matcher,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "hiring-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets under the path, not as subdomains.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
