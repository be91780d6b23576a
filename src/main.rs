//! OncoDx Inference Server
//!
//! Diagnostic inference backend: single and batch prediction over 30 tabular
//! measurements with decision-path attribution explanations.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     ONCODX SERVER                          │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌────────────────────────────────────────┐ │
//! │  │  API      │  │  Prediction Pipeline                   │ │
//! │  │  (Axum)   │─▶│  Scaler ▶ Classifier ▶ Confidence      │ │
//! │  │           │  │         ▶ Attribution (best-effort)    │ │
//! │  └─────┬─────┘  └────────────────────────────────────────┘ │
//! │        ▼                                                   │
//! │  ┌───────────┐  history (append-only)                      │
//! │  │  SQLite   │                                             │
//! │  └───────────┘                                             │
//! └────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod error;
mod handlers;
mod logic;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logic::artifacts;
use logic::explain::TreeExplainer;
use logic::pipeline::PredictionPipeline;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oncodx_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("OncoDx server starting...");

    // Load artifacts. Absence or corruption of either is fatal: the process
    // must never become ready with a partial pipeline.
    let pipeline = build_pipeline(&config).expect("Failed to load inference artifacts");

    // Initialize database pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await.expect("Failed to run migrations");

    // Build application state
    let state = AppState {
        pool,
        config: config.clone(),
        pipeline,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Assemble the pipeline from the configured artifact files.
fn build_pipeline(config: &config::Config) -> anyhow::Result<Arc<PredictionPipeline>> {
    let scaler = artifacts::load_scaler(&config.scaler_path)
        .context("scaler artifact")?;
    let classifier = artifacts::load_classifier(&config.model_path)
        .context("classifier artifact")?;

    // The explainer is optional: unsupported model families degrade to
    // predictions without explanations for the process lifetime.
    let explainer = match TreeExplainer::try_new(classifier.clone()) {
        Ok(explainer) => Some(explainer),
        Err(e) => {
            tracing::warn!(error = %e, "attribution unavailable, serving predictions only");
            None
        }
    };

    Ok(Arc::new(PredictionPipeline::new(scaler, classifier, explainer)))
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub config: config::Config,
    pub pipeline: Arc<PredictionPipeline>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict_csv", post(handlers::batch::predict_csv))
        .route("/api/history", get(handlers::history::get_history))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
