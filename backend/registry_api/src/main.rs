//! Neel Ledger registry service: entry point.
//!
//! Seeds the in-memory registry (optionally from the sample fixtures), opens
//! the SQLite audit trail and exposes the admin dashboard as an Axum REST
//! API. Every committed transition is persisted as an event row.

mod api;
mod config;
mod db;
mod errors;
mod events;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use neel_registry::{fixtures, ConfidenceScorer, MemoryStore, Registry};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controls verbosity.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Optional .env file.
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let pool = db::init_pool(&config.database_url).await?;

    let registry = if config.seed_fixtures {
        let store = fixtures::sample_store();
        info!(
            "Seeded registry with {} account(s) and {} project(s)",
            fixtures::accounts().len(),
            fixtures::projects().len()
        );
        Registry::new(store)
    } else {
        Registry::new(MemoryStore::new())
    };

    let state = Arc::new(api::ApiState {
        pool,
        registry: RwLock::new(registry),
        scorer: ConfidenceScorer::default(),
        threshold: config.confidence_threshold,
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/stats", get(api::get_stats))
        .route("/notifications", get(api::get_notifications))
        .route("/accounts", get(api::list_accounts))
        .route("/accounts/:id", get(api::get_account))
        .route("/accounts/:id/kyc", post(api::review_kyc))
        .route("/accounts/:id/kyc/start", post(api::begin_kyc_review))
        .route("/projects", get(api::list_projects))
        .route("/projects/:id", get(api::get_project))
        .route("/projects/:id/complete", post(api::complete_project))
        .route("/projects/:id/events", get(api::get_project_events))
        .route("/acvas", get(api::list_acvas))
        .route("/acvas/:id", get(api::get_acva))
        .route("/acvas/:id/status", post(api::set_acva_status))
        .route("/validations", get(api::list_validations))
        .route("/validations/:id/resolve", post(api::resolve_validation))
        .route("/verifications", get(api::list_verifications))
        .route("/verifications/:id/resolve", post(api::resolve_verification))
        .route("/xai/score", post(api::score))
        .route("/events", get(api::get_all_events))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!(
        "API listening on http://{addr} (confidence threshold {}%)",
        config.confidence_threshold
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
