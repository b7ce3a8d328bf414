//! Axum REST API handlers.
//!
//! Reads take the registry's read lock. Admin actions take the write lock,
//! run one registry transition, then persist the events it published before
//! releasing the lock, so the audit trail is in commit order.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use neel_registry::{
    Account, Acva, AcvaStatus, AcvaStatusChange, ConfidenceScorer, DashboardStats, Decision,
    KycStatus, Notification, Project, Registry, RegistryEvent, Score, Validation,
    ValidationOutcome, ValidationStatus, Verification, VerificationOutcome, VerificationStatus,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::db;
use crate::errors::Result;
use crate::events::{EventRecord, NewEvent};

pub struct ApiState {
    pub pool: SqlitePool,
    pub registry: RwLock<Registry>,
    pub scorer: ConfidenceScorer,
    /// Threshold used when a score request does not name one.
    pub threshold: f64,
}

impl ApiState {
    /// Run one transition and persist what it published.
    ///
    /// If the audit write fails the registry is restored to its state before
    /// the call, so a 500 never leaves a half-applied action behind.
    async fn apply<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Registry) -> neel_registry::Result<T>,
    {
        let mut registry = self.registry.write().await;
        let snapshot = registry.clone();
        let out = op(&mut *registry)?;

        let events = registry.take_events();
        if let Err(err) = self.persist(&events).await {
            warn!("Audit write failed, rolling back {} event(s): {err}", events.len());
            *registry = snapshot;
            return Err(err);
        }
        Ok(out)
    }

    async fn persist(&self, events: &[RegistryEvent]) -> Result<()> {
        let rows = NewEvent::batch(events)?;
        db::insert_events(&self.pool, &rows).await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────
// Request and response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub count: usize,
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub project_id: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountFilter {
    pub kyc_status: Option<KycStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter<S> {
    pub status: Option<S>,
}

impl<S> Default for StatusFilter<S> {
    fn default() -> Self {
        Self { status: None }
    }
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

#[derive(Debug, Deserialize)]
pub struct AcvaStatusRequest {
    pub status: AcvaStatus,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub claimed: f64,
    pub predicted: f64,
    pub threshold: Option<f64>,
}

// ─────────────────────────────────────────────────────────
// Dashboard
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /stats`
pub async fn get_stats(State(state): State<Arc<ApiState>>) -> Json<DashboardStats> {
    Json(state.registry.read().await.stats())
}

/// `GET /notifications`
pub async fn get_notifications(State(state): State<Arc<ApiState>>) -> Json<Vec<Notification>> {
    Json(state.registry.read().await.notifications())
}

// ─────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────

/// `GET /accounts?kyc_status=`
pub async fn list_accounts(
    State(state): State<Arc<ApiState>>,
    Query(filter): Query<AccountFilter>,
) -> Json<ListResponse<Account>> {
    let registry = state.registry.read().await;
    let accounts = registry.list_where::<Account, _>(|a| {
        filter.kyc_status.map_or(true, |status| a.kyc_status == status)
    });
    debug!("Listing {} account(s)", accounts.len());
    Json(accounts.into())
}

/// `GET /accounts/:id`
pub async fn get_account(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Account>> {
    Ok(Json(state.registry.read().await.get(&id)?))
}

/// `POST /accounts/:id/kyc/start`
pub async fn begin_kyc_review(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Account>> {
    let account = state.apply(|r| r.begin_kyc_review(&id)).await?;
    Ok(Json(account))
}

/// `POST /accounts/:id/kyc`
pub async fn review_kyc(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<Account>> {
    let account = state.apply(|r| r.review_kyc(&id, body.decision)).await?;
    Ok(Json(account))
}

// ─────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────

/// `GET /projects`
pub async fn list_projects(State(state): State<Arc<ApiState>>) -> Json<ListResponse<Project>> {
    Json(state.registry.read().await.list::<Project>().into())
}

/// `GET /projects/:id`
pub async fn get_project(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Project>> {
    Ok(Json(state.registry.read().await.get(&id)?))
}

/// `POST /projects/:id/complete`
pub async fn complete_project(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Project>> {
    let project = state.apply(|r| r.complete_project(&id)).await?;
    Ok(Json(project))
}

// ─────────────────────────────────────────────────────────
// ACVAs
// ─────────────────────────────────────────────────────────

/// `GET /acvas`
pub async fn list_acvas(State(state): State<Arc<ApiState>>) -> Json<ListResponse<Acva>> {
    Json(state.registry.read().await.list::<Acva>().into())
}

/// `GET /acvas/:id`
pub async fn get_acva(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Acva>> {
    Ok(Json(state.registry.read().await.get(&id)?))
}

/// `POST /acvas/:id/status`
pub async fn set_acva_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(body): Json<AcvaStatusRequest>,
) -> Result<Json<AcvaStatusChange>> {
    let change = state.apply(|r| r.set_acva_status(&id, body.status)).await?;
    Ok(Json(change))
}

// ─────────────────────────────────────────────────────────
// Validations and verifications
// ─────────────────────────────────────────────────────────

/// `GET /validations?status=`
pub async fn list_validations(
    State(state): State<Arc<ApiState>>,
    Query(filter): Query<StatusFilter<ValidationStatus>>,
) -> Json<ListResponse<Validation>> {
    let registry = state.registry.read().await;
    let validations = registry
        .list_where::<Validation, _>(|v| filter.status.map_or(true, |status| v.status == status));
    Json(validations.into())
}

/// `POST /validations/:id/resolve`
pub async fn resolve_validation(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<ValidationOutcome>> {
    let outcome = state
        .apply(|r| r.resolve_validation(&id, body.decision))
        .await?;
    Ok(Json(outcome))
}

/// `GET /verifications?status=`
pub async fn list_verifications(
    State(state): State<Arc<ApiState>>,
    Query(filter): Query<StatusFilter<VerificationStatus>>,
) -> Json<ListResponse<Verification>> {
    let registry = state.registry.read().await;
    let verifications = registry
        .list_where::<Verification, _>(|v| filter.status.map_or(true, |status| v.status == status));
    Json(verifications.into())
}

/// `POST /verifications/:id/resolve`
pub async fn resolve_verification(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<VerificationOutcome>> {
    let outcome = state
        .apply(|r| r.resolve_verification(&id, body.decision))
        .await?;
    Ok(Json(outcome))
}

// ─────────────────────────────────────────────────────────
// XAI
// ─────────────────────────────────────────────────────────

/// `POST /xai/score`
pub async fn score(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<ScoreRequest>,
) -> Result<Json<Score>> {
    let threshold = body.threshold.unwrap_or(state.threshold);
    let score = state.scorer.score(body.claimed, body.predicted, threshold)?;
    debug!(
        "Scored claim {} vs prediction {}: {:.2}%",
        body.claimed, body.predicted, score.confidence
    );
    Ok(Json(score))
}

// ─────────────────────────────────────────────────────────
// Audit trail
// ─────────────────────────────────────────────────────────

/// `GET /projects/:id/events`
///
/// Returns every persisted event for the given project.
pub async fn get_project_events(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Result<Json<EventsResponse>> {
    let events = db::get_events_for_project(&state.pool, &project_id).await?;
    Ok(Json(EventsResponse {
        project_id,
        count: events.len(),
        events,
    }))
}

/// `GET /events`
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Result<Json<AllEventsResponse>> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}
