//! Liveness endpoints.

use axum::extract::{Json, State};
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::domain::foundation::Timestamp;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the process started serving.
    pub uptime: u64,
    pub version: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct HealthState {
    started_at: Timestamp,
}

impl HealthState {
    pub fn new(started_at: Timestamp) -> Self {
        Self { started_at }
    }
}

/// Creates the health router.
pub fn health_routes(state: HealthState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
        .with_state(state)
}

/// GET /
async fn banner() -> &'static str {
    "FlowFi Backend is running"
}

/// GET /health
async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Timestamp::now().to_iso8601(),
        uptime: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
