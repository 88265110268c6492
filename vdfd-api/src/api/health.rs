//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// Short git hash baked in at compile time
    pub build: String,
    pub uptime_seconds: u64,
    /// "remote" when writes are mirrored, otherwise "local-only"
    pub sync: String,
}

/// GET /health
///
/// Does not require a user identity.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let sync = if state.remote_sync { "remote" } else { "local-only" };
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "vdfd-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: env!("GIT_HASH").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        sync: sync.to_string(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
