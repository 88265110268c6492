//! HTTP API handlers for vdfd-api

pub mod geocode;
pub mod health;
pub mod identity;
pub mod leads;
pub mod routes;
pub mod sync;

pub use health::health_routes;
pub use identity::UserId;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;

/// Routes nested under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/leads", get(leads::list_leads).post(leads::create_lead))
        .route("/leads/stats", get(leads::lead_stats))
        .route("/leads/export", get(leads::export_leads))
        .route(
            "/leads/:id",
            get(leads::get_lead)
                .patch(leads::update_lead)
                .delete(leads::delete_lead),
        )
        .route("/leads/:id/sync", get(leads::lead_sync_state))
        .route("/routes", get(routes::list_routes).post(routes::create_route))
        .route(
            "/routes/:id",
            get(routes::get_route)
                .patch(routes::update_route)
                .delete(routes::delete_route),
        )
        .route("/routes/:id/optimize", post(routes::optimize_route))
        .route("/sync", post(sync::resync_pending))
        .route("/geocode/fallback", get(geocode::fallback_address))
}
