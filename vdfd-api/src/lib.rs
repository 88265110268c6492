//! vdfd-api library - HTTP surface of the lead service
//!
//! Every `/api` route acts on behalf of the user named in the `X-User-Id`
//! header. `/health` needs no identity.

use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vdfd_common::service::{self, LeadService, RouteService};
use vdfd_common::store::LocalStore;
use vdfd_common::sync::Reconciler;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub leads: LeadService,
    pub routes: RouteService,
    /// Whether writes are mirrored to a remote store
    pub remote_sync: bool,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn LocalStore>, sync: Reconciler) -> Self {
        let remote_sync = sync.has_remote();
        let (leads, routes) = service::services(store, sync);
        Self {
            leads,
            routes,
            remote_sync,
            started_at: Instant::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api::api_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
