//! Explicit resync of records whose remote push never succeeded

use axum::extract::State;
use axum::Json;
use vdfd_common::sync::ResyncReport;

use super::UserId;
use crate::{ApiResult, AppState};

/// POST /api/sync
pub async fn resync_pending(State(state): State<AppState>, user: UserId) -> ApiResult<Json<ResyncReport>> {
    Ok(Json(state.leads.resync_pending(user.as_str()).await?))
}
