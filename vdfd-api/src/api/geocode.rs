//! Address fallback for when the front end's reverse geocoder fails

use axum::extract::Query;
use axum::Json;
use serde::{Deserialize, Serialize};
use vdfd_common::geo;

use super::UserId;
use crate::ApiResult;

#[derive(Debug, Deserialize)]
pub struct FallbackQuery {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct FallbackResponse {
    pub address: String,
}

/// GET /api/geocode/fallback?lat=&lng=
pub async fn fallback_address(
    _user: UserId,
    Query(query): Query<FallbackQuery>,
) -> ApiResult<Json<FallbackResponse>> {
    let address = geo::fallback_address(query.lat, query.lng)?;
    Ok(Json(FallbackResponse { address }))
}
