//! Route endpoints

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use vdfd_common::geo::Coordinate;
use vdfd_common::models::{Route, RouteInput, RouteUpdate};
use vdfd_common::sync::{DeleteOutcome, WriteOutcome};

use super::UserId;
use crate::{ApiError, ApiResult, AppState};

pub async fn list_routes(State(state): State<AppState>, user: UserId) -> ApiResult<Json<Vec<Route>>> {
    Ok(Json(state.routes.list_routes(user.as_str()).await?))
}

pub async fn create_route(
    State(state): State<AppState>,
    user: UserId,
    Json(input): Json<RouteInput>,
) -> ApiResult<(StatusCode, Json<WriteOutcome<Route>>)> {
    let outcome = state.routes.create_route(user.as_str(), input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn get_route(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> ApiResult<Json<Route>> {
    Ok(Json(state.routes.get_route(user.as_str(), &id).await?))
}

pub async fn update_route(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
    Json(update): Json<RouteUpdate>,
) -> ApiResult<Json<WriteOutcome<Route>>> {
    Ok(Json(state.routes.update_route(user.as_str(), &id, update).await?))
}

pub async fn delete_route(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    Ok(Json(state.routes.delete_route(user.as_str(), &id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    /// Defaults to the route's start location, then its first stop
    pub start_point: Option<Coordinate>,
}

/// POST /api/routes/:id/optimize
///
/// An empty body means no start point. A non-empty body must be a valid
/// JSON `OptimizeRequest` sent as `application/json`.
pub async fn optimize_route(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WriteOutcome<Route>>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let start_point = parse_optimize_body(content_type, &body)?.start_point;
    Ok(Json(
        state
            .routes
            .optimize_route(user.as_str(), &id, start_point)
            .await?,
    ))
}

fn parse_optimize_body(content_type: Option<&str>, body: &[u8]) -> ApiResult<OptimizeRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(OptimizeRequest::default());
    }
    let is_json = content_type
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(ApiError::BadRequest(
            "optimize request body must be application/json".to_string(),
        ));
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid optimize request: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json");

    #[test]
    fn test_empty_body_has_no_start_point() {
        assert!(parse_optimize_body(None, b"").unwrap().start_point.is_none());
        assert!(parse_optimize_body(JSON, b"  \n").unwrap().start_point.is_none());
        assert!(parse_optimize_body(JSON, b"{}").unwrap().start_point.is_none());
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        assert!(parse_optimize_body(JSON, br#"{"startPoint":{"lat":"x"}}"#).is_err());
        assert!(parse_optimize_body(JSON, b"start=1,2").is_err());
    }

    #[test]
    fn test_non_json_content_type_is_rejected() {
        let body = br#"{"startPoint":{"lat":41.4,"lng":-87.0}}"#;
        assert!(parse_optimize_body(Some("text/plain"), body).is_err());
        assert!(parse_optimize_body(None, body).is_err());
    }

    #[test]
    fn test_start_point_is_read() {
        let req = parse_optimize_body(
            Some("application/json; charset=utf-8"),
            br#"{"startPoint":{"lat":41.4,"lng":-87.0}}"#,
        )
        .unwrap();
        assert_eq!(req.start_point, Some(Coordinate::new(41.4, -87.0)));
    }
}
