//! Lead endpoints
//!
//! List filters arrive as query parameters; multi-valued ones are
//! comma-separated (`?status=new,contacted&priorityRating=4,5`).

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::str::FromStr;
use vdfd_common::export::{ExportFormat, ExportOptions};
use vdfd_common::filters::{LeadFilterOptions, LeadStats};
use vdfd_common::models::{Lead, LeadInput, LeadUpdate, PriorityRating};
use vdfd_common::store::SyncState;
use vdfd_common::sync::{DeleteOutcome, WriteOutcome};

use super::UserId;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadQuery {
    pub status: Option<String>,
    pub property_type: Option<String>,
    pub priority_rating: Option<String>,
    pub min_distress_score: Option<u8>,
    pub max_distress_score: Option<u8>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub tags: Option<String>,
}

impl LeadQuery {
    pub fn to_filter(&self) -> ApiResult<LeadFilterOptions> {
        let priority_rating = split(&self.priority_rating)
            .map(|v| {
                let value: u8 = v
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("invalid priority rating: {}", v)))?;
                Ok(PriorityRating::new(value)?)
            })
            .collect::<ApiResult<Vec<_>>>()?;

        Ok(LeadFilterOptions {
            status: parse_list(&self.status)?,
            property_type: parse_list(&self.property_type)?,
            priority_rating,
            min_distress_score: self.min_distress_score,
            max_distress_score: self.max_distress_score,
            start_date: self.start_date,
            end_date: self.end_date,
            tags: split(&self.tags).map(str::to_string).collect(),
        })
    }
}

fn split(raw: &Option<String>) -> impl Iterator<Item = &str> {
    raw.as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_list<T>(raw: &Option<String>) -> ApiResult<Vec<T>>
where
    T: FromStr<Err = vdfd_common::Error>,
{
    split(raw)
        .map(|v| v.parse::<T>().map_err(ApiError::from))
        .collect()
}

/// GET /api/leads
pub async fn list_leads(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<LeadQuery>,
) -> ApiResult<Json<Vec<Lead>>> {
    let filter = query.to_filter()?;
    Ok(Json(state.leads.list_leads(user.as_str(), &filter).await?))
}

/// POST /api/leads
pub async fn create_lead(
    State(state): State<AppState>,
    user: UserId,
    Json(input): Json<LeadInput>,
) -> ApiResult<(StatusCode, Json<WriteOutcome<Lead>>)> {
    let outcome = state.leads.create_lead(user.as_str(), input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /api/leads/:id
pub async fn get_lead(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> ApiResult<Json<Lead>> {
    Ok(Json(state.leads.get_lead(user.as_str(), &id).await?))
}

/// PATCH /api/leads/:id
pub async fn update_lead(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
    Json(update): Json<LeadUpdate>,
) -> ApiResult<Json<WriteOutcome<Lead>>> {
    Ok(Json(state.leads.update_lead(user.as_str(), &id, update).await?))
}

/// DELETE /api/leads/:id
pub async fn delete_lead(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    Ok(Json(state.leads.delete_lead(user.as_str(), &id).await?))
}

/// GET /api/leads/:id/sync
pub async fn lead_sync_state(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> ApiResult<Json<SyncState>> {
    Ok(Json(state.leads.sync_state(user.as_str(), &id).await?))
}

/// GET /api/leads/stats
pub async fn lead_stats(State(state): State<AppState>, user: UserId) -> ApiResult<Json<LeadStats>> {
    Ok(Json(state.leads.stats(user.as_str()).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub format: Option<String>,
    pub include_screenshots: Option<bool>,
    pub include_notes: Option<bool>,
}

impl ExportQuery {
    fn to_options(&self) -> ApiResult<ExportOptions> {
        let mut options = ExportOptions::default();
        if let Some(format) = &self.format {
            options.format = ExportFormat::from_str(format)?;
        }
        if let Some(include) = self.include_screenshots {
            options.include_screenshots = include;
        }
        if let Some(include) = self.include_notes {
            options.include_notes = include;
        }
        Ok(options)
    }
}

/// GET /api/leads/export?format=csv|json|pdf
///
/// Accepts the same filters as the list endpoint.
pub async fn export_leads(
    State(state): State<AppState>,
    user: UserId,
    Query(export): Query<ExportQuery>,
    Query(query): Query<LeadQuery>,
) -> ApiResult<impl IntoResponse> {
    let options = export.to_options()?;
    let filter = query.to_filter()?;
    let artifact = state.leads.export(user.as_str(), &filter, &options).await?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    Ok((
        [
            (header::CONTENT_TYPE, artifact.mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    ))
}
