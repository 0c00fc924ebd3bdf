//! Metric ingestion and query endpoints
//!
//! - `POST /assets/{asset_id}/metrics`: store a batch, all-or-nothing
//! - `GET /assets/{asset_id}/metrics?from=&to=`: rows in `[from, to]`, ascending by ts

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use telemetry_core::{MetricPayload, MetricRow, TimeRange};
use tracing::{debug, info, warn};

use super::AppState;
use crate::error::ApiError;

/// Body returned after a batch is committed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Query parameters of the range read, RFC 3339 timestamps
#[derive(Debug, Clone, Deserialize)]
pub struct RangeParams {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl From<RangeParams> for TimeRange {
    fn from(params: RangeParams) -> Self {
        TimeRange::new(params.from, params.to)
    }
}

/// Build the metrics routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/assets/{asset_id}/metrics",
        post(write_metrics).get(read_metrics),
    )
}

/// POST /assets/{asset_id}/metrics
///
/// The path identifier is authoritative; every row is attributed to it.
async fn write_metrics(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
    payload: Result<Json<MetricPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    if !payload.asset_id.is_empty() && payload.asset_id != asset_id {
        warn!(
            asset_id = %asset_id,
            body_asset_id = %payload.asset_id,
            "Body asset id differs from path; using path"
        );
    }

    let written = state.store.write_batch(&asset_id, &payload.metrics).await?;
    info!(asset_id = %asset_id, rows = written, "Batch stored");

    Ok((StatusCode::CREATED, Json(StatusResponse::success())))
}

/// GET /assets/{asset_id}/metrics?from=&to=
///
/// Query strings decode `+` as a space, so a positive UTC offset must be
/// percent-encoded (`%2B01:00`) or the timestamp given in `Z`; a raw `+` is a 400.
async fn read_metrics(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
    params: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<Vec<MetricRow>>, ApiError> {
    let Query(params) = params?;
    let range = TimeRange::from(params);

    let rows = state.store.read_range(&asset_id, range).await?;
    debug!(asset_id = %asset_id, rows = rows.len(), "Range served");

    Ok(Json(rows.into_iter().map(MetricRow::from).collect()))
}
