//! Route modules for the telemetry server
//!
//! - metrics: batch ingestion and range queries per asset
//! - health: health check and readiness endpoints

pub mod health;
pub mod metrics;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

use crate::store::MetricStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Backing metric store
    pub store: Arc<dyn MetricStore>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(store: Arc<dyn MetricStore>) -> Self {
        Self {
            store,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the main application router by merging all route modules
///
/// Every request is logged at `info` with method, uri, status and latency.
pub fn build_router(store: Arc<dyn MetricStore>) -> Router {
    let state = AppState::new(store);

    let access_log = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    Router::new()
        .merge(health::routes())
        .merge(metrics::routes())
        .layer(access_log)
        .with_state(state)
}
