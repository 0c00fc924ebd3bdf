//! Batch transport to the telemetry server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use telemetry_core::MetricPayload;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Errors raised while shipping a batch
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Connection, timeout, or encoding failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than 201 Created
    #[error("Unexpected status code: {status}")]
    UnexpectedStatus {
        /// Status returned by the server
        status: StatusCode,
    },
}

/// Sink for metric batches.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Deliver one batch.
    async fn send(&self, payload: &MetricPayload) -> Result<(), DispatchError>;
}

/// POSTs batches to `{api}/assets/{asset_id}/metrics`.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDispatcher {
    /// Create a dispatcher whose requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Ingestion endpoint for an asset
    pub fn metrics_url(&self, asset_id: &str) -> String {
        format!("{}/assets/{}/metrics", self.base_url, asset_id)
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn send(&self, payload: &MetricPayload) -> Result<(), DispatchError> {
        let url = self.metrics_url(&payload.asset_id);
        let response = self.client.post(&url).json(payload).send().await?;

        match response.status() {
            StatusCode::CREATED => Ok(()),
            status => Err(DispatchError::UnexpectedStatus { status }),
        }
    }
}

/// Ship a batch in the background.
///
/// Failures are logged and the batch is dropped; the caller never waits.
pub fn dispatch(dispatcher: Arc<dyn Dispatcher>, payload: MetricPayload) -> JoinHandle<()> {
    tokio::spawn(async move {
        match dispatcher.send(&payload).await {
            Ok(()) => debug!(
                asset_id = %payload.asset_id,
                samples = payload.len(),
                "Batch accepted"
            ),
            Err(e) => warn!(
                asset_id = %payload.asset_id,
                samples = payload.len(),
                error = %e,
                "Failed to send metrics, batch dropped"
            ),
        }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every batch instead of sending it.
    #[derive(Debug, Default)]
    pub struct RecordingDispatcher {
        batches: Mutex<Vec<MetricPayload>>,
    }

    impl RecordingDispatcher {
        pub fn batches(&self) -> Vec<MetricPayload> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Dispatcher for RecordingDispatcher {
        async fn send(&self, payload: &MetricPayload) -> Result<(), DispatchError> {
            self.batches.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    /// Accepts every batch and then never completes the send.
    #[derive(Debug, Default)]
    pub struct StalledDispatcher {
        attempts: Mutex<Vec<(tokio::time::Instant, usize)>>,
    }

    impl StalledDispatcher {
        /// When each send started and how many samples it carried.
        pub fn attempts(&self) -> Vec<(tokio::time::Instant, usize)> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Dispatcher for StalledDispatcher {
        async fn send(&self, payload: &MetricPayload) -> Result<(), DispatchError> {
            self.attempts
                .lock()
                .unwrap()
                .push((tokio::time::Instant::now(), payload.len()));
            std::future::pending().await
        }
    }
}
