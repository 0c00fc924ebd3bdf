//! Durable storage for metric rows
//!
//! [`MetricStore`] is the seam between the HTTP handlers and the backing
//! store. Two implementations are provided:
//! - [`PgMetricStore`]: PostgreSQL via `sqlx`, one transaction per batch
//! - [`MemoryMetricStore`]: ordered in-process store with the same
//!   all-or-nothing batch semantics

mod memory;
mod postgres;

pub use memory::MemoryMetricStore;
pub use postgres::PgMetricStore;

use std::sync::Arc;

use async_trait::async_trait;
use telemetry_core::{Sample, StoredRow, TimeRange};
use thiserror::Error;

use crate::config::{ServerConfig, StorageKind};

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid asset id: {0}")]
    InvalidAssetId(String),

    #[error("Insert of sample {index} failed: {reason}")]
    Insert { index: usize, reason: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable, time-ordered store of metric rows partitioned by asset.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Append every sample as a row attributed to `asset_id`.
    ///
    /// Either all rows become visible or none do. Returns the number of rows written.
    async fn write_batch(&self, asset_id: &str, samples: &[Sample]) -> StoreResult<u64>;

    /// All rows of `asset_id` with `range.from <= ts <= range.to`, ascending by ts.
    async fn read_range(&self, asset_id: &str, range: TimeRange) -> StoreResult<Vec<StoredRow>>;

    /// Check that the store can serve requests.
    async fn ping(&self) -> StoreResult<()>;

    /// Backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Open the store selected by the configuration.
pub async fn open(config: &ServerConfig) -> StoreResult<Arc<dyn MetricStore>> {
    match config.storage {
        StorageKind::Postgres => {
            let store = PgMetricStore::connect(&config.db_uri, config.max_connections).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage; rows are lost on exit");
            Ok(Arc::new(MemoryMetricStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let config = ServerConfig {
            storage: StorageKind::Memory,
            ..Default::default()
        };

        let store = open(&config).await.unwrap();
        assert_eq!(store.backend(), "memory");
        assert!(store.ping().await.is_ok());
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Insert {
            index: 2,
            reason: "constraint violated".to_string(),
        };
        assert_eq!(err.to_string(), "Insert of sample 2 failed: constraint violated");

        let err = StoreError::InvalidAssetId("abc".to_string());
        assert!(err.to_string().contains("abc"));
    }
}
