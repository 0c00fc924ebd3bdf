//! Samples, batches and stored rows.
//!
//! Field names match the wire format used between the fleet simulator and the
//! server (`ts`, `temp`, `amb_humid`, `setpoint`, `amb_temp`, `coverage`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable snapshot of all tracked quantities for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Instant the sample was taken
    pub ts: DateTime<Utc>,
    /// Controlled temperature (°C)
    pub temp: f64,
    /// Ambient relative humidity (%)
    pub amb_humid: f64,
    /// Temperature setpoint (°C)
    pub setpoint: f64,
    /// Ambient temperature (°C)
    pub amb_temp: f64,
    /// Coverage (%)
    pub coverage: f64,
}

impl Sample {
    /// Create a new sample.
    pub fn new(
        ts: DateTime<Utc>,
        temp: f64,
        amb_humid: f64,
        setpoint: f64,
        amb_temp: f64,
        coverage: f64,
    ) -> Self {
        Self {
            ts,
            temp,
            amb_humid,
            setpoint,
            amb_temp,
            coverage,
        }
    }
}

/// A batch of samples for a single asset, as sent to `POST /assets/{id}/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPayload {
    /// Asset the samples belong to
    pub asset_id: String,
    /// Samples in the order they were taken
    pub metrics: Vec<Sample>,
}

impl MetricPayload {
    /// Create a new payload.
    pub fn new(asset_id: impl Into<String>, metrics: Vec<Sample>) -> Self {
        Self {
            asset_id: asset_id.into(),
            metrics,
        }
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether the batch carries no samples.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Durable representation of one sample attributed to an asset.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Owning asset
    pub asset_id: String,
    /// Sample timestamp
    pub ts: DateTime<Utc>,
    /// Controlled temperature
    pub temp: f64,
    /// Ambient humidity
    pub amb_humid: f64,
    /// Setpoint
    pub setpoint: f64,
    /// Ambient temperature
    pub amb_temp: f64,
    /// Coverage
    pub coverage: f64,
}

impl StoredRow {
    /// Attribute a sample to an asset.
    pub fn from_sample(asset_id: impl Into<String>, sample: &Sample) -> Self {
        Self {
            asset_id: asset_id.into(),
            ts: sample.ts,
            temp: sample.temp,
            amb_humid: sample.amb_humid,
            setpoint: sample.setpoint,
            amb_temp: sample.amb_temp,
            coverage: sample.coverage,
        }
    }
}

/// Row returned by the query endpoint.
///
/// Coverage is stored but is not part of the response shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Sample timestamp
    pub ts: DateTime<Utc>,
    /// Controlled temperature
    pub temp: f64,
    /// Ambient humidity
    pub amb_humid: f64,
    /// Setpoint
    pub setpoint: f64,
    /// Ambient temperature
    pub amb_temp: f64,
}

impl From<StoredRow> for MetricRow {
    fn from(row: StoredRow) -> Self {
        Self {
            ts: row.ts,
            temp: row.temp,
            amb_humid: row.amb_humid,
            setpoint: row.setpoint,
            amb_temp: row.amb_temp,
        }
    }
}
