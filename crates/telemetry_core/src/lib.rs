//! # telemetry_core: Shared Data Model for Environmental Telemetry
//!
//! telemetry_core is the bottom layer of the workspace. Both the device fleet
//! simulator and the ingestion/query server depend on it, so the JSON shapes
//! exchanged over HTTP are defined exactly once:
//!
//! - [`Sample`]: one timestamped snapshot of every tracked quantity for an asset
//! - [`MetricPayload`]: a batch of samples for one asset (the POST body)
//! - [`StoredRow`]: the durable representation of one sample plus its asset id
//! - [`MetricRow`]: the query response shape (coverage deliberately omitted)
//! - [`TimeRange`]: an inclusive `[from, to]` timestamp range
//!
//! ## Usage Examples
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use telemetry_core::{MetricPayload, Sample};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
//! let sample = Sample::new(ts, 21.5, 55.0, 22.0, 19.0, 60.0);
//! let payload = MetricPayload::new("3f1c0e2a-9b7d-4c55-8e0f-1a2b3c4d5e6f", vec![sample]);
//!
//! assert_eq!(payload.len(), 1);
//! assert!(!payload.is_empty());
//! ```

#![deny(missing_docs)]

pub mod range;
pub mod sample;

pub use range::TimeRange;
pub use sample::{MetricPayload, MetricRow, Sample, StoredRow};
