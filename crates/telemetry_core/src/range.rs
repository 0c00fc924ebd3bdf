//! Inclusive timestamp ranges for metric queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive `[from, to]` range of sample timestamps.
///
/// A range with `from > to` is accepted and matches nothing.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use telemetry_core::TimeRange;
///
/// let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let t2 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
///
/// assert!(!TimeRange::new(t1, t2).is_empty());
/// assert!(!TimeRange::new(t1, t1).is_empty());
/// assert!(TimeRange::new(t2, t1).is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Lower bound (inclusive)
    pub from: DateTime<Utc>,
    /// Upper bound (inclusive)
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new range.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Whether the range is backwards and therefore matches nothing.
    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }
}
