//! In-memory metric store.
//!
//! Rows are kept per asset in a `BTreeMap` keyed by `(ts, seq)`, so range reads
//! come back ordered by timestamp and duplicate timestamps keep insertion order.
//! A batch is staged in full before the write lock is taken; readers never see
//! part of a batch.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use telemetry_core::{Sample, StoredRow, TimeRange};

use super::{MetricStore, StoreError, StoreResult};

type Series = BTreeMap<(DateTime<Utc>, u64), StoredRow>;

#[derive(Default)]
struct Inner {
    series: HashMap<String, Series>,
    next_seq: u64,
}

/// Ordered in-process store with per-batch atomic visibility.
#[derive(Default)]
pub struct MemoryMetricStore {
    inner: RwLock<Inner>,
    /// 1-based index of the insert that fails; 0 disables the fault
    fail_at: AtomicUsize,
}

impl MemoryMetricStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `k`-th insert (1-based) of every following batch fail.
    ///
    /// `None` clears the fault.
    pub fn fail_insert_at(&self, k: Option<usize>) {
        self.fail_at.store(k.unwrap_or(0), Ordering::SeqCst);
    }

    /// Total number of committed rows across all assets.
    pub fn row_count(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.series.values().map(BTreeMap::len).sum()
    }
}

#[async_trait]
impl MetricStore for MemoryMetricStore {
    async fn write_batch(&self, asset_id: &str, samples: &[Sample]) -> StoreResult<u64> {
        let fail_at = self.fail_at.load(Ordering::SeqCst);

        let mut staged = Vec::with_capacity(samples.len());
        for (index, sample) in samples.iter().enumerate() {
            if index + 1 == fail_at {
                return Err(StoreError::Insert {
                    index,
                    reason: "injected insert failure".to_string(),
                });
            }
            staged.push(StoredRow::from_sample(asset_id, sample));
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut seq = inner.next_seq;
        let series = inner.series.entry(asset_id.to_string()).or_default();
        for row in staged {
            series.insert((row.ts, seq), row);
            seq += 1;
        }
        inner.next_seq = seq;

        Ok(samples.len() as u64)
    }

    async fn read_range(&self, asset_id: &str, range: TimeRange) -> StoreResult<Vec<StoredRow>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let rows = inner
            .series
            .get(asset_id)
            .map(|series| {
                series
                    .range((range.from, 0)..=(range.to, u64::MAX))
                    .map(|(_, row)| row.clone())
                    .collect()
            })
            .unwrap_or_default();

        Ok(rows)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn sample(secs: i64, temp: f64) -> Sample {
        Sample::new(ts(secs), temp, 50.0, 22.0, 18.0, 40.0)
    }

    #[tokio::test]
    async fn test_write_then_read_ordered() {
        let store = MemoryMetricStore::new();
        let batch = vec![sample(30, 3.0), sample(10, 1.0), sample(20, 2.0)];

        assert_eq!(store.write_batch("a", &batch).await.unwrap(), 3);

        let rows = store.read_range("a", TimeRange::new(ts(0), ts(60))).await.unwrap();
        let temps: Vec<f64> = rows.iter().map(|r| r.temp).collect();
        assert_eq!(temps, vec![1.0, 2.0, 3.0]);
        assert!(rows.iter().all(|r| r.asset_id == "a"));
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_no_rows() {
        let store = MemoryMetricStore::new();
        let batch = vec![sample(1, 1.0), sample(2, 2.0), sample(3, 3.0)];

        for k in 1..=batch.len() {
            store.fail_insert_at(Some(k));
            let err = store.write_batch("a", &batch).await.unwrap_err();
            assert!(matches!(err, StoreError::Insert { index, .. } if index == k - 1));
            assert_eq!(store.row_count(), 0);
        }

        store.fail_insert_at(None);
        store.write_batch("a", &batch).await.unwrap();
        assert_eq!(store.row_count(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_timestamps_are_kept() {
        let store = MemoryMetricStore::new();
        store.write_batch("a", &[sample(5, 1.0)]).await.unwrap();
        store.write_batch("a", &[sample(5, 2.0)]).await.unwrap();

        let rows = store.read_range("a", TimeRange::new(ts(5), ts(5))).await.unwrap();
        let temps: Vec<f64> = rows.iter().map(|r| r.temp).collect();
        assert_eq!(temps, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_backwards_range_is_empty() {
        let store = MemoryMetricStore::new();
        store.write_batch("a", &[sample(5, 1.0)]).await.unwrap();

        let rows = store.read_range("a", TimeRange::new(ts(10), ts(0))).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_asset_is_empty() {
        let store = MemoryMetricStore::new();
        store.write_batch("a", &[sample(5, 1.0)]).await.unwrap();

        let rows = store.read_range("b", TimeRange::new(ts(0), ts(10))).await.unwrap();
        assert!(rows.is_empty());
    }
}
