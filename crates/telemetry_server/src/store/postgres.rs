//! PostgreSQL-backed metric store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use telemetry_core::{Sample, StoredRow, TimeRange};
use tracing::{debug, info};
use uuid::Uuid;

use super::{MetricStore, StoreError, StoreResult};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS asset_metrics (
        asset_id  UUID             NOT NULL,
        ts        TIMESTAMPTZ      NOT NULL,
        temp      DOUBLE PRECISION,
        amb_humid DOUBLE PRECISION,
        setpoint  DOUBLE PRECISION,
        amb_temp  DOUBLE PRECISION,
        coverage  DOUBLE PRECISION
    )
"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS asset_metrics_asset_ts_idx ON asset_metrics (asset_id, ts)";

const INSERT_METRIC: &str = r#"
    INSERT INTO asset_metrics (asset_id, ts, temp, amb_humid, setpoint, amb_temp, coverage)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

const SELECT_RANGE: &str = r#"
    SELECT ts, temp, amb_humid, setpoint, amb_temp, coverage
    FROM asset_metrics
    WHERE asset_id = $1 AND ts BETWEEN $2 AND $3
    ORDER BY ts
"#;

/// Metric store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgMetricStore {
    pool: PgPool,
}

impl PgMetricStore {
    /// Connect a pool to `uri`.
    pub async fn connect(uri: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(uri)
            .await?;

        info!(max_connections, "Database connected");
        Ok(Self { pool })
    }

    /// Create the metrics table and its index if they do not exist.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        debug!("Schema ready");
        Ok(())
    }
}

/// Pool shutdown and acquire timeouts map to `Unavailable`.
fn pool_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => StoreError::Unavailable(e.to_string()),
        other => StoreError::Database(other),
    }
}

fn parse_asset_id(asset_id: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(asset_id).map_err(|_| StoreError::InvalidAssetId(asset_id.to_string()))
}

#[async_trait]
impl MetricStore for PgMetricStore {
    async fn write_batch(&self, asset_id: &str, samples: &[Sample]) -> StoreResult<u64> {
        let asset = parse_asset_id(asset_id)?;

        // Dropping `tx` without commit rolls the whole batch back.
        let mut tx = self.pool.begin().await.map_err(pool_error)?;

        // sqlx prepares INSERT_METRIC once per connection and reuses it for every row.
        let mut written = 0;
        for (index, sample) in samples.iter().enumerate() {
            let result = sqlx::query(INSERT_METRIC)
                .bind(asset)
                .bind(sample.ts)
                .bind(sample.temp)
                .bind(sample.amb_humid)
                .bind(sample.setpoint)
                .bind(sample.amb_temp)
                .bind(sample.coverage)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Insert {
                    index,
                    reason: e.to_string(),
                })?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }

    async fn read_range(&self, asset_id: &str, range: TimeRange) -> StoreResult<Vec<StoredRow>> {
        let asset = parse_asset_id(asset_id)?;
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(SELECT_RANGE)
            .bind(asset)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(&self.pool)
            .await
            .map_err(pool_error)?;

        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            stored.push(StoredRow {
                asset_id: asset_id.to_string(),
                ts: row.try_get::<DateTime<Utc>, _>("ts")?,
                temp: row.try_get::<Option<f64>, _>("temp")?.unwrap_or_default(),
                amb_humid: row.try_get::<Option<f64>, _>("amb_humid")?.unwrap_or_default(),
                setpoint: row.try_get::<Option<f64>, _>("setpoint")?.unwrap_or_default(),
                amb_temp: row.try_get::<Option<f64>, _>("amb_temp")?.unwrap_or_default(),
                coverage: row.try_get::<Option<f64>, _>("coverage")?.unwrap_or_default(),
            });
        }

        Ok(stored)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(pool_error)?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
