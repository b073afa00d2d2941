//! Batch insert helpers for ClickHouse.

use crate::client::ClickHouseClient;
use clickhouse::Row;
use clicker_core::{Banner, ClickCounts, DbErrorCode, Error, Result, TimeBucket};
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::debug;

/// One (minute, banner) count in the `clicks` table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct ClickRow {
    pub timestamp: i64, // DateTime64(3) as milliseconds
    pub banner_id: String,
    pub count: u64,
}

impl ClickRow {
    /// Rows for a flushed snapshot, all stamped with the same minute.
    pub fn from_counts(bucket: TimeBucket, counts: &ClickCounts) -> Vec<Self> {
        let timestamp = bucket.timestamp_millis();
        counts
            .iter()
            .map(|(banner_id, count)| Self {
                timestamp,
                banner_id: banner_id.to_string(),
                count: *count,
            })
            .collect()
    }
}

/// Row in the `banners` table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct BannerRow {
    pub id: String,
    pub name: String,
}

impl From<&Banner> for BannerRow {
    fn from(banner: &Banner) -> Self {
        Self {
            id: banner.id.to_string(),
            name: banner.name.clone(),
        }
    }
}

fn store_error(stage: &str, e: clickhouse::error::Error) -> Error {
    Error::database(DbErrorCode::StoreFailed, format!("{} error: {}", stage, e))
}

/// Insert a flushed snapshot as one batch.
pub async fn insert_click_counts(
    client: &ClickHouseClient,
    bucket: TimeBucket,
    counts: &ClickCounts,
) -> Result<usize> {
    if counts.is_empty() {
        return Ok(0);
    }

    let rows = ClickRow::from_counts(bucket, counts);
    let count = rows.len();
    let start = std::time::Instant::now();

    let result = write_rows(client, "clicks", &rows).await;

    let elapsed = start.elapsed();
    metrics().storage_latency_ms.observe(elapsed.as_millis() as u64);
    match result {
        Ok(()) => metrics().storage_writes.inc(),
        Err(e) => {
            metrics().storage_write_errors.inc();
            return Err(e);
        }
    }

    debug!(
        bucket = %bucket,
        rows = count,
        latency_ms = %elapsed.as_millis(),
        "Inserted click counts to ClickHouse"
    );

    Ok(count)
}

/// Insert banners (seeding and tests).
pub async fn insert_banners(client: &ClickHouseClient, banners: &[Banner]) -> Result<usize> {
    if banners.is_empty() {
        return Ok(0);
    }

    let rows: Vec<BannerRow> = banners.iter().map(BannerRow::from).collect();
    write_rows(client, "banners", &rows).await?;

    debug!(count = rows.len(), "Inserted banners to ClickHouse");
    Ok(rows.len())
}

async fn write_rows<T>(client: &ClickHouseClient, table: &str, rows: &[T]) -> Result<()>
where
    T: Row + Serialize,
{
    let mut insert = client
        .inner()
        .insert::<T>(table)
        .map_err(|e| store_error("Insert", e))?;

    for row in rows {
        insert
            .write(row)
            .await
            .map_err(|e| store_error("Write", e))?;
    }

    insert.end().await.map_err(|e| store_error("End", e))
}
