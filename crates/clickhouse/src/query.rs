//! Read-side queries: banner lookups and per-minute stats.

use crate::client::ClickHouseClient;
use chrono::{DateTime, TimeZone, Utc};
use clickhouse::Row;
use clicker_core::{Banner, BannerId, ClickStat, DbErrorCode, Error, Result};
use serde::Deserialize;
use tracing::warn;

/// Aggregated stats row.
#[derive(Debug, Clone, Row, Deserialize)]
pub struct StatRow {
    pub ts: i64,
    pub banner_id: String,
    pub count: u64,
}

impl StatRow {
    fn into_stat(self) -> Result<ClickStat> {
        let timestamp = Utc
            .timestamp_millis_opt(self.ts)
            .single()
            .ok_or_else(|| query_error(format!("timestamp out of range: {}", self.ts)))?;
        let banner_id = self
            .banner_id
            .parse()
            .map_err(|_| query_error(format!("invalid banner id in storage: {}", self.banner_id)))?;
        Ok(ClickStat {
            timestamp,
            banner_id,
            count: self.count,
        })
    }
}

#[derive(Debug, Clone, Row, Deserialize)]
struct BannerQueryRow {
    id: String,
    name: String,
}

fn query_error(msg: impl Into<String>) -> Error {
    Error::database(DbErrorCode::QueryFailed, msg)
}

/// True if a banner with this id was ever inserted.
pub async fn banner_exists(client: &ClickHouseClient, banner_id: BannerId) -> Result<bool> {
    let count: u64 = client
        .inner()
        .query("SELECT count() FROM banners WHERE id = ?")
        .bind(banner_id.to_string())
        .fetch_one()
        .await
        .map_err(|e| Error::database(DbErrorCode::LookupFailed, format!("Query error: {}", e)))?;
    Ok(count > 0)
}

/// Per-minute counts for one banner, `from <= timestamp <= to`, oldest first.
pub async fn get_stats(
    client: &ClickHouseClient,
    banner_id: BannerId,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<ClickStat>> {
    let rows: Vec<StatRow> = client
        .inner()
        .query(
            "SELECT toUnixTimestamp64Milli(timestamp) AS ts, banner_id, sum(count) AS count \
             FROM clicks \
             WHERE banner_id = ? AND toUnixTimestamp64Milli(timestamp) BETWEEN ? AND ? \
             GROUP BY timestamp, banner_id \
             ORDER BY timestamp",
        )
        .bind(banner_id.to_string())
        .bind(from.timestamp_millis())
        .bind(to.timestamp_millis())
        .fetch_all()
        .await
        .map_err(|e| query_error(format!("Query error: {}", e)))?;

    rows.into_iter().map(StatRow::into_stat).collect()
}

/// Up to `limit` banners in random order.
pub async fn random_banners(client: &ClickHouseClient, limit: u32) -> Result<Vec<Banner>> {
    let rows: Vec<BannerQueryRow> = client
        .inner()
        .query("SELECT id, name FROM banners FINAL ORDER BY rand() LIMIT ?")
        .bind(limit)
        .fetch_all()
        .await
        .map_err(|e| query_error(format!("Query error: {}", e)))?;

    let mut banners = Vec::with_capacity(rows.len());
    for row in rows {
        match row.id.parse() {
            Ok(id) => banners.push(Banner { id, name: row.name }),
            Err(_) => warn!(id = %row.id, "Skipping banner with malformed id"),
        }
    }
    Ok(banners)
}

/// Truncate click counts (test cleanup).
pub async fn truncate_clicks(client: &ClickHouseClient) -> Result<()> {
    client
        .inner()
        .query("TRUNCATE TABLE IF EXISTS clicks")
        .execute()
        .await
        .map_err(|e| query_error(format!("Truncate error: {}", e)))?;
    Ok(())
}
