//! ClickHouse table schemas.
//!
//! - `banners` is deduplicated by id on merge
//! - `clicks` sums `count` for rows sharing (timestamp, banner_id), so
//!   repeated saves into one minute add up; reads still `sum(count)` because
//!   merges happen in the background

use crate::client::ClickHouseClient;
use clicker_core::{Error, Result};
use tracing::debug;

/// SQL for creating the database. The name is substituted at runtime.
pub const CREATE_DATABASE: &str = "CREATE DATABASE IF NOT EXISTS {database}";

/// SQL for creating the banners table.
pub const CREATE_BANNERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS banners (
    id String,
    name String,
    created_at DateTime DEFAULT now()
)
ENGINE = ReplacingMergeTree(created_at)
ORDER BY id
"#;

/// SQL for creating the per-minute click counts table.
pub const CREATE_CLICKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS clicks (
    timestamp DateTime64(3),
    banner_id String,
    count UInt64
)
ENGINE = SummingMergeTree(count)
PARTITION BY toYYYYMM(timestamp)
ORDER BY (timestamp, banner_id)
"#;

/// Table creation statements, run inside the configured database.
pub fn all_tables() -> Vec<&'static str> {
    vec![CREATE_BANNERS_TABLE, CREATE_CLICKS_TABLE]
}

/// Initialize the database schema.
///
/// Creates the database and all tables if they don't exist.
pub async fn init_schema(client: &ClickHouseClient) -> Result<()> {
    let database = &client.config().database;
    if !database.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::config(format!("invalid database name: {}", database)));
    }

    client
        .server()
        .query(&CREATE_DATABASE.replace("{database}", database))
        .execute()
        .await
        .map_err(|e| Error::internal(format!("Schema init error: {}", e)))?;

    for sql in all_tables() {
        client
            .inner()
            .query(sql)
            .execute()
            .await
            .map_err(|e| Error::internal(format!("Schema init error: {}", e)))?;
    }

    debug!(database = %database, "ClickHouse schema initialized");
    Ok(())
}
