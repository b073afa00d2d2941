//! `StorageSink` and `StatsReader` backed by ClickHouse.

use crate::client::ClickHouseClient;
use crate::{health, insert, query};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clicker_core::{
    Banner, BannerId, ClickCounts, ClickStat, Result, StatsReader, StorageSink, TimeBucket,
};
use telemetry::health as health_registry;

/// Click storage in ClickHouse.
#[derive(Clone)]
pub struct ClickHouseStore {
    client: ClickHouseClient,
}

impl ClickHouseStore {
    pub fn new(client: ClickHouseClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ClickHouseClient {
        &self.client
    }

    /// Probe the server and update the health registry.
    pub async fn ping(&self) -> bool {
        health::check_connection(&self.client).await
    }
}

#[async_trait]
impl StorageSink for ClickHouseStore {
    async fn banner_exists(&self, banner_id: BannerId) -> Result<bool> {
        query::banner_exists(&self.client, banner_id).await
    }

    async fn save_clicks(&self, bucket: TimeBucket, clicks: &ClickCounts) -> Result<()> {
        let result = insert::insert_click_counts(&self.client, bucket, clicks).await;
        match &result {
            Ok(_) => health_registry().clickhouse.set_healthy(),
            Err(e) => health_registry().clickhouse.set_unhealthy(e.to_string()),
        }
        result.map(|_| ())
    }
}

#[async_trait]
impl StatsReader for ClickHouseStore {
    async fn get_stats(
        &self,
        banner_id: BannerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ClickStat>> {
        query::get_stats(&self.client, banner_id, from, to).await
    }

    async fn random_banners(&self, limit: u32) -> Result<Vec<Banner>> {
        query::random_banners(&self.client, limit).await
    }
}
