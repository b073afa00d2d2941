//! Storage capabilities the pipeline and the read API depend on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::banner::{Banner, BannerId};
use crate::bucket::TimeBucket;
use crate::click::{ClickCounts, ClickStat};
use crate::error::Result;

/// Durable sink for aggregated click counts.
///
/// `save_clicks` must add to any count already stored for the same
/// (bucket, banner) key, never overwrite it.
#[async_trait]
pub trait StorageSink: Send + Sync {
    /// Whether the banner is known.
    async fn banner_exists(&self, banner_id: BannerId) -> Result<bool>;

    /// Increment-upsert every count in `clicks` under `bucket`.
    async fn save_clicks(&self, bucket: TimeBucket, clicks: &ClickCounts) -> Result<()>;
}

/// Read side over persisted statistics and banners.
#[async_trait]
pub trait StatsReader: Send + Sync {
    /// Stats for one banner with `from <= timestamp <= to`, oldest first.
    async fn get_stats(
        &self,
        banner_id: BannerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ClickStat>>;

    /// Up to `limit` banners in random order.
    async fn random_banners(&self, limit: u32) -> Result<Vec<Banner>>;
}
