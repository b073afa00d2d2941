//! Mock implementations for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clicker_core::{
    Banner, BannerId, ClickCounts, ClickStat, DbErrorCode, Error, Result, StatsReader,
    StorageSink, TimeBucket,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory store with the same increment-on-conflict contract as ClickHouse.
///
/// Implements both `StorageSink` and `StatsReader`, so the real router and
/// pipeline run against it unchanged.
#[derive(Default)]
pub struct MockStore {
    banners: Mutex<Vec<Banner>>,
    /// (bucket, banner) -> count
    clicks: Mutex<BTreeMap<(TimeBucket, BannerId), u64>>,
    save_calls: AtomicUsize,
    fail_saves: AtomicBool,
    fail_lookups: AtomicBool,
}

impl MockStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_banners(banners: Vec<Banner>) -> Arc<Self> {
        let store = Self::default();
        *store.banners.lock() = banners;
        Arc::new(store)
    }

    pub fn add_banner(&self, banner: Banner) {
        self.banners.lock().push(banner);
    }

    /// Total stored for a banner across all buckets.
    pub fn total_for(&self, banner_id: BannerId) -> u64 {
        self.clicks
            .lock()
            .iter()
            .filter(|((_, id), _)| *id == banner_id)
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn count_at(&self, bucket: TimeBucket, banner_id: BannerId) -> u64 {
        self.clicks
            .lock()
            .get(&(bucket, banner_id))
            .copied()
            .unwrap_or(0)
    }

    /// Number of `save_clicks` calls, failed ones included.
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageSink for MockStore {
    async fn banner_exists(&self, banner_id: BannerId) -> Result<bool> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(Error::database(DbErrorCode::LookupFailed, "Mock lookup failure"));
        }
        Ok(self.banners.lock().iter().any(|b| b.id == banner_id))
    }

    async fn save_clicks(&self, bucket: TimeBucket, clicks: &ClickCounts) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::database(DbErrorCode::StoreFailed, "Mock store failure"));
        }

        let mut stored = self.clicks.lock();
        for (banner_id, count) in clicks {
            *stored.entry((bucket, *banner_id)).or_insert(0) += count;
        }
        Ok(())
    }
}

#[async_trait]
impl StatsReader for MockStore {
    async fn get_stats(
        &self,
        banner_id: BannerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ClickStat>> {
        // BTreeMap keys sort by bucket first, so rows come out oldest first
        Ok(self
            .clicks
            .lock()
            .iter()
            .filter(|((bucket, id), _)| {
                *id == banner_id && bucket.start() >= from && bucket.start() <= to
            })
            .map(|((bucket, id), count)| ClickStat {
                timestamp: bucket.start(),
                banner_id: *id,
                count: *count,
            })
            .collect())
    }

    async fn random_banners(&self, limit: u32) -> Result<Vec<Banner>> {
        Ok(self
            .banners
            .lock()
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_adds_on_conflict() {
        let banner = Banner::new("Test");
        let store = MockStore::with_banners(vec![banner.clone()]);
        let bucket = TimeBucket::now();

        let counts: ClickCounts = [(banner.id, 2)].into_iter().collect();
        store.save_clicks(bucket, &counts).await.unwrap();
        store.save_clicks(bucket, &counts).await.unwrap();

        assert_eq!(store.count_at(bucket, banner.id), 4);
        assert!(store.banner_exists(banner.id).await.unwrap());
        assert!(!store.banner_exists(BannerId::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_store_failure_modes() {
        let store = MockStore::new();
        store.set_fail_saves(true);
        store.set_fail_lookups(true);

        let err = store
            .save_clicks(TimeBucket::now(), &ClickCounts::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), Some("DB_001"));
        assert!(store.banner_exists(BannerId::new_v4()).await.is_err());
        assert_eq!(store.save_calls(), 1);
    }
}
