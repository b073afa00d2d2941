//! In-memory storage sink for unit tests.

use async_trait::async_trait;
use clicker_core::{BannerId, ClickCounts, DbErrorCode, Error, Result, StorageSink, TimeBucket};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Sink that records every successful `save_clicks` call.
#[derive(Default)]
pub(crate) struct RecordingSink {
    banners: Mutex<HashSet<BannerId>>,
    saved: Mutex<Vec<(TimeBucket, ClickCounts)>>,
    save_attempts: AtomicUsize,
    lookups: AtomicUsize,
    failing_saves: AtomicU32,
    fail_lookups: AtomicBool,
    save_delay: Mutex<Option<Duration>>,
}

impl RecordingSink {
    pub fn with_banners(banners: impl IntoIterator<Item = BannerId>) -> Arc<Self> {
        let sink = Self::default();
        sink.banners.lock().extend(banners);
        Arc::new(sink)
    }

    pub fn saved(&self) -> Vec<(TimeBucket, ClickCounts)> {
        self.saved.lock().clone()
    }

    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Fail the next `n` saves.
    pub fn fail_next_saves(&self, n: u32) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    pub fn set_fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn set_save_delay(&self, delay: Duration) {
        *self.save_delay.lock() = Some(delay);
    }
}

#[async_trait]
impl StorageSink for RecordingSink {
    async fn banner_exists(&self, banner_id: BannerId) -> Result<bool> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(Error::database(DbErrorCode::LookupFailed, "lookup unavailable"));
        }
        Ok(self.banners.lock().contains(&banner_id))
    }

    async fn save_clicks(&self, bucket: TimeBucket, clicks: &ClickCounts) -> Result<()> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);

        let delay = *self.save_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::database(DbErrorCode::StoreFailed, "storage unavailable"));
        }

        self.saved.lock().push((bucket, clicks.clone()));
        Ok(())
    }
}
