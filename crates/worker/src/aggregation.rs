//! In-memory aggregation bucket.

use clicker_core::{BannerId, ClickCounts};
use parking_lot::Mutex;

/// Click counts accumulated since the last flush.
///
/// The lock is held only for single increments, merges and the swap that
/// hands the current counts to a flush, never across storage I/O.
#[derive(Debug, Default)]
pub struct AggregationBucket {
    pending: Mutex<ClickCounts>,
}

impl AggregationBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, banner_id: BannerId) {
        self.pending.lock().record(banner_id);
    }

    /// Replace the live counts with an empty set and return the old one.
    pub fn swap(&self) -> ClickCounts {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Add counts back, e.g. a snapshot storage refused.
    pub fn merge(&self, counts: ClickCounts) {
        self.pending.lock().merge(counts);
    }

    /// Distinct banners waiting for the next flush.
    pub fn pending_banners(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn pending_clicks(&self) -> u64 {
        self.pending.lock().total_clicks()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
