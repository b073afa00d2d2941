//! Click events and aggregated counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::{self, HashMap};

use crate::banner::BannerId;

/// A single click, as it travels through the intake queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub banner_id: BannerId,
}

impl ClickEvent {
    pub fn new(banner_id: BannerId) -> Self {
        Self { banner_id }
    }
}

/// Click counts per banner.
///
/// Merging is plain addition, so the order in which clicks are recorded
/// never changes the result. Counts saturate instead of wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickCounts {
    counts: HashMap<BannerId, u64>,
}

impl ClickCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one click.
    pub fn record(&mut self, banner_id: BannerId) {
        self.add(banner_id, 1);
    }

    /// Add `count` clicks for a banner.
    pub fn add(&mut self, banner_id: BannerId, count: u64) {
        if count == 0 {
            return;
        }
        let entry = self.counts.entry(banner_id).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Fold another set of counts into this one.
    pub fn merge(&mut self, other: ClickCounts) {
        if self.counts.is_empty() {
            self.counts = other.counts;
            return;
        }
        for (banner_id, count) in other.counts {
            self.add(banner_id, count);
        }
    }

    pub fn get(&self, banner_id: &BannerId) -> u64 {
        self.counts.get(banner_id).copied().unwrap_or(0)
    }

    /// Number of distinct banners.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total_clicks(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |acc, &count| acc.saturating_add(count))
    }

    pub fn iter(&self) -> hash_map::Iter<'_, BannerId, u64> {
        self.counts.iter()
    }

    pub fn contains(&self, banner_id: &BannerId) -> bool {
        self.counts.contains_key(banner_id)
    }
}

impl<'a> IntoIterator for &'a ClickCounts {
    type Item = (&'a BannerId, &'a u64);
    type IntoIter = hash_map::Iter<'a, BannerId, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

impl FromIterator<(BannerId, u64)> for ClickCounts {
    fn from_iter<I: IntoIterator<Item = (BannerId, u64)>>(iter: I) -> Self {
        let mut counts = ClickCounts::new();
        for (banner_id, count) in iter {
            counts.add(banner_id, count);
        }
        counts
    }
}

/// Persisted click statistic for one banner in one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickStat {
    pub timestamp: DateTime<Utc>,
    pub banner_id: BannerId,
    pub count: u64,
}
