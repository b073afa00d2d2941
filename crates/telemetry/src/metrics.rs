//! In-process pipeline metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Latency histogram in milliseconds.
#[derive(Debug)]
pub struct Histogram {
    /// Upper bounds: 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s, 5s, +inf
    buckets: [AtomicU64; 9],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 8] = [1, 5, 10, 50, 100, 500, 1000, 5000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len());
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            count => self.sum() as f64 / count as f64,
        }
    }

    /// (upper bound, count) pairs; the overflow bucket reports `u64::MAX`.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .copied()
            .chain(std::iter::once(u64::MAX))
            .zip(self.buckets.iter())
            .map(|(bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Metrics for the click pipeline.
#[derive(Debug, Default)]
pub struct Metrics {
    // Intake
    pub clicks_received: Counter,
    pub clicks_enqueued: Counter,
    pub clicks_rejected: Counter,
    pub clicks_cancelled: Counter,
    pub banner_lookup_errors: Counter,
    pub banner_cache_hits: Counter,

    // Flush
    pub flushes: Counter,
    pub empty_flushes: Counter,
    pub flush_errors: Counter,
    pub clicks_flushed: Counter,
    pub clicks_dropped: Counter,
    pub clicks_requeued: Counter,

    // Storage
    pub storage_writes: Counter,
    pub storage_write_errors: Counter,

    pub flush_latency_ms: Histogram,
    pub storage_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            clicks_received: self.clicks_received.get(),
            clicks_enqueued: self.clicks_enqueued.get(),
            clicks_rejected: self.clicks_rejected.get(),
            clicks_cancelled: self.clicks_cancelled.get(),
            flushes: self.flushes.get(),
            flush_errors: self.flush_errors.get(),
            clicks_flushed: self.clicks_flushed.get(),
            clicks_dropped: self.clicks_dropped.get(),
            clicks_requeued: self.clicks_requeued.get(),
            flush_latency_mean_ms: self.flush_latency_ms.mean(),
            storage_latency_mean_ms: self.storage_latency_ms.mean(),
        }
    }
}

/// Serializable view of [`Metrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub clicks_received: u64,
    pub clicks_enqueued: u64,
    pub clicks_rejected: u64,
    pub clicks_cancelled: u64,
    pub flushes: u64,
    pub flush_errors: u64,
    pub clicks_flushed: u64,
    pub clicks_dropped: u64,
    pub clicks_requeued: u64,
    pub flush_latency_mean_ms: f64,
    pub storage_latency_mean_ms: f64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
