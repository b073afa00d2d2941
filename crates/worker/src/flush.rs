//! Flush coordinator: hands the aggregation bucket to storage.
//!
//! A flush is:
//! 1. Swap the live bucket for an empty one (the only step under the lock)
//! 2. Skip storage entirely if the snapshot is empty
//! 3. Save the snapshot under one time bucket, retrying per policy
//! 4. On final failure, drop the snapshot or merge it back into the live bucket
//!
//! The shutdown flush never merges back, there is no later window to take it.

use chrono::{DateTime, Utc};
use clicker_core::{ClickCounts, Result, StorageSink, TimeBucket};
use std::sync::Arc;
use std::time::{Duration, Instant};
use telemetry::metrics;
use tracing::{debug, error, warn};

use crate::aggregation::AggregationBucket;
use crate::config::PipelineConfig;

/// What to do when storage refuses a snapshot.
#[derive(Debug, Clone)]
pub struct FlushPolicy {
    /// Extra save attempts after the first failure
    pub retries: u32,
    /// Backoff between attempts, multiplied by the attempt number
    pub retry_backoff: Duration,
    /// Merge the snapshot back into the live bucket instead of dropping it
    pub requeue_on_failure: bool,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            retry_backoff: Duration::from_millis(100),
            requeue_on_failure: false,
        }
    }
}

impl From<&PipelineConfig> for FlushPolicy {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            retries: config.flush_retries,
            retry_backoff: config.retry_backoff(),
            requeue_on_failure: config.requeue_on_failure,
        }
    }
}

/// Result of one flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was pending; storage was not called.
    Skipped,
    Saved {
        bucket: TimeBucket,
        banners: usize,
        clicks: u64,
    },
    Failed {
        bucket: TimeBucket,
        clicks: u64,
        requeued: bool,
    },
}

/// Moves accumulated counts from the aggregation bucket to a storage sink.
pub struct FlushCoordinator {
    sink: Arc<dyn StorageSink>,
    bucket: Arc<AggregationBucket>,
    policy: FlushPolicy,
}

impl FlushCoordinator {
    pub fn new(
        sink: Arc<dyn StorageSink>,
        bucket: Arc<AggregationBucket>,
        policy: FlushPolicy,
    ) -> Self {
        Self {
            sink,
            bucket,
            policy,
        }
    }

    /// The bucket this coordinator drains.
    pub fn bucket(&self) -> &Arc<AggregationBucket> {
        &self.bucket
    }

    /// Flush under the time bucket for the current wall clock.
    pub async fn flush(&self) -> FlushOutcome {
        self.flush_at(Utc::now()).await
    }

    /// Flush under the time bucket containing `now`.
    pub async fn flush_at(&self, now: DateTime<Utc>) -> FlushOutcome {
        self.flush_snapshot(now, self.policy.requeue_on_failure).await
    }

    /// Last flush before stopping. A snapshot storage refuses is dropped
    /// even when the policy would requeue it.
    pub async fn flush_final(&self) -> FlushOutcome {
        self.flush_snapshot(Utc::now(), false).await
    }

    async fn flush_snapshot(&self, now: DateTime<Utc>, requeue: bool) -> FlushOutcome {
        let snapshot = self.bucket.swap();

        if snapshot.is_empty() {
            metrics().empty_flushes.inc();
            return FlushOutcome::Skipped;
        }

        let time_bucket = TimeBucket::containing(now);
        let banners = snapshot.len();
        let clicks = snapshot.total_clicks();
        let start = Instant::now();

        let result = self.save_with_retry(time_bucket, &snapshot).await;

        metrics()
            .flush_latency_ms
            .observe(start.elapsed().as_millis() as u64);
        metrics().flushes.inc();

        match result {
            Ok(()) => {
                metrics().clicks_flushed.inc_by(clicks);
                debug!(
                    bucket = %time_bucket,
                    banners = banners,
                    clicks = clicks,
                    latency_ms = %start.elapsed().as_millis(),
                    "Flushed clicks"
                );
                FlushOutcome::Saved {
                    bucket: time_bucket,
                    banners,
                    clicks,
                }
            }
            Err(e) => {
                metrics().flush_errors.inc();

                if requeue {
                    warn!(
                        bucket = %time_bucket,
                        clicks = clicks,
                        error = %e,
                        "Failed to save clicks, merging into next window"
                    );
                    self.bucket.merge(snapshot);
                    metrics().clicks_requeued.inc_by(clicks);
                    FlushOutcome::Failed {
                        bucket: time_bucket,
                        clicks,
                        requeued: true,
                    }
                } else {
                    error!(
                        bucket = %time_bucket,
                        clicks = clicks,
                        snapshot = ?snapshot,
                        error = %e,
                        "Failed to save clicks, dropping snapshot"
                    );
                    metrics().clicks_dropped.inc_by(clicks);
                    FlushOutcome::Failed {
                        bucket: time_bucket,
                        clicks,
                        requeued: false,
                    }
                }
            }
        }
    }

    async fn save_with_retry(&self, bucket: TimeBucket, snapshot: &ClickCounts) -> Result<()> {
        let mut attempt = 0;

        loop {
            match self.sink.save_clicks(bucket, snapshot).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.policy.retries => {
                    attempt += 1;
                    let backoff = self.policy.retry_backoff * attempt;
                    warn!(
                        attempt = attempt,
                        backoff_ms = %backoff.as_millis(),
                        error = %e,
                        "Retrying click flush"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
