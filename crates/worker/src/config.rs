//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Intake queue, flush timer, and failure policy settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    /// Intake queue capacity (events)
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, max = 1_000_000))]
    pub queue_capacity: usize,
    /// Flush interval in milliseconds
    #[serde(default = "default_flush_interval_ms")]
    #[validate(range(min = 10))]
    pub flush_interval_ms: u64,
    /// Extra attempts for a failed flush before giving up on it
    #[serde(default)]
    #[validate(range(max = 10))]
    pub flush_retries: u32,
    /// Backoff between flush attempts in milliseconds (multiplied by attempt)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Merge a snapshot that could not be stored back into the live bucket
    #[serde(default)]
    pub requeue_on_failure: bool,
    /// How long a positive banner lookup is trusted, in seconds
    #[serde(default = "default_banner_cache_ttl_secs")]
    pub banner_cache_ttl_secs: u64,
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_flush_interval_ms() -> u64 {
    5000
}

fn default_retry_backoff_ms() -> u64 {
    100
}

fn default_banner_cache_ttl_secs() -> u64 {
    60
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            flush_interval_ms: default_flush_interval_ms(),
            flush_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            requeue_on_failure: false,
            banner_cache_ttl_secs: default_banner_cache_ttl_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn banner_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.banner_cache_ttl_secs)
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}
