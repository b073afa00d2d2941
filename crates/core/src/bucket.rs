//! Time buckets for persisted click statistics.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of a time bucket in seconds.
pub const TIME_BUCKET_GRANULARITY_SECS: i64 = 60;

/// Flush timestamp truncated to the bucket granularity.
///
/// All counts handed to storage in one flush share a single bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeBucket(DateTime<Utc>);

impl TimeBucket {
    /// Bucket containing `at`.
    pub fn containing(at: DateTime<Utc>) -> Self {
        let granularity = TimeDelta::seconds(TIME_BUCKET_GRANULARITY_SECS);
        // duration_trunc only fails for out-of-range timestamps; fall back to
        // second-level arithmetic in that case.
        let truncated = at.duration_trunc(granularity).unwrap_or_else(|_| {
            let secs = at.timestamp() - at.timestamp().rem_euclid(TIME_BUCKET_GRANULARITY_SECS);
            DateTime::from_timestamp(secs, 0).unwrap_or(at)
        });
        Self(truncated)
    }

    /// Bucket for the current wall clock time.
    pub fn now() -> Self {
        Self::containing(Utc::now())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.0
    }

    /// Milliseconds since the Unix epoch, as stored in DateTime64(3) columns.
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
