//! Test fixtures.

use chrono::{DateTime, Duration, Utc};
use clicker_core::{Banner, TimeBucket};

/// A banner with a readable name.
pub fn banner(name: &str) -> Banner {
    Banner::new(name)
}

/// `n` distinct banners.
pub fn banners(n: usize) -> Vec<Banner> {
    (0..n).map(|i| Banner::new(format!("Banner {}", i))).collect()
}

/// Parse an RFC 3339 timestamp.
pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap()
}

/// A query window wide enough to cover anything flushed during a test.
pub fn window_around_now() -> (String, String) {
    let now = Utc::now();
    (
        (now - Duration::hours(1)).to_rfc3339(),
        (now + Duration::hours(1)).to_rfc3339(),
    )
}

/// Minute bucket `minutes` after the one containing `base`.
pub fn bucket_after(base: DateTime<Utc>, minutes: i64) -> TimeBucket {
    TimeBucket::containing(base + Duration::minutes(minutes))
}
