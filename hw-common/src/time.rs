//! Timestamp utilities
//!
//! Stored cache entries carry millisecond epoch timestamps so the on-disk
//! format matches what the browser shell writes.

use chrono::Utc;
use std::time::Duration;

/// Current UTC time as milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// True when `timestamp` (epoch millis) is older than `max_age` at `now`
pub fn is_expired(timestamp: i64, max_age: Duration, now: i64) -> bool {
    now.saturating_sub(timestamp) >= max_age.as_millis() as i64
}
