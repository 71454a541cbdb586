//! Time-related utilities
//!
//! Capture timestamps are fractional seconds since the UNIX epoch. Labels are
//! always rendered in UTC so the same capture yields the same report on every
//! machine.

use crate::types::capture::Timestamp;
use chrono::{DateTime, Utc};

/// Convert a capture timestamp to a UTC datetime
pub fn to_datetime(ts: Timestamp) -> Option<DateTime<Utc>> {
    if !ts.is_finite() {
        return None;
    }
    let secs = ts.floor();
    let nanos = (((ts - secs) * 1_000_000_000.0).round() as u32).min(999_999_999);
    DateTime::from_timestamp(secs as i64, nanos)
}

/// Full date and time with microseconds, e.g. `2019-11-04 09:12:44.250000`
pub fn format_datetime(ts: Timestamp) -> String {
    to_datetime(ts)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Wall-clock time of day, e.g. `09:12:44`
pub fn format_clock(ts: Timestamp) -> String {
    to_datetime(ts)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
