// src/domain/time.rs

use chrono::{DateTime, Utc};

pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Human relative time for a past unix timestamp, e.g. "3 days ago".
/// Thresholds follow the usual "time ago" rounding: 45s, 90s, 45m, 90m,
/// 22h, 36h, 26d, 46d, 320d, 548d.
pub fn relative_time(then: i64, now: i64) -> String {
    let secs = (now - then).max(0) as f64;
    let mins = secs / 60.0;
    let hours = mins / 60.0;
    let days = hours / 24.0;

    if secs < 45.0 {
        "a few seconds ago".to_string()
    } else if secs < 90.0 {
        "a minute ago".to_string()
    } else if mins < 45.0 {
        format!("{} minutes ago", mins.round() as i64)
    } else if mins < 90.0 {
        "an hour ago".to_string()
    } else if hours < 22.0 {
        format!("{} hours ago", hours.round() as i64)
    } else if hours < 36.0 {
        "a day ago".to_string()
    } else if days < 26.0 {
        format!("{} days ago", days.round() as i64)
    } else if days < 46.0 {
        "a month ago".to_string()
    } else if days < 320.0 {
        format!("{} months ago", (days / 30.4).round().max(2.0) as i64)
    } else if days < 548.0 {
        "a year ago".to_string()
    } else {
        format!("{} years ago", (days / 365.0).round().max(2.0) as i64)
    }
}

/// Calendar date for account pages, e.g. "2024-03-09".
pub fn format_date(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
