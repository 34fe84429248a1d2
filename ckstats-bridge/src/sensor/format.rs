//! Human-readable formatting of pool statistics.
//!
//! Each formatter picks a unit by successive order-of-magnitude thresholds
//! and renders two decimal places. Unparsable input (NaN from permissive
//! snapshot reads) and negative magnitudes render as the zero string
//! instead of failing.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Format a hashrate in H/s with a dynamic unit (TH/s down to H/s).
pub fn format_hashrate(hashrate_hs: f64) -> String {
    if !hashrate_hs.is_finite() || hashrate_hs < 0.0 {
        return "0 H/s".to_string();
    }

    if hashrate_hs >= 1e12 {
        format!("{:.2} TH/s", hashrate_hs / 1e12)
    } else if hashrate_hs >= 1e9 {
        format!("{:.2} GH/s", hashrate_hs / 1e9)
    } else if hashrate_hs >= 1e6 {
        format!("{:.2} MH/s", hashrate_hs / 1e6)
    } else if hashrate_hs >= 1e3 {
        format!("{:.2} KH/s", hashrate_hs / 1e3)
    } else {
        format!("{hashrate_hs:.2} H/s")
    }
}

/// Format a share difficulty with a dynamic suffix (T, G, M, K, or raw).
pub fn format_difficulty(difficulty: f64) -> String {
    if !difficulty.is_finite() || difficulty < 0.0 {
        return "0".to_string();
    }

    if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2}K", difficulty / 1e3)
    } else {
        format!("{difficulty:.2}")
    }
}

/// Render an epoch-millisecond timestamp as a local date-time string.
///
/// Zero or absent reads as "Never" (the field's documented idle value);
/// anything outside the representable range reads as "Unknown". Falls back
/// to UTC when the local offset cannot be determined.
pub fn format_timestamp(timestamp_ms: f64) -> String {
    if timestamp_ms == 0.0 {
        return "Never".to_string();
    }
    if !timestamp_ms.is_finite() {
        return "Unknown".to_string();
    }

    let timestamp_s = (timestamp_ms / 1000.0) as i64;
    let Ok(datetime) = OffsetDateTime::from_unix_timestamp(timestamp_s) else {
        return "Unknown".to_string();
    };

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    datetime
        .to_offset(offset)
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| "Unknown".to_string())
}
