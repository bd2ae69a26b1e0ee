//! Human-readable rendering helpers

use jiff::Timestamp;
use jiff::tz::TimeZone;

/// Suffixes applied after each division by 1024
const SIZE_UNITS: [&str; 4] = ["K", "M", "G", "T"];

const SIZE_STEP: f64 = 1024.0;

/// Render a byte count the way `ls -h` would, with one decimal
///
/// Negative values are an "unknown size" sentinel and are returned unchanged.
/// Counts below 1024 render as the bare number.
pub fn readable_size(bytes: i64) -> String {
    if bytes < 0 {
        return bytes.to_string();
    }

    let mut display = bytes as f64;
    let mut unit = None;
    for suffix in SIZE_UNITS {
        if display / SIZE_STEP < 1.0 {
            break;
        }
        display /= SIZE_STEP;
        unit = Some(suffix);
    }

    match unit {
        Some(unit) => format!("{display:.1}{unit}"),
        None => bytes.to_string(),
    }
}

/// Format a timestamp in the given zone with an strftime pattern
pub fn format_time(ts: Timestamp, tz: &TimeZone, pattern: &str) -> String {
    ts.to_zoned(tz.clone()).strftime(pattern).to_string()
}
