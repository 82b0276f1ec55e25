//! Date/time utilities for sharefront.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Format used for the date half of a timestamp.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Format used for the time half of a timestamp (24-hour clock, milliseconds).
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Resolve an IANA timezone name, falling back to UTC for unknown names.
pub fn parse_timezone(timezone: &str) -> Tz {
    timezone.parse().unwrap_or_else(|_| {
        tracing::warn!(timezone, "Unknown timezone, displaying timestamps in UTC");
        Tz::UTC
    })
}

/// Format a DateTime<Utc> in the given timezone.
///
/// # Arguments
///
/// * `dt` - DateTime in UTC
/// * `tz` - Display timezone
/// * `format` - Output format string (e.g., "%Y/%m/%d %H:%M")
pub fn format_in_timezone(dt: &DateTime<Utc>, tz: Tz, format: &str) -> String {
    dt.with_timezone(&tz).format(format).to_string()
}

/// Split an instant into a `YYYY/MM/DD` date string and a `HH:MM:SS.fff` time string.
pub fn split_date_time(dt: &DateTime<Utc>, tz: Tz) -> (String, String) {
    (
        format_in_timezone(dt, tz, DATE_FORMAT),
        format_in_timezone(dt, tz, TIME_FORMAT),
    )
}
