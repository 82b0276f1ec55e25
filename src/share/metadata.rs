//! Display metadata for files on the share.

use chrono_tz::Tz;
use serde::Serialize;

use super::gateway::EntryProperties;
use crate::datetime::split_date_time;

/// Binary unit prefixes, indexed by `exponent - 1`.
///
/// `u64::MAX` is just below 16 EiB, so every byte count has a unit.
const UNIT_PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

/// Format a byte count for display.
///
/// Counts below 1024 are printed as `"<n> B"`. Larger counts are scaled to the largest
/// binary unit not exceeding them and printed with two decimals, e.g. `"1.50 KiB"`.
pub fn format_bytes(amount: u64) -> String {
    if amount < 1024 {
        return format!("{amount} B");
    }

    let mut exp = 0;
    let mut scaled = amount;
    while scaled >= 1024 && exp < UNIT_PREFIXES.len() {
        scaled /= 1024;
        exp += 1;
    }

    let value = amount as f64 / 1024f64.powi(exp as i32);
    format!("{value:.2} {}iB", UNIT_PREFIXES[exp - 1])
}

/// A file as shown in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    /// File name.
    pub name: String,
    /// Formatted size, e.g. "3.00 MiB".
    pub size: String,
    /// Creation date (`YYYY/MM/DD`).
    pub creation_date: String,
    /// Creation time (`HH:MM:SS.fff`).
    pub creation_time: String,
    /// Last change date (`YYYY/MM/DD`).
    pub edit_date: String,
    /// Last change time (`HH:MM:SS.fff`).
    pub edit_time: String,
}

impl FileInfo {
    /// Build the display record for a file from its properties.
    pub fn project(name: impl Into<String>, properties: &EntryProperties, tz: Tz) -> Self {
        let (creation_date, creation_time) = split_date_time(&properties.created, tz);
        let (edit_date, edit_time) = split_date_time(&properties.changed, tz);

        Self {
            name: name.into(),
            size: format_bytes(properties.size),
            creation_date,
            creation_time,
            edit_date,
            edit_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_bytes_below_one_kib() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1), "1 B");
        assert_eq!(format_bytes(1023), "1023 B");
    }

    #[test]
    fn test_format_bytes_kib() {
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(1024 * 1024 - 1), "1024.00 KiB");
    }

    #[test]
    fn test_format_bytes_larger_units() {
        assert_eq!(format_bytes(1_048_576), "1.00 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GiB");
        assert_eq!(format_bytes(1u64 << 40), "1.00 TiB");
    }

    #[test]
    fn test_format_bytes_beyond_tebibytes() {
        assert_eq!(format_bytes(1u64 << 50), "1.00 PiB");
        assert_eq!(format_bytes(1u64 << 60), "1.00 EiB");
        assert_eq!(format_bytes(u64::MAX), "16.00 EiB");
    }

    #[test]
    fn test_format_bytes_shape() {
        for amount in [1024u64, 4097, 123_456, 98_765_432, 1 << 33, 7 << 41] {
            let formatted = format_bytes(amount);
            let (number, unit) = formatted.split_once(' ').unwrap();
            let (whole, fraction) = number.split_once('.').unwrap();

            assert!(whole.chars().all(|c| c.is_ascii_digit()), "{formatted}");
            assert_eq!(fraction.len(), 2, "{formatted}");
            assert!(["KiB", "MiB", "GiB", "TiB"].contains(&unit), "{formatted}");
        }
    }

    #[test]
    fn test_project() {
        let properties = EntryProperties {
            size: 1536,
            created: Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 30).unwrap(),
            changed: Utc.timestamp_millis_opt(1_709_300_000_250).unwrap(),
        };

        let info = FileInfo::project("report.pdf", &properties, Tz::UTC);

        assert_eq!(
            info,
            FileInfo {
                name: "report.pdf".to_string(),
                size: "1.50 KiB".to_string(),
                creation_date: "2024/03/01".to_string(),
                creation_time: "08:15:30.000".to_string(),
                edit_date: "2024/03/01".to_string(),
                edit_time: "13:33:20.250".to_string(),
            }
        );
    }

    #[test]
    fn test_project_uses_timezone() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        let properties = EntryProperties {
            size: 0,
            created: instant,
            changed: instant,
        };

        let info = FileInfo::project("late.txt", &properties, Tz::Europe__Berlin);

        assert_eq!(info.creation_date, "2024/03/02");
        assert_eq!(info.creation_time, "00:30:00.000");
        assert_eq!(info.size, "0 B");
    }
}
