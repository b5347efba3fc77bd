// Restricted date formatting
//
// strftime-style formatting for renderers, limited to a single timestamp and
// a short result. A leading `!` selects UTC, otherwise local time is used.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

/// Longest formatted result that is returned; anything longer yields ""
pub const MAX_DATE_LEN: usize = 63;

/// Format `timestamp` (seconds since the epoch) with a strftime pattern
///
/// Returns an empty string if the pattern is empty or invalid, the timestamp
/// is out of range, or the result would exceed `MAX_DATE_LEN` bytes.
pub fn format_date(format: &str, timestamp: i64) -> String {
    let (pattern, utc) = match format.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (format, false),
    };

    if pattern.is_empty() {
        return String::new();
    }

    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return String::new();
    }

    let Some(instant) = DateTime::<Utc>::from_timestamp(timestamp, 0) else {
        return String::new();
    };

    let mut out = String::new();
    let written = if utc {
        write!(out, "{}", instant.format_with_items(items.iter()))
    } else {
        write!(
            out,
            "{}",
            instant.with_timezone(&Local).format_with_items(items.iter())
        )
    };

    if written.is_err() || out.len() > MAX_DATE_LEN {
        return String::new();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-09 14:05:07 UTC
    const T: i64 = 1_709_993_107;

    #[test]
    fn test_utc_formatting() {
        assert_eq!(format_date("!%H:%M:%S", T), "14:05:07");
        assert_eq!(format_date("!%Y-%m-%d", T), "2024-03-09");
        assert_eq!(format_date("!%a %d %b", T), "Sat 09 Mar");
    }

    #[test]
    fn test_local_formatting_has_shape() {
        let time = format_date("%H:%M", T);
        assert_eq!(time.len(), 5);
        assert_eq!(&time[2..3], ":");
    }

    #[test]
    fn test_empty_and_invalid_formats() {
        assert_eq!(format_date("", T), "");
        assert_eq!(format_date("!", T), "");
        assert_eq!(format_date("!%Q", T), "");
    }

    #[test]
    fn test_literal_text_passes_through() {
        assert_eq!(format_date("!up at %H", T), "up at 14");
    }

    #[test]
    fn test_overlong_result_is_dropped() {
        let long = "!".to_string() + &"%Y".repeat(16);
        assert_eq!(format_date(&long, T), "");
        assert_eq!(format_date(&("!".to_string() + &"%Y".repeat(15)), T).len(), 60);
    }
}
