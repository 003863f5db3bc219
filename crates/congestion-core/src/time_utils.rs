use chrono::{Datelike, NaiveDate};

use crate::error::{CongestionError, Result};

/// The single date format accepted at ingestion.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// Short month labels indexed 0–11 (January = 0).
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Two-digit hour labels `"00"`–`"23"`, used both as hour-filter options and
/// as the x-axis of the hourly profile.
pub const HOUR_LABELS: [&str; 24] = [
    "00", "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12", "13", "14",
    "15", "16", "17", "18", "19", "20", "21", "22", "23",
];

// ── Record dates ──────────────────────────────────────────────────────────────

/// Parse a record date in the fixed [`RECORD_DATE_FORMAT`].
///
/// No locale-dependent fallbacks are attempted: `"15/01/2025"` and
/// `"Jan 15 2025"` are rejected rather than guessed at.
pub fn parse_record_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), RECORD_DATE_FORMAT)
        .map_err(|_| CongestionError::InvalidDate(s.to_string()))
}

/// Zero-based month index (January = 0) of `date`.
pub fn month_index(date: NaiveDate) -> usize {
    date.month0() as usize
}

// ── Hours ─────────────────────────────────────────────────────────────────────

/// Extract the hour of day from an `"HH:MM"` string.
///
/// Only the part before the first `:` is considered, and only its leading
/// digits, so `"8:05"`, `"08:05"` and `"08h:05"` all yield `Some(8)`.
/// Returns `None` when there are no leading digits or the hour is outside
/// `0..=23`.
pub fn parse_hour_of_day(hour: &str) -> Option<usize> {
    let head = hour.split(':').next().unwrap_or("").trim();
    let digits: String = head.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let value: usize = digits.parse().ok()?;
    (value < 24).then_some(value)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_date_iso() {
        let date = parse_record_date("2025-01-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_record_date_trims_whitespace() {
        assert!(parse_record_date(" 2025-02-01 ").is_ok());
    }

    #[test]
    fn test_parse_record_date_rejects_locale_formats() {
        assert!(parse_record_date("15/01/2025").is_err());
        assert!(parse_record_date("Jan 15 2025").is_err());
        assert!(parse_record_date("").is_err());
    }

    #[test]
    fn test_parse_record_date_rejects_impossible_day() {
        let err = parse_record_date("2025-02-30").unwrap_err();
        assert_eq!(err.to_string(), "Invalid date: 2025-02-30");
    }

    #[test]
    fn test_month_index_is_zero_based() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let dec = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(month_index(jan), 0);
        assert_eq!(month_index(dec), 11);
    }

    #[test]
    fn test_parse_hour_of_day_two_digits() {
        assert_eq!(parse_hour_of_day("08:15"), Some(8));
        assert_eq!(parse_hour_of_day("23:59"), Some(23));
        assert_eq!(parse_hour_of_day("00:00"), Some(0));
    }

    #[test]
    fn test_parse_hour_of_day_single_digit() {
        assert_eq!(parse_hour_of_day("7:30"), Some(7));
    }

    #[test]
    fn test_parse_hour_of_day_leading_digits_only() {
        assert_eq!(parse_hour_of_day("08h:05"), Some(8));
    }

    #[test]
    fn test_parse_hour_of_day_out_of_range() {
        assert_eq!(parse_hour_of_day("24:00"), None);
        assert_eq!(parse_hour_of_day("99:00"), None);
    }

    #[test]
    fn test_parse_hour_of_day_unparseable() {
        assert_eq!(parse_hour_of_day("morning"), None);
        assert_eq!(parse_hour_of_day(""), None);
        assert_eq!(parse_hour_of_day(":30"), None);
    }

    #[test]
    fn test_hour_labels_are_two_digit() {
        assert!(HOUR_LABELS.iter().all(|h| h.len() == 2));
        assert_eq!(HOUR_LABELS[8], "08");
    }
}
