// src/date.rs

//! Loose date parsing for deck metadata
//!
//! Deck authors write dates by hand, so several common layouts are accepted.
//! Values without an offset are taken as UTC.

use chrono::{Datelike, DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Parse a loosely formatted date string
///
/// Returns `None` if no known layout matches, or if the value cannot be
/// written back as a TOML date-time (years outside 0000-9999, leap seconds).
pub fn parse_loose_date(input: &str) -> Option<DateTime<FixedOffset>> {
    parse_any_layout(input).filter(is_representable)
}

fn parse_any_layout(input: &str) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt);
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(as_utc(naive));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return date.and_hms_opt(0, 0, 0).map(as_utc);
        }
    }

    None
}

fn is_representable(dt: &DateTime<FixedOffset>) -> bool {
    (0..=9999).contains(&dt.year()) && dt.nanosecond() < 1_000_000_000
}

fn as_utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.from_utc_datetime(&naive).fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_date() {
        let dt = parse_loose_date("2023/4/5").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 4, 5));
        assert_eq!(dt.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_parse_rfc3339_keeps_offset() {
        let dt = parse_loose_date("2022-12-31T23:30:00+08:00").unwrap();
        assert_eq!(dt.hour(), 23);
        assert_eq!(dt.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_parse_date_with_time() {
        let dt = parse_loose_date("2021-02-03 04:05").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (4, 5, 0));
    }

    #[test]
    fn test_reject_garbage() {
        assert!(parse_loose_date("").is_none());
        assert!(parse_loose_date("last tuesday").is_none());
        assert!(parse_loose_date("2023/13/45").is_none());
    }

    #[test]
    fn test_reject_years_outside_four_digits() {
        assert!(parse_loose_date("-0001-01-01").is_none());
        assert!(parse_loose_date("+12345-01-01").is_none());
        assert!(parse_loose_date("0000-01-01").is_some());
        assert!(parse_loose_date("9999/12/31").is_some());
    }

    #[test]
    fn test_reject_leap_second() {
        assert!(parse_loose_date("2016-12-31T23:59:60Z").is_none());
        assert!(parse_loose_date("2016-12-31T23:59:59Z").is_some());
    }
}
