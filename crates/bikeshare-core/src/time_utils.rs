use chrono::{Month, NaiveDateTime, Weekday};

// ── Trip timestamps ───────────────────────────────────────────────────────────

/// Accepted trip timestamp layouts, tried in order.
///
/// The first is the canonical `year.month.day hour:minute` form; the rest are
/// the equivalent dash-separated and seconds-bearing exports of the same data.
pub const TRIP_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y.%m.%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Layout used when a timestamp is printed back to the operator.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a start/end time cell.
///
/// Returns `None` for empty strings or values matching none of
/// [`TRIP_TIMESTAMP_FORMATS`].
pub fn parse_trip_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    TRIP_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

// ── Calendar names ────────────────────────────────────────────────────────────

/// English name of a month number, or `"Unknown"` outside 1–12.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

/// Full English weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_canonical_format() {
        let ts = parse_trip_timestamp("2017.03.17 08:45").unwrap();
        assert_eq!(ts.year(), 2017);
        assert_eq!(ts.month(), 3);
        assert_eq!(ts.day(), 17);
        assert_eq!(ts.hour(), 8);
        assert_eq!(ts.minute(), 45);
    }

    #[test]
    fn test_parse_dash_format_with_seconds() {
        let ts = parse_trip_timestamp("2017-06-23 15:09:32").unwrap();
        assert_eq!(ts.month(), 6);
        assert_eq!(ts.second(), 32);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_trip_timestamp("  2017.01.01 00:07 ").is_some());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_trip_timestamp("").is_none());
        assert!(parse_trip_timestamp("17/03/2017 08:45").is_none());
        assert!(parse_trip_timestamp("2017.13.01 00:00").is_none());
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(6), "June");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Unknown");
        assert_eq!(month_name(13), "Unknown");
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name(Weekday::Sat), "Saturday");
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
    }
}
