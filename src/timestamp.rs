//! Parsing of raw fix timestamps.
//!
//! Naive date-times carry no zone and are taken as UTC; only elapsed time
//! between fixes matters downstream.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Naive date-time layouts tried in order after RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Parse a raw timestamp string into a UTC instant.
///
/// Returns `None` for empty or unrecognised input. Accepts RFC 3339 (with
/// offset), the naive layouts in `NAIVE_FORMATS`, a bare `YYYY-MM-DD` or
/// `YYYYMMDD` date (midnight) and an integer Unix epoch in seconds.
///
/// An eight-digit integer is always read as `YYYYMMDD`, and is unparseable
/// if it is not a real date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
    }

    // Eight digits is a compact YYYYMMDD date, never an epoch
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return parse_compact_date(s);
    }

    if let Ok(secs) = s.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }

    None
}

fn parse_compact_date(s: &str) -> Option<DateTime<Utc>> {
    let year = s.get(0..4)?.parse().ok()?;
    let month = s.get(4..6)?.parse().ok()?;
    let day = s.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)
        .map(|n| Utc.from_utc_datetime(&n))
}

/// Elapsed minutes from `earlier` to `later` (fractional).
pub fn minutes_between(earlier: &DateTime<Utc>, later: &DateTime<Utc>) -> f64 {
    let delta = *later - *earlier;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 60_000_000.0,
        None => delta.num_milliseconds() as f64 / 60_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_common_layouts() {
        let expected = Utc.with_ymd_and_hms(2023, 5, 1, 8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2023-05-01 08:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-01T08:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-01T08:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-01T10:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-01 08:30"), Some(expected));
        assert_eq!(parse_timestamp("2023/05/01 08:30:00"), Some(expected));
        assert_eq!(parse_timestamp(" 2023-05-01 08:30:00 "), Some(expected));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let ts = parse_timestamp("2023-05-01 08:30:00.500").unwrap();
        assert_eq!(ts.nanosecond(), 500_000_000);
    }

    #[test]
    fn test_parse_date_and_epoch() {
        assert_eq!(
            parse_timestamp("2023-05-01"),
            Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("0"),
            Some(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_compact_date_is_not_an_epoch() {
        assert_eq!(
            parse_timestamp("20230501"),
            Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("20231345"), None);
        assert_eq!(parse_timestamp("99999999"), None);
        assert_eq!(
            parse_timestamp("1682928000"),
            Some(Utc.with_ymd_and_hms(2023, 5, 1, 8, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("86400"),
            Some(Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2023-13-45 99:00:00"), None);
        assert_eq!(parse_timestamp("NaT"), None);
    }

    #[test]
    fn test_minutes_between() {
        let a = Utc.with_ymd_and_hms(2023, 5, 1, 8, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2023, 5, 1, 8, 7, 30).unwrap();
        assert_eq!(minutes_between(&a, &b), 7.5);
        assert_eq!(minutes_between(&a, &a), 0.0);
    }
}
