//! Date parsing and formatting shared by the build and read sides.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;

/// YAML 1.1 timestamp: date only, or date and time with optional fraction and zone.
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:(?:[Tt]|[ \t]+)(\d{1,2}):(\d{2}):(\d{2})(?:\.(\d*))?(?:[ \t]*(Z|([-+])(\d{1,2})(?::?(\d{2}))?))?)?$",
    )
    .expect("timestamp pattern is valid")
});

/// Calendar dates accepted besides ISO forms, read as UTC midnight.
const LOOSE_DATES: &[&str] = &["%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%B %d %Y", "%d %B %Y"];

/// Date-times accepted besides ISO forms, read as UTC.
const LOOSE_DATE_TIMES: &[&str] = &[
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%d %B %Y %H:%M:%S",
];

/// Format a UTC timestamp as ISO-8601 with millisecond precision.
pub fn format_iso(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a YAML timestamp scalar.
///
/// Values without a zone are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let caps = TIMESTAMP.captures(value.trim())?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let date = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, num(2)?, num(3)?)?;
    if caps.get(4).is_none() {
        return Some(DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0)?, Utc));
    }

    let millis = caps
        .get(7)
        .map(|m| {
            let digits: String = m.as_str().chars().chain("000".chars()).take(3).collect();
            digits.parse::<u32>().unwrap_or(0)
        })
        .unwrap_or(0);
    let naive = date.and_hms_milli_opt(num(4)?, num(5)?, num(6)?, millis)?;
    let mut utc = DateTime::from_naive_utc_and_offset(naive, Utc);

    if let Some(sign) = caps.get(9) {
        let hours = i64::from(num(10)?);
        let minutes = i64::from(num(11).unwrap_or(0));
        let offset = Duration::minutes(hours * 60 + minutes);
        utc = if sign.as_str() == "-" { utc + offset } else { utc - offset };
    }

    Some(utc)
}

/// Parse a date string the way the read layer orders and validates posts.
///
/// Accepts YAML timestamps (which cover `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`
/// and `YYYY-MM-DD HH:MM:SS`), RFC 3339, RFC 2822, slash-separated dates and
/// month-name dates such as `Jan 5, 2024` or `5 January 2024`. Values
/// without a zone are read as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    parse_timestamp(value)
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc)))
        .or_else(|| DateTime::parse_from_rfc2822(value).ok().map(|dt| dt.with_timezone(&Utc)))
        .or_else(|| parse_loose(value))
}

fn parse_loose(value: &str) -> Option<DateTime<Utc>> {
    let naive = LOOSE_DATE_TIMES
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            LOOSE_DATES
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}
