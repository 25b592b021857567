//! Date/time reconstruction and calendar feature helpers.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::TimeOfDay;
use crate::table::Value;

// Day-first formats. Formats carrying a time are tried before date-only ones.
// ISO values arrive with a lower-case `t` once text has been normalized.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dt%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dt%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

// Two-digit years come first: `%Y` would otherwise read `23` as year 23.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d-%m-%y",
    "%d-%b-%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d %B %Y",
];

static CLOCK_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?:[:.](\d{2})(?:[:.](\d{2}))?)?\s*(?:([ap])\.?\s?m\.?)?$").unwrap()
});

static COMPACT_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})(\d{2})$").unwrap());

/// Parse a date cell day-first. Date-only values land at midnight.
pub fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Timestamp(ts) => Some(*ts),
        Value::Integer(i) => parse_compact_date(&i.to_string()),
        Value::Float(_) => None,
        Value::Text(s) => parse_date_str(s),
    }
}

/// Parse a date string day-first.
pub fn parse_date_str(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .or_else(|| parse_compact_date(value))
}

/// `YYYYMMDD`.
fn parse_compact_date(value: &str) -> Option<NaiveDateTime> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a time-of-day cell (`14:30`, `14:30:00`, `2:30 pm`, `14.30`, `1430`).
pub fn parse_time(value: &Value) -> Option<NaiveTime> {
    match value {
        Value::Timestamp(ts) => Some(ts.time()),
        Value::Integer(i) => parse_time_str(&i.to_string()),
        // 14.30 arrives as a float when the whole column is numeric
        Value::Float(f) => parse_time_str(&format!("{:.2}", f)),
        Value::Text(s) => parse_time_str(s),
    }
}

pub fn parse_time_str(raw: &str) -> Option<NaiveTime> {
    let value = raw.trim().to_lowercase();

    if let Some(caps) = CLOCK_TIME.captures(&value) {
        let mut hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        let second: u32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;

        if let Some(meridiem) = caps.get(4) {
            if !(1..=12).contains(&hour) {
                return None;
            }
            hour %= 12;
            if meridiem.as_str() == "p" {
                hour += 12;
            }
        }
        return NaiveTime::from_hms_opt(hour, minute, second);
    }

    if let Some(caps) = COMPACT_TIME.captures(&value) {
        let hour = caps[1].parse().ok()?;
        let minute = caps[2].parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    None
}

/// Combine a date cell with an optional time cell.
///
/// An unparseable time keeps the date-only timestamp.
pub fn reconstruct(date: Option<&Value>, time: Option<&Value>) -> Option<NaiveDateTime> {
    let date = parse_date(date?)?;
    match time.and_then(parse_time) {
        Some(t) => Some(date.date().and_time(t)),
        None => Some(date),
    }
}

/// English weekday name.
pub fn weekday_name(ts: &NaiveDateTime) -> &'static str {
    match ts.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Bucket for a possibly missing timestamp; missing uses the sentinel hour.
pub fn time_of_day(ts: Option<&NaiveDateTime>) -> Option<TimeOfDay> {
    let hour = ts.map_or(TimeOfDay::MISSING_HOUR, |t| t.hour() as i64);
    TimeOfDay::from_hour(hour)
}
