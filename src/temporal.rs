use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{InvalidDateError, InvalidTimeError};

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([0-9]{1,2})(?::([0-9]{2}))?\s*(am|pm)?$").expect("valid time regex")
});
static YEAR_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})$").expect("valid year-month regex"));
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})$").expect("valid year regex"));

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M:%S%:z"];

const DATE_FORMATS: [&str; 13] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
    "%A %B %d %Y",
    "%a %b %d %Y",
];

/// Canonical `YYYY-MM-DD` for the UTC calendar day of `raw`.
///
/// Inputs without an explicit offset are read as UTC. Years outside
/// `0..=9999` are rejected since they cannot be written as four digits.
pub fn normalize_date(raw: &str) -> Result<String, InvalidDateError> {
    let day = parse_instant(raw)
        .map(|instant| instant.date_naive())
        .filter(|day| (0..=9999).contains(&day.year()))
        .ok_or_else(|| InvalidDateError {
            input: raw.to_string(),
        })?;
    Ok(day.format("%Y-%m-%d").to_string())
}

/// Canonical 24-hour `HH:mm`.
///
/// A trailing `am`/`pm` selects the 12-hour reading, its absence the 24-hour
/// one.
pub fn normalize_time(raw: &str) -> Result<String, InvalidTimeError> {
    let value = raw.trim().to_lowercase();
    let caps = TIME_RE
        .captures(&value)
        .ok_or_else(|| InvalidTimeError::Format(raw.to_string()))?;

    let format_error = || InvalidTimeError::Format(raw.to_string());
    let hour: u32 = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(format_error)?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().map_err(|_| format_error())?,
        None => 0,
    };

    if minute > 59 {
        return Err(InvalidTimeError::Minute(minute));
    }

    let hours = match caps.get(3).map(|m| m.as_str()) {
        Some(meridiem) => {
            if !(1..=12).contains(&hour) {
                return Err(InvalidTimeError::Hour12(hour));
            }
            match (meridiem, hour) {
                ("am", 12) => 0,
                ("am", h) => h,
                (_, 12) => 12,
                (_, h) => h + 12,
            }
        }
        None => {
            if hour > 23 {
                return Err(InvalidTimeError::Hour24(hour));
            }
            hour
        }
    };

    Ok(format!("{hours:02}:{minute:02}"))
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let zulu_expanded = expand_zulu(value);
    for fmt in OFFSET_DATETIME_FORMATS.iter() {
        if let Ok(dt) = DateTime::parse_from_str(&zulu_expanded, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_DATETIME_FORMATS.iter() {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }

    parse_naive_date(value).map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
}

fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    for fmt in DATE_FORMATS.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }

    if let Some(caps) = YEAR_MONTH_RE.captures(value) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    if let Some(caps) = YEAR_RE.captures(value) {
        let year = caps[1].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    None
}

fn expand_zulu(value: &str) -> String {
    match value.strip_suffix(['Z', 'z']) {
        Some(head) => format!("{head}+00:00"),
        None => value.to_string(),
    }
}
