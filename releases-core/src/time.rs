//! ISO-8601 release dates.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Date-times with a numeric UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y%m%dT%H%M%S%z",
];

/// Date-times without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

/// Hour-only date-times, with the suffix that completes them to the minute.
const HOUR_FORMATS: &[(&str, &str)] = &[
    ("%Y-%m-%dT%H:%M", ":00"),
    ("%Y-%m-%d %H:%M", ":00"),
    ("%Y%m%dT%H%M", "00"),
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// When a release happens.
///
/// Keeps the precision of the source value: a bare date stays a date, a
/// date-time with `Z` or an offset becomes UTC, and a date-time without
/// either stays floating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseTime {
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    DateTimeFloating(NaiveDateTime),
}

impl ReleaseTime {
    /// Parse an ISO-8601 calendar date or date-time. Returns `None` if the
    /// value matches none of the accepted forms.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if let Some(utc) = value.strip_suffix(['Z', 'z']) {
            return parse_naive(utc).map(|dt| ReleaseTime::DateTimeUtc(dt.and_utc()));
        }

        if let Some(dt) = OFFSET_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
        {
            return Some(ReleaseTime::DateTimeUtc(dt.with_timezone(&Utc)));
        }

        if let Some(dt) = parse_naive(value) {
            return Some(ReleaseTime::DateTimeFloating(dt));
        }

        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
            .or_else(|| parse_reduced_date(value))
            .map(ReleaseTime::Date)
    }

    /// Calendar date of the release, ignoring any time of day.
    pub fn date(&self) -> NaiveDate {
        match self {
            ReleaseTime::Date(d) => *d,
            ReleaseTime::DateTimeUtc(dt) => dt.date_naive(),
            ReleaseTime::DateTimeFloating(dt) => dt.date(),
        }
    }
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            HOUR_FORMATS.iter().find_map(|(fmt, minutes)| {
                NaiveDateTime::parse_from_str(&format!("{value}{minutes}"), fmt).ok()
            })
        })
}

/// `YYYY-MM` and `YYYY`, taken as the first day of the month or year.
fn parse_reduced_date(value: &str) -> Option<NaiveDate> {
    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());

    let full = match value.split_once('-') {
        Some((year, month)) if digits(year, 4) && digits(month, 2) => format!("{value}-01"),
        None if digits(value, 4) => format!("{value}-01-01"),
        _ => return None,
    };

    NaiveDate::parse_from_str(&full, "%Y-%m-%d").ok()
}

impl fmt::Display for ReleaseTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ReleaseTime::DateTimeUtc(dt) => {
                f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            ReleaseTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}
