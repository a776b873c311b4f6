//! Date parsing, date ranges and time granularities.
//!
//! The engine never guesses whether `03/04/2020` is the 3rd of April or the
//! 4th of March: callers pass `day_first`, obtained from whatever classified
//! the column. ISO forms (`2020-04-03`) are unambiguous and ignore the flag.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{OversightError, Result};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d %B %Y", "%d %b %Y", "%B %d, %Y", "%b %d, %Y", "%d-%b-%Y",
];

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{2}|\d{4})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2}))?)?$",
    )
    .expect("numeric date pattern is valid")
});

/// Parses a date or date-time string.
///
/// Ambiguous numeric dates (`a/b/yyyy`) are read as day/month when
/// `day_first` is set and month/day otherwise; if that reading is not a real
/// date the other one is tried, so `25/12/2020` parses either way.
pub fn parse_date(value: &str, day_first: bool) -> Result<NaiveDateTime> {
    let trimmed = value.trim();

    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(parsed.and_time(NaiveTime::MIN));
        }
    }

    if let Some(captures) = NUMERIC_DATE.captures(trimmed) {
        let number = |i: usize| -> Option<u32> { captures.get(i).and_then(|m| m.as_str().parse().ok()) };
        let (Some(a), Some(b), Some(year)) = (number(1), number(2), number(3)) else {
            return Err(OversightError::date_parse(value, day_first));
        };
        let year = match year {
            y if captures[3].len() == 2 && y < 70 => 2000 + y,
            y if captures[3].len() == 2 => 1900 + y,
            y => y,
        } as i32;
        let (day, month) = if day_first { (a, b) } else { (b, a) };
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .or_else(|| NaiveDate::from_ymd_opt(year, day, month));
        let time = NaiveTime::from_hms_opt(
            number(4).unwrap_or(0),
            number(5).unwrap_or(0),
            number(6).unwrap_or(0),
        );
        if let (Some(date), Some(time)) = (date, time) {
            return Ok(date.and_time(time));
        }
    }

    Err(OversightError::date_parse(value, day_first))
}

/// Formats a date as `%Y-%m-%d`, adding the time only when it is not midnight.
pub fn format_date(date: &NaiveDateTime) -> String {
    if date.time() == NaiveTime::MIN {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Inclusive date bounds, kept as the caller spelled them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parses both bounds.
    pub fn bounds(&self, day_first: bool) -> Result<(NaiveDateTime, NaiveDateTime)> {
        Ok((parse_date(&self.start, day_first)?, parse_date(&self.end, day_first)?))
    }

    /// Label used for the synthetic comparison column, e.g. `2020-01-01 - 2020-01-31`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.start, self.end)
    }

    /// The window of equal length that ends where this one starts.
    pub fn previous_window(&self, day_first: bool) -> Result<DateRange> {
        let (start, end) = self.bounds(day_first)?;
        let length: Duration = end - start;
        Ok(DateRange::new(format_date(&(start - length)), format_date(&start)))
    }
}

/// Resolution that trend queries truncate dates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Annually,
    Monthly,
    Daily,
    Hourly,
}

impl Granularity {
    pub fn name(&self) -> &'static str {
        match self {
            Granularity::Annually => "Annually",
            Granularity::Monthly => "Monthly",
            Granularity::Daily => "Daily",
            Granularity::Hourly => "Hourly",
        }
    }

    /// Truncates a date to the start of its hour, day, month or year.
    pub fn truncate(&self, date: &NaiveDateTime) -> NaiveDateTime {
        let (year, month, day, hour) = match self {
            Granularity::Annually => (date.year(), 1, 1, 0),
            Granularity::Monthly => (date.year(), date.month(), 1, 0),
            Granularity::Daily => (date.year(), date.month(), date.day(), 0),
            Granularity::Hourly => (date.year(), date.month(), date.day(), date.hour()),
        };
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap_or(*date)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Granularity {
    type Err = OversightError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annually" | "yearly" => Ok(Granularity::Annually),
            "monthly" => Ok(Granularity::Monthly),
            "daily" => Ok(Granularity::Daily),
            "hourly" => Ok(Granularity::Hourly),
            _ => Err(OversightError::UnknownGranularity(s.to_string())),
        }
    }
}
