//! Calendar-day values
//!
//! Dates in a todo.txt line are whole days written as `YYYY-MM-DD`.
//! There is no time of day and no timezone: everything is a UTC calendar day.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::FormatError;

/// Length of a formatted date (`YYYY-MM-DD`)
pub const DATE_LEN: usize = 10;

/// A calendar day, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateValue(NaiveDate);

impl DateValue {
    /// Creates a date from year, month and day, if it exists on the calendar
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses `YYYY-MM-DD`. The whole input must be the date.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        if !looks_like_date(text) || text.len() != DATE_LEN {
            return Err(FormatError::Date(text.to_string()));
        }

        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| FormatError::Date(text.to_string()))
    }

    /// Formats as `YYYY-MM-DD`
    pub fn format(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// The following day
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The preceding day
    pub fn pred(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// Whole days from `other` to `self`
    pub fn days_since(&self, other: DateValue) -> i64 {
        (self.0 - other.0).num_days()
    }

    /// Returns the underlying chrono date
    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

/// True if `text` begins with the `YYYY-MM-DD` shape (digits and dashes only,
/// no calendar check). Trailing content is ignored.
pub fn looks_like_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < DATE_LEN {
        return false;
    }
    bytes[..DATE_LEN].iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<DateValue> for NaiveDate {
    fn from(date: DateValue) -> Self {
        date.0
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateValue {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim())
    }
}

impl TryFrom<String> for DateValue {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateValue> for String {
    fn from(date: DateValue) -> Self {
        date.format()
    }
}
