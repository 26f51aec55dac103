//! Calendar months.
//!
//! Subscriptions are billed per whole month, so every date the service
//! accepts, stores or compares is a `Month`: a year and a month with no day
//! or time component. On the wire a month is written `MM-YYYY`; in Postgres
//! it is a `DATE` pinned to the first day of the month.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire format used in requests and responses, e.g. `07-2025`.
pub const MONTH_FORMAT: &str = "MM-YYYY";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid month '{0}', use MM-YYYY format")]
pub struct ParseMonthError(String);

/// A calendar month, ordered chronologically.
///
/// Internally this is the first day of the month, which keeps ordering,
/// hashing and database encoding identical to `NaiveDate`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type, Serialize, Deserialize,
)]
#[sqlx(transparent)]
#[serde(try_from = "String", into = "String")]
pub struct Month(NaiveDate);

impl Month {
    /// Returns `None` unless `month` is 1..=12 and `year` has four digits.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1).map(Month)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Number of billed months from `start` to `end`, both inclusive.
    ///
    /// Zero when `end` precedes `start`.
    pub fn months_between(start: Month, end: Month) -> u64 {
        let years = i64::from(end.year()) - i64::from(start.year());
        let months = i64::from(end.month()) - i64::from(start.month());
        u64::try_from(years * 12 + months + 1).unwrap_or(0)
    }
}

impl From<NaiveDate> for Month {
    /// Truncates the date to its month.
    fn from(date: NaiveDate) -> Self {
        Month(date - Duration::days(i64::from(date.day0())))
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthError(s.to_string());

        let (month, year) = s.split_once('-').ok_or_else(err)?;
        if month.len() != 2 || year.len() != 4 {
            return Err(err());
        }
        if !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let month = month.parse::<u32>().map_err(|_| err())?;
        let year = year.parse::<i32>().map_err(|_| err())?;
        Month::new(year, month).ok_or_else(err)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

impl TryFrom<String> for Month {
    type Error = ParseMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}
