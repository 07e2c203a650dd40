//! `Date`: a calendar date without time of day, backed by
//! [`chrono::NaiveDate`].
//!
//! Only unadjusted arithmetic is provided: adding days, weeks, months and
//! years. Month arithmetic clamps to the end of the month (January 31 plus
//! one month is February 28 or 29). Business-day adjustment is out of scope.

use std::fmt;
use std::ops::Sub;

use chrono::{Datelike, Days, Months, NaiveDate};
use pillar_core::errors::{Error, Result};

use crate::period::{Period, TimeUnit};

/// A calendar date.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// The latest representable date.
    pub const MAX: Date = Date(NaiveDate::MAX);

    /// Create a date from year, month (1–12), and day-of-month (1–31).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| Error::Date(format!("invalid date {year}-{month:02}-{day:02}")))
    }

    /// Wrap a chrono date.
    pub fn from_naive(date: NaiveDate) -> Self {
        Date(date)
    }

    /// The underlying chrono date.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month (1–12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of month (1–31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// `true` if this is the last day of its month.
    pub fn is_end_of_month(&self) -> bool {
        self.0.succ_opt().map_or(true, |next| next.month() != self.0.month())
    }

    /// `true` in leap years.
    pub fn is_leap_year(&self) -> bool {
        self.0.leap_year()
    }

    /// Number of calendar days from `self` to `other` (negative if `other`
    /// is earlier).
    pub fn days_until(&self, other: Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Add (or subtract, if negative) a number of calendar days.
    pub fn add_days(&self, days: i64) -> Result<Date> {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        shifted
            .map(Date)
            .ok_or_else(|| Error::Date(format!("{self} shifted by {days} days is out of range")))
    }

    /// Add (or subtract, if negative) a number of months, clamping the day
    /// to the end of the target month.
    pub fn add_months(&self, months: i32) -> Result<Date> {
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        shifted
            .map(Date)
            .ok_or_else(|| Error::Date(format!("{self} shifted by {months} months is out of range")))
    }

    /// Advance by a [`Period`], unadjusted.
    pub fn advance(&self, period: Period) -> Result<Date> {
        let n = period.length;
        match period.unit {
            TimeUnit::Days => self.add_days(i64::from(n)),
            TimeUnit::Weeks => self.add_days(7 * i64::from(n)),
            TimeUnit::Months => self.add_months(n),
            TimeUnit::Years => self.add_months(12 * n),
        }
    }
}

impl Sub for Date {
    type Output = i64;

    /// Calendar days between two dates: `a - b` is `b.days_until(a)`.
    fn sub(self, rhs: Date) -> i64 {
        rhs.days_until(self)
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Date({self})")
    }
}
