//! Day-count conventions.
//!
//! A day counter computes the fraction of a year between two dates, used
//! whenever a curve converts dates to times or an instrument accrues
//! interest. The conventions form a small closed set, so they are an enum
//! rather than a trait object: cheap to copy into every curve and helper.

use std::fmt;

use pillar_core::Time;

use crate::date::Date;

/// A convention for counting the fraction of a year between two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayCounter {
    /// `actual_days / 360`.
    Actual360,
    /// `actual_days / 365`.
    #[default]
    Actual365Fixed,
    /// 30/360 bond basis (US): `[360(Y2−Y1) + 30(M2−M1) + (D2−D1)] / 360`.
    Thirty360,
    /// Actual/Actual (ISDA): the period is split at year boundaries and each
    /// piece divided by the length of its own year.
    ActualActualIsda,
}

impl DayCounter {
    /// Human-readable name of this convention.
    pub fn name(&self) -> &'static str {
        match self {
            DayCounter::Actual360 => "Actual/360",
            DayCounter::Actual365Fixed => "Actual/365 (Fixed)",
            DayCounter::Thirty360 => "30/360 (Bond Basis)",
            DayCounter::ActualActualIsda => "Actual/Actual (ISDA)",
        }
    }

    /// Number of days between `d1` and `d2` according to this convention.
    pub fn day_count(&self, d1: Date, d2: Date) -> i64 {
        match self {
            DayCounter::Thirty360 => thirty_360_days(d1, d2),
            _ => d1.days_until(d2),
        }
    }

    /// Fraction of a year between `d1` and `d2`; negative when `d2 < d1`.
    pub fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        match self {
            DayCounter::Actual360 => self.day_count(d1, d2) as Time / 360.0,
            DayCounter::Actual365Fixed => self.day_count(d1, d2) as Time / 365.0,
            DayCounter::Thirty360 => self.day_count(d1, d2) as Time / 360.0,
            DayCounter::ActualActualIsda => {
                if d1 > d2 {
                    -actual_actual_isda(d2, d1)
                } else {
                    actual_actual_isda(d1, d2)
                }
            }
        }
    }
}

impl fmt::Display for DayCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn thirty_360_days(d1: Date, d2: Date) -> i64 {
    let (y1, m1, mut dd1) = (i64::from(d1.year()), i64::from(d1.month()), i64::from(d1.day()));
    let (y2, m2, mut dd2) = (i64::from(d2.year()), i64::from(d2.month()), i64::from(d2.day()));
    if dd1 == 31 {
        dd1 = 30;
    }
    if dd2 == 31 && dd1 == 30 {
        dd2 = 30;
    }
    360 * (y2 - y1) + 30 * (m2 - m1) + (dd2 - dd1)
}

fn actual_actual_isda(d1: Date, d2: Date) -> Time {
    let days_in = |year: i32| if is_leap(year) { 366.0 } else { 365.0 };
    let (y1, y2) = (d1.year(), d2.year());
    if y1 == y2 {
        return d1.days_until(d2) as Time / days_in(y1);
    }
    let mut total = 0.0;
    let mut start = d1;
    for year in y1..y2 {
        // January 1st always exists, so the fallback is never taken
        let next = match Date::from_ymd(year + 1, 1, 1) {
            Ok(d) => d,
            Err(_) => break,
        };
        total += start.days_until(next) as Time / days_in(year);
        start = next;
    }
    total + start.days_until(d2) as Time / days_in(y2)
}

fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn actual365_fixed() {
        let dc = DayCounter::Actual365Fixed;
        assert_eq!(dc.day_count(date(2023, 1, 1), date(2024, 1, 1)), 365);
        assert_abs_diff_eq!(dc.year_fraction(date(2023, 1, 1), date(2024, 1, 1)), 1.0);
    }

    #[test]
    fn actual360() {
        let dc = DayCounter::Actual360;
        assert_abs_diff_eq!(
            dc.year_fraction(date(2023, 1, 1), date(2023, 7, 1)),
            181.0 / 360.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn thirty360_month_ends() {
        let dc = DayCounter::Thirty360;
        assert_eq!(dc.day_count(date(2023, 1, 1), date(2024, 1, 1)), 360);
        assert_eq!(dc.day_count(date(2023, 1, 31), date(2023, 3, 31)), 60);
        assert_eq!(dc.day_count(date(2023, 1, 15), date(2023, 3, 31)), 76);
    }

    #[test]
    fn actual_actual_isda_across_years() {
        let dc = DayCounter::ActualActualIsda;
        assert_abs_diff_eq!(dc.year_fraction(date(2023, 1, 1), date(2024, 1, 1)), 1.0);
        let t = dc.year_fraction(date(2023, 7, 1), date(2024, 7, 1));
        assert_abs_diff_eq!(t, 184.0 / 365.0 + 182.0 / 366.0, epsilon = 1e-15);
        assert_abs_diff_eq!(dc.year_fraction(date(2024, 7, 1), date(2023, 7, 1)), -t);
    }

    #[test]
    fn negative_fractions() {
        let dc = DayCounter::Actual365Fixed;
        assert!(dc.year_fraction(date(2024, 1, 2), date(2024, 1, 1)) < 0.0);
    }
}
