//! `Schedule`: an ordered sequence of unadjusted coupon dates.

use pillar_core::errors::{Error, Result};

use crate::date::Date;
use crate::frequency::Frequency;
use crate::period::Period;

/// An ordered, strictly increasing list of dates delimiting accrual periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    dates: Vec<Date>,
}

impl Schedule {
    /// Generate dates backward from `end` in steps of `tenor`, stopping at
    /// `start`. Any irregular period is a short front stub. Dates are not
    /// business-day adjusted.
    ///
    /// Each date is computed from `end` directly (`end − k·tenor`), so
    /// month-end clamping does not drift along the schedule.
    pub fn backward(start: Date, end: Date, tenor: Period) -> Result<Self> {
        if start >= end {
            return Err(Error::Configuration(format!(
                "schedule start {start} must be before end {end}"
            )));
        }
        if tenor.length <= 0 {
            return Err(Error::Configuration(format!(
                "schedule tenor must be positive, got {tenor}"
            )));
        }
        let mut dates = vec![end];
        let mut k = 1;
        loop {
            let step = Period::new(-k * tenor.length, tenor.unit);
            let d = end.advance(step)?;
            if d <= start {
                break;
            }
            dates.push(d);
            k += 1;
        }
        dates.push(start);
        dates.reverse();
        Ok(Self { dates })
    }

    /// Backward schedule at a payment frequency; `Once` gives a single period.
    pub fn from_frequency(start: Date, end: Date, frequency: Frequency) -> Result<Self> {
        match frequency {
            Frequency::Once => {
                if start >= end {
                    return Err(Error::Configuration(format!(
                        "schedule start {start} must be before end {end}"
                    )));
                }
                Ok(Self {
                    dates: vec![start, end],
                })
            }
            _ => Self::backward(start, end, Period::from_frequency(frequency)?),
        }
    }

    /// Build from explicit dates, which must be strictly increasing.
    pub fn from_dates(dates: Vec<Date>) -> Result<Self> {
        if dates.len() < 2 {
            return Err(Error::Configuration(
                "a schedule needs at least two dates".into(),
            ));
        }
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::Configuration(format!(
                "schedule dates must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }
        Ok(Self { dates })
    }

    /// All dates, first to last.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// First date.
    pub fn start_date(&self) -> Date {
        self.dates[0]
    }

    /// Last date.
    pub fn end_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    /// Number of accrual periods.
    pub fn len(&self) -> usize {
        self.dates.len() - 1
    }

    /// Never true: a schedule always has at least one period.
    pub fn is_empty(&self) -> bool {
        self.dates.len() < 2
    }

    /// `(accrual_start, accrual_end)` pairs.
    pub fn periods(&self) -> impl Iterator<Item = (Date, Date)> + '_ {
        self.dates.windows(2).map(|w| (w[0], w[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn regular_backward_schedule() {
        let s = Schedule::backward(date(2024, 1, 15), date(2026, 1, 15), Period::months(6)).unwrap();
        assert_eq!(
            s.dates(),
            &[
                date(2024, 1, 15),
                date(2024, 7, 15),
                date(2025, 1, 15),
                date(2025, 7, 15),
                date(2026, 1, 15)
            ]
        );
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn short_front_stub() {
        let s = Schedule::backward(date(2024, 3, 1), date(2025, 1, 15), Period::months(6)).unwrap();
        assert_eq!(
            s.dates(),
            &[date(2024, 3, 1), date(2024, 7, 15), date(2025, 1, 15)]
        );
    }

    #[test]
    fn month_end_does_not_drift() {
        let s = Schedule::backward(date(2024, 8, 31), date(2025, 8, 31), Period::months(3)).unwrap();
        assert_eq!(
            s.dates(),
            &[
                date(2024, 8, 31),
                date(2024, 11, 30),
                date(2025, 2, 28),
                date(2025, 5, 31),
                date(2025, 8, 31)
            ]
        );
    }

    #[test]
    fn invalid_schedules() {
        assert!(Schedule::backward(date(2025, 1, 1), date(2024, 1, 1), Period::months(6)).is_err());
        assert!(Schedule::backward(date(2024, 1, 1), date(2025, 1, 1), Period::months(0)).is_err());
        assert!(Schedule::from_dates(vec![date(2024, 1, 1), date(2024, 1, 1)]).is_err());
    }
}
