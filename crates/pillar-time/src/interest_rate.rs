//! Interest rate with compounding conventions.
//!
//! An `InterestRate` bundles a rate value with a [`Compounding`] convention
//! and a [`Frequency`]. It converts between rates and compound factors over
//! a year fraction; converting dates to year fractions is the caller's job
//! (curves own their day counter).

use std::fmt;

use pillar_core::errors::{Error, Result};
use pillar_core::{Compounding, Rate, Real, Time};

use crate::frequency::Frequency;

/// An interest rate with associated compounding conventions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterestRate {
    rate: Rate,
    compounding: Compounding,
    frequency: Frequency,
}

impl InterestRate {
    /// Create a new interest rate.
    ///
    /// # Errors
    /// Compounded conventions need a frequency with a positive number of
    /// periods per year.
    pub fn new(rate: Rate, compounding: Compounding, frequency: Frequency) -> Result<Self> {
        if compounding.needs_frequency() {
            frequency_value(frequency)?;
        }
        Ok(Self {
            rate,
            compounding,
            frequency,
        })
    }

    /// A continuously compounded rate.
    pub fn continuous(rate: Rate) -> Self {
        Self {
            rate,
            compounding: Compounding::Continuous,
            frequency: Frequency::NoFrequency,
        }
    }

    /// The rate value.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// The compounding convention.
    pub fn compounding(&self) -> Compounding {
        self.compounding
    }

    /// The compounding frequency.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Growth of one unit over `t` years.
    pub fn compound_factor(&self, t: Time) -> Result<Real> {
        if t < 0.0 {
            return Err(Error::Precondition(format!("negative time ({t}) not allowed")));
        }
        if t == 0.0 {
            return Ok(1.0);
        }
        let r = self.rate;
        let factor = match self.compounding {
            Compounding::Simple => 1.0 + r * t,
            Compounding::Continuous => (r * t).exp(),
            Compounding::Compounded => {
                let f = frequency_value(self.frequency)?;
                (1.0 + r / f).powf(f * t)
            }
            Compounding::SimpleThenCompounded => {
                let f = frequency_value(self.frequency)?;
                if t <= 1.0 / f {
                    1.0 + r * t
                } else {
                    (1.0 + r / f).powf(f * t)
                }
            }
            Compounding::CompoundedThenSimple => {
                let f = frequency_value(self.frequency)?;
                if t <= 1.0 / f {
                    (1.0 + r / f).powf(f * t)
                } else {
                    1.0 + r * t
                }
            }
        };
        if factor <= 0.0 {
            return Err(Error::Runtime(format!(
                "non-positive compound factor {factor} for rate {r} over {t} years"
            )));
        }
        Ok(factor)
    }

    /// Discount factor over `t` years.
    pub fn discount_factor(&self, t: Time) -> Result<Real> {
        Ok(1.0 / self.compound_factor(t)?)
    }

    /// The rate with the given conventions that produces `compound` over `t`.
    pub fn implied_rate(
        compound: Real,
        compounding: Compounding,
        frequency: Frequency,
        t: Time,
    ) -> Result<InterestRate> {
        if compound <= 0.0 {
            return Err(Error::Precondition(format!(
                "positive compound factor required, got {compound}"
            )));
        }
        if t <= 0.0 {
            return Err(Error::Precondition(format!(
                "positive time required to imply a rate, got {t}"
            )));
        }
        let compounded = |f: Real| (compound.powf(1.0 / (f * t)) - 1.0) * f;
        let rate = match compounding {
            Compounding::Simple => (compound - 1.0) / t,
            Compounding::Continuous => compound.ln() / t,
            Compounding::Compounded => compounded(frequency_value(frequency)?),
            Compounding::SimpleThenCompounded => {
                let f = frequency_value(frequency)?;
                if t <= 1.0 / f {
                    (compound - 1.0) / t
                } else {
                    compounded(f)
                }
            }
            Compounding::CompoundedThenSimple => {
                let f = frequency_value(frequency)?;
                if t <= 1.0 / f {
                    compounded(f)
                } else {
                    (compound - 1.0) / t
                }
            }
        };
        InterestRate::new(rate, compounding, frequency)
    }

    /// The rate under other conventions with the same growth over `t`.
    pub fn equivalent_rate(
        &self,
        compounding: Compounding,
        frequency: Frequency,
        t: Time,
    ) -> Result<InterestRate> {
        Self::implied_rate(self.compound_factor(t)?, compounding, frequency, t)
    }
}

impl fmt::Display for InterestRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}% ", self.rate * 100.0)?;
        match self.compounding {
            Compounding::Simple => write!(f, "simple compounding"),
            Compounding::Continuous => write!(f, "continuous compounding"),
            Compounding::Compounded => write!(f, "{} compounding", self.frequency),
            Compounding::SimpleThenCompounded => {
                write!(f, "simple compounding up to {} then compounded", self.frequency)
            }
            Compounding::CompoundedThenSimple => {
                write!(f, "compounded up to {} then simple", self.frequency)
            }
        }
    }
}

fn frequency_value(frequency: Frequency) -> Result<Real> {
    match frequency.periods_per_year() {
        Some(n) if n > 0 => Ok(Real::from(n)),
        _ => Err(Error::InvalidArgument(format!(
            "{frequency} frequency not allowed for compounded rates"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn continuous_round_trip() {
        let r = InterestRate::continuous(0.05);
        let df = r.discount_factor(2.0).unwrap();
        assert_abs_diff_eq!(df, (-0.1_f64).exp(), epsilon = 1e-15);
        let back = InterestRate::implied_rate(1.0 / df, Compounding::Continuous, Frequency::NoFrequency, 2.0)
            .unwrap();
        assert_abs_diff_eq!(back.rate(), 0.05, epsilon = 1e-14);
    }

    #[test]
    fn equivalent_annual_rate() {
        let r = InterestRate::continuous(0.05);
        let annual = r
            .equivalent_rate(Compounding::Compounded, Frequency::Annual, 1.0)
            .unwrap();
        assert_abs_diff_eq!(annual.rate(), 0.05_f64.exp() - 1.0, epsilon = 1e-14);
    }

    #[test]
    fn compounded_needs_frequency() {
        assert!(InterestRate::new(0.05, Compounding::Compounded, Frequency::NoFrequency).is_err());
        assert!(InterestRate::new(0.05, Compounding::Simple, Frequency::NoFrequency).is_ok());
    }

    #[test]
    fn negative_time_rejected() {
        assert!(InterestRate::continuous(0.01).compound_factor(-1.0).is_err());
        assert!(InterestRate::implied_rate(1.01, Compounding::Simple, Frequency::Annual, 0.0).is_err());
    }
}
