//! Curve traits: which quantity a curve interpolates natively.
//!
//! A bootstrapped curve stores one value per pillar. The trait decides what
//! that value means (discount factor, zero rate or instantaneous forward),
//! what the seed pillar at the reference date holds, how a first guess is
//! made and which bracket the root finder searches.

use std::fmt;

use pillar_core::errors::{Error, Result};
use pillar_core::{Rate, Real, Time};
use pillar_math::Interpolator;

/// Largest rate magnitude the default brackets allow for.
pub const MAX_RATE: Rate = 1.0;

/// Typical rate level used for cold first guesses.
pub const AVG_RATE: Rate = 0.05;

/// The quantity a curve interpolates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveTrait {
    /// Discount factors; the seed is one.
    #[default]
    Discount,
    /// Continuously compounded zero rates; the seed mirrors the first pillar.
    ZeroYield,
    /// Instantaneous forwards; the seed mirrors the first pillar.
    ForwardRate,
}

impl CurveTrait {
    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            CurveTrait::Discount => "discount",
            CurveTrait::ZeroYield => "zero-yield",
            CurveTrait::ForwardRate => "forward-rate",
        }
    }

    /// Value of the seed pillar before anything is solved.
    pub fn initial_value(&self) -> Real {
        match self {
            CurveTrait::Discount => 1.0,
            CurveTrait::ZeroYield | CurveTrait::ForwardRate => AVG_RATE,
        }
    }

    /// `true` when the seed pillar copies the first solved pillar instead of
    /// staying fixed.
    pub fn mirrors_seed(&self) -> bool {
        !matches!(self, CurveTrait::Discount)
    }

    /// Reject interpolations that make no sense on this trait.
    pub fn check_interpolator(&self, interpolator: Interpolator) -> Result<()> {
        if interpolator == Interpolator::ConvexMonotone && *self != CurveTrait::ZeroYield {
            return Err(Error::Configuration(format!(
                "{interpolator} interpolation requires the zero-yield trait, not {self}"
            )));
        }
        Ok(())
    }

    /// A flat 5% curve on this trait, evaluated at `t`.
    pub fn flat_guess(&self, t: Time) -> Real {
        match self {
            CurveTrait::Discount => (-AVG_RATE * t).exp(),
            CurveTrait::ZeroYield | CurveTrait::ForwardRate => AVG_RATE,
        }
    }

    /// Cold guess for the first pillar.
    pub fn first_guess(&self) -> Real {
        match self {
            CurveTrait::Discount => 1.0 / (1.0 + AVG_RATE * 0.25),
            CurveTrait::ZeroYield | CurveTrait::ForwardRate => AVG_RATE,
        }
    }

    /// Lower end of the bracket for pillar `i`.
    ///
    /// `data` holds the pillars solved so far (at least `0..i`), `times` the
    /// pillar times. `valid` is a previously solved curve's data when the
    /// pass is warm-started or re-sweeping.
    pub fn min_value_after(
        &self,
        i: usize,
        data: &[Real],
        times: &[Time],
        valid: Option<&[Real]>,
    ) -> Real {
        match (self, valid) {
            (CurveTrait::Discount, Some(valid)) => minimum(valid) / 2.0,
            (CurveTrait::Discount, None) => {
                let dt = times[i] - times[i - 1];
                data[i - 1] * (-MAX_RATE * dt).exp()
            }
            (_, Some(valid)) => {
                let r = minimum(valid);
                if r < 0.0 {
                    2.0 * r
                } else {
                    r / 2.0
                }
            }
            (_, None) => -MAX_RATE,
        }
    }

    /// Upper end of the bracket for pillar `i`; see
    /// [`min_value_after`](Self::min_value_after).
    pub fn max_value_after(
        &self,
        i: usize,
        data: &[Real],
        times: &[Time],
        valid: Option<&[Real]>,
    ) -> Real {
        match (self, valid) {
            (CurveTrait::Discount, _) => {
                let dt = times[i] - times[i - 1];
                data[i - 1] * (MAX_RATE * dt).exp()
            }
            (_, Some(valid)) => {
                let r = maximum(valid);
                if r < 0.0 {
                    r / 2.0
                } else {
                    2.0 * r
                }
            }
            (_, None) => MAX_RATE,
        }
    }

    /// Bounds for a node at time `t` in a joint solve.
    pub fn global_bounds(&self, t: Time) -> (Real, Real) {
        match self {
            CurveTrait::Discount => ((-MAX_RATE * t).exp(), (MAX_RATE * t).exp()),
            CurveTrait::ZeroYield | CurveTrait::ForwardRate => (-MAX_RATE, MAX_RATE),
        }
    }
}

impl fmt::Display for CurveTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn minimum(values: &[Real]) -> Real {
    values.iter().copied().fold(Real::INFINITY, Real::min)
}

fn maximum(values: &[Real]) -> Real {
    values.iter().copied().fold(Real::NEG_INFINITY, Real::max)
}
