//! Curve data on a trait's native scale, and the read-only view rate
//! helpers price against while a curve is being solved.

use pillar_core::errors::{Error, Result};
use pillar_core::{DiscountFactor, Rate, Real, Time};
use pillar_math::{Interpolation, Interpolation1D, Interpolator};
use pillar_time::{Date, DayCounter};

use crate::traits::CurveTrait;
use crate::yield_term_structure::DT;

// ── CurveData ────────────────────────────────────────────────────────────────

/// Nodes of a curve on its trait's native scale, with the interpolation
/// built through them.
///
/// Node 0 sits at time zero. Inside the node range the interpolation is
/// used; beyond the last node every trait continues with a flat
/// instantaneous forward.
#[derive(Debug, Clone)]
pub struct CurveData {
    curve_trait: CurveTrait,
    interpolator: Interpolator,
    interpolation: Interpolation,
}

impl CurveData {
    /// Build from node times (starting at zero) and native values.
    pub fn new(
        curve_trait: CurveTrait,
        interpolator: Interpolator,
        times: &[Time],
        values: &[Real],
    ) -> Result<Self> {
        Ok(Self {
            curve_trait,
            interpolator,
            interpolation: interpolator.interpolate(times, values)?,
        })
    }

    /// The curve trait.
    pub fn curve_trait(&self) -> CurveTrait {
        self.curve_trait
    }

    /// The interpolation scheme.
    pub fn interpolator(&self) -> Interpolator {
        self.interpolator
    }

    /// Node times.
    pub fn times(&self) -> &[Time] {
        self.interpolation.xs()
    }

    /// Node values on the native scale.
    pub fn values(&self) -> &[Real] {
        self.interpolation.ys()
    }

    /// Time of the last node.
    pub fn max_time(&self) -> Time {
        self.interpolation.x_max()
    }

    /// Move node `i`. On traits whose seed mirrors the first pillar, moving
    /// node 1 moves the seed too.
    pub fn update(&mut self, i: usize, value: Real) -> Result<()> {
        self.interpolation.update(i, value)?;
        if i == 1 && self.curve_trait.mirrors_seed() {
            self.interpolation.update(0, value)?;
        }
        Ok(())
    }

    /// The native quantity at `t`, extrapolated past the last node.
    pub fn native_value(&self, t: Time) -> Real {
        match self.curve_trait {
            CurveTrait::Discount => self.discount(t),
            CurveTrait::ZeroYield => self.zero_rate(t),
            CurveTrait::ForwardRate => self.forward(t),
        }
    }

    /// Discount factor at `t >= 0`.
    pub fn discount(&self, t: Time) -> DiscountFactor {
        let t_max = self.max_time();
        match self.curve_trait {
            CurveTrait::Discount => {
                if t <= t_max {
                    return self.interpolation.value_at(t);
                }
                let d_max = self.interpolation.value_at(t_max);
                d_max * (-self.last_forward() * (t - t_max)).exp()
            }
            CurveTrait::ZeroYield => (-self.zero_rate(t) * t).exp(),
            CurveTrait::ForwardRate => (-self.integrated_forward(t)).exp(),
        }
    }

    /// Continuously compounded zero rate at `t >= 0`.
    pub fn zero_rate(&self, t: Time) -> Rate {
        let t_max = self.max_time();
        match self.curve_trait {
            CurveTrait::ZeroYield => {
                if t <= t_max {
                    return self.interpolation.value_at(t);
                }
                let z_max = self.interpolation.value_at(t_max);
                (z_max * t_max + self.last_forward() * (t - t_max)) / t
            }
            CurveTrait::Discount => {
                if t < DT {
                    return self.forward(0.5 * t);
                }
                -self.discount(t).ln() / t
            }
            CurveTrait::ForwardRate => {
                if t < DT {
                    return self.forward(0.5 * t);
                }
                self.integrated_forward(t) / t
            }
        }
    }

    /// Instantaneous forward at `t >= 0`.
    pub fn forward(&self, t: Time) -> Rate {
        let t_max = self.max_time();
        if t > t_max {
            return self.last_forward();
        }
        match self.curve_trait {
            CurveTrait::Discount => {
                -self.interpolation.derivative_at(t) / self.interpolation.value_at(t)
            }
            CurveTrait::ZeroYield => {
                self.interpolation.value_at(t) + t * self.interpolation.derivative_at(t)
            }
            CurveTrait::ForwardRate => self.interpolation.value_at(t),
        }
    }

    // instantaneous forward at the last node, held flat beyond it
    fn last_forward(&self) -> Rate {
        let t_max = self.max_time();
        let (value, slope) = (
            self.interpolation.value_at(t_max),
            self.interpolation.derivative_at(t_max),
        );
        match self.curve_trait {
            CurveTrait::Discount => -slope / value,
            CurveTrait::ZeroYield => value + t_max * slope,
            CurveTrait::ForwardRate => value,
        }
    }

    // ∫₀ᵗ f, forward-rate trait only
    fn integrated_forward(&self, t: Time) -> Real {
        let t_max = self.max_time();
        if t <= t_max {
            return self.interpolation.primitive_at(t);
        }
        self.interpolation.primitive_at(t_max) + self.last_forward() * (t - t_max)
    }
}

// ── BootstrapCurve ───────────────────────────────────────────────────────────

/// Read-only view of a curve state, passed to rate helpers.
///
/// The view always extrapolates: helpers are evaluated against partial
/// curves whose later pillars are not solved yet.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapCurve<'a> {
    reference_date: Date,
    day_counter: DayCounter,
    data: &'a CurveData,
}

impl<'a> BootstrapCurve<'a> {
    /// View `data` as a curve starting at `reference_date`.
    pub fn new(reference_date: Date, day_counter: DayCounter, data: &'a CurveData) -> Self {
        Self {
            reference_date,
            day_counter,
            data,
        }
    }

    /// The curve's reference date.
    pub fn reference_date(&self) -> Date {
        self.reference_date
    }

    /// The curve's day counter.
    pub fn day_counter(&self) -> DayCounter {
        self.day_counter
    }

    /// The underlying nodes.
    pub fn data(&self) -> &'a CurveData {
        self.data
    }

    /// Year fraction from the reference date to `date`.
    pub fn time_from_reference(&self, date: Date) -> Time {
        self.day_counter.year_fraction(self.reference_date, date)
    }

    /// Discount factor at `t`.
    pub fn discount(&self, t: Time) -> Result<DiscountFactor> {
        self.check_time(t)?;
        Ok(self.data.discount(t))
    }

    /// Discount factor at `date`.
    pub fn discount_date(&self, date: Date) -> Result<DiscountFactor> {
        self.discount(self.time_from_reference(date))
    }

    /// Continuously compounded zero rate at `t`.
    pub fn zero_rate(&self, t: Time) -> Result<Rate> {
        self.check_time(t)?;
        Ok(self.data.zero_rate(t))
    }

    /// Instantaneous forward at `t`.
    pub fn instantaneous_forward(&self, t: Time) -> Result<Rate> {
        self.check_time(t)?;
        Ok(self.data.forward(t))
    }

    fn check_time(&self, t: Time) -> Result<()> {
        if t < 0.0 {
            return Err(Error::Calibration(format!(
                "negative time ({t}) given: a date precedes the reference date {}",
                self.reference_date
            )));
        }
        Ok(())
    }
}
