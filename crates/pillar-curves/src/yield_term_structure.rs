//! `YieldTermStructure`: discount, zero and forward queries on a curve.
//!
//! Every curve answers three related questions about the future value of
//! money as seen from its reference date:
//!
//! * **discount factor** `P(t)`
//! * **zero rate** `z(t)` with `P(t) = exp(−z(t)·t)`
//! * **instantaneous forward** `f(t) = −d ln P / dt`
//!
//! Implementors supply [`discount_impl`](YieldTermStructure::discount_impl)
//! and, when they have closed forms, the zero and forward hooks. The public
//! queries range-check the time, convert dates with the curve's day counter
//! and express rates under any compounding convention.

use std::fmt;

use pillar_core::errors::{Error, Result};
use pillar_core::{ensure, Compounding, DiscountFactor, Observable, Rate, Time};
use pillar_time::{Date, DayCounter, Frequency, InterestRate};

/// Step used where a rate must be read off a discount curve numerically,
/// and the horizon below which zero rates are taken from forwards.
pub const DT: Time = 1.0e-4;

/// A yield (interest-rate) term structure.
pub trait YieldTermStructure: Observable + fmt::Debug {
    /// The date at which discount factors are one.
    fn reference_date(&self) -> Date;

    /// Day counter converting dates into times.
    fn day_counter(&self) -> DayCounter;

    /// Latest date for which the curve can return values without
    /// extrapolating.
    fn max_date(&self) -> Date;

    /// Whether queries beyond [`max_date`](Self::max_date) are allowed.
    fn allows_extrapolation(&self) -> bool {
        false
    }

    // ── Implementation hooks ─────────────────────────────────────────────

    /// Discount factor at `t`, already range-checked.
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor>;

    /// Continuously compounded zero rate at `t`, already range-checked.
    fn zero_rate_impl(&self, t: Time) -> Result<Rate> {
        if t < DT {
            return self.instantaneous_forward_impl(0.5 * t);
        }
        Ok(-self.discount_impl(t)?.ln() / t)
    }

    /// Instantaneous forward at `t`, already range-checked.
    fn instantaneous_forward_impl(&self, t: Time) -> Result<Rate> {
        let t1 = (t - 0.5 * DT).max(0.0);
        let t2 = t1 + DT;
        Ok((self.discount_impl(t1)?.ln() - self.discount_impl(t2)?.ln()) / DT)
    }

    // ── Dates and range ──────────────────────────────────────────────────

    /// Year fraction from the reference date to `date`.
    fn time_from_reference(&self, date: Date) -> Time {
        self.day_counter().year_fraction(self.reference_date(), date)
    }

    /// [`max_date`](Self::max_date) as a time.
    fn max_time(&self) -> Time {
        self.time_from_reference(self.max_date())
    }

    /// Reject negative times, and times past the end of the curve unless
    /// extrapolation is enabled.
    fn check_range(&self, t: Time) -> Result<()> {
        if t < 0.0 {
            return Err(Error::Calibration(format!(
                "negative time ({t}) given: the date precedes the reference date {}",
                self.reference_date()
            )));
        }
        if self.allows_extrapolation() {
            return Ok(());
        }
        let max = self.max_time();
        if t > max * (1.0 + 1e-12) + 1e-12 {
            return Err(Error::Extrapolation { x: t, min: 0.0, max });
        }
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Discount factor at time `t`.
    fn discount(&self, t: Time) -> Result<DiscountFactor> {
        self.check_range(t)?;
        self.discount_impl(t)
    }

    /// Discount factor at `date`.
    fn discount_date(&self, date: Date) -> Result<DiscountFactor> {
        self.discount(self.time_from_reference(date))
    }

    /// Zero rate at time `t` under the given conventions.
    fn zero_rate(
        &self,
        t: Time,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<InterestRate> {
        self.check_range(t)?;
        let z = InterestRate::continuous(self.zero_rate_impl(t)?);
        if compounding == Compounding::Continuous {
            return InterestRate::new(z.rate(), compounding, frequency);
        }
        z.equivalent_rate(compounding, frequency, t.max(DT))
    }

    /// Zero rate at `date` under the given conventions.
    fn zero_rate_date(
        &self,
        date: Date,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<InterestRate> {
        self.zero_rate(self.time_from_reference(date), compounding, frequency)
    }

    /// Forward rate between `t1` and `t2` under the given conventions. When
    /// the times coincide the instantaneous forward is returned, expressed
    /// under the requested conventions over `DT`.
    fn forward_rate(
        &self,
        t1: Time,
        t2: Time,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<InterestRate> {
        ensure!(t2 >= t1, "forward start {t1} is after its end {t2}");
        self.check_range(t1)?;
        self.check_range(t2)?;
        if t2 - t1 < DT {
            let f = InterestRate::continuous(self.instantaneous_forward_impl(0.5 * (t1 + t2))?);
            if compounding == Compounding::Continuous {
                return InterestRate::new(f.rate(), compounding, frequency);
            }
            return f.equivalent_rate(compounding, frequency, DT);
        }
        let compound = self.discount_impl(t1)? / self.discount_impl(t2)?;
        InterestRate::implied_rate(compound, compounding, frequency, t2 - t1)
    }

    /// Forward rate between two dates under the given conventions.
    fn forward_rate_date(
        &self,
        d1: Date,
        d2: Date,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<InterestRate> {
        self.forward_rate(
            self.time_from_reference(d1),
            self.time_from_reference(d2),
            compounding,
            frequency,
        )
    }

    /// Instantaneous forward at time `t`.
    fn instantaneous_forward(&self, t: Time) -> Result<Rate> {
        self.check_range(t)?;
        self.instantaneous_forward_impl(t)
    }
}
