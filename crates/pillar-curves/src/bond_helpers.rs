//! Bond helpers: fixed-coupon bonds quoted on clean price.

use std::rc::Rc;

use pillar_core::errors::Result;
use pillar_core::{ensure_config, Handle, Rate, Real};
use pillar_quotes::Quote;
use pillar_time::{Date, DayCounter, Schedule};

use crate::bootstrap_curve::BootstrapCurve;
use crate::rate_helpers::RateHelper;

/// Notional the quoted price refers to.
pub const FACE_AMOUNT: Real = 100.0;

/// A fixed-rate bond quoted on clean price per 100 of notional.
///
/// The implied clean price is the dirty price at settlement (coupons paid
/// after settlement plus redemption, discounted on the curve and rolled
/// forward to settlement) minus the coupon accrued since the last payment.
#[derive(Debug, Clone)]
pub struct FixedRateBondHelper {
    quote: Handle<dyn Quote>,
    settlement: Date,
    schedule: Schedule,
    coupon: Rate,
    day_counter: DayCounter,
    redemption: Real,
}

impl FixedRateBondHelper {
    /// A bond paying `coupon` on every period of `schedule`, redeemed at par.
    pub fn new(
        clean_price: Rc<dyn Quote>,
        settlement: Date,
        schedule: Schedule,
        coupon: Rate,
        day_counter: DayCounter,
    ) -> Result<Self> {
        ensure_config!(
            schedule.end_date() > settlement,
            "bond maturing {} is expired at settlement {settlement}",
            schedule.end_date()
        );
        Ok(Self {
            quote: Handle::new(clean_price),
            settlement,
            schedule,
            coupon,
            day_counter,
            redemption: FACE_AMOUNT,
        })
    }

    /// Redeem at `redemption` per 100 instead of par.
    pub fn with_redemption(mut self, redemption: Real) -> Self {
        self.redemption = redemption;
        self
    }

    /// Coupon schedule.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Coupon accrued between the start of the current period and
    /// settlement, per 100 of notional.
    pub fn accrued_amount(&self) -> Real {
        self.schedule
            .periods()
            .find(|&(start, end)| start <= self.settlement && self.settlement < end)
            .map_or(0.0, |(start, _)| {
                FACE_AMOUNT * self.coupon * self.day_counter.year_fraction(start, self.settlement)
            })
    }
}

impl RateHelper for FixedRateBondHelper {
    fn quote(&self) -> &Handle<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.settlement
    }

    fn maturity_date(&self) -> Date {
        self.schedule.end_date()
    }

    fn implied_quote(&self, curve: &BootstrapCurve<'_>) -> Result<Real> {
        let mut dirty = 0.0;
        for (start, end) in self.schedule.periods() {
            if end > self.settlement {
                let amount = FACE_AMOUNT * self.coupon * self.day_counter.year_fraction(start, end);
                dirty += amount * curve.discount_date(end)?;
            }
        }
        dirty += self.redemption * curve.discount_date(self.maturity_date())?;
        dirty /= curve.discount_date(self.settlement)?;
        Ok(dirty - self.accrued_amount())
    }

    fn description(&self) -> String {
        format!(
            "{:.3}% bond maturing {}",
            self.coupon * 100.0,
            self.maturity_date()
        )
    }
}
