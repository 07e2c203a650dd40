//! A curve derived from another by a parallel zero-rate spread.

use std::rc::{Rc, Weak};

use pillar_core::errors::{Error, Result};
use pillar_core::{DiscountFactor, Handle, Observable, ObservableImpl, Observer, Rate, Spread, Time};
use pillar_quotes::Quote;
use pillar_time::{Date, DayCounter};

use crate::yield_term_structure::YieldTermStructure;

/// The base curve shifted by a continuously compounded zero spread:
/// `z(t) = z_base(t) + s`, so `P(t) = P_base(t)·exp(−s·t)`.
///
/// Dates, day counter and range follow the base curve. Changes of the base
/// curve, of its handle or of the spread quote are forwarded to observers.
#[derive(Debug)]
pub struct ZeroSpreadedCurve {
    base: Handle<dyn YieldTermStructure>,
    spread: Handle<dyn Quote>,
    observable: ObservableImpl,
}

impl ZeroSpreadedCurve {
    /// Spread `base` by `spread`.
    pub fn new(base: Handle<dyn YieldTermStructure>, spread: Rc<dyn Quote>) -> Rc<Self> {
        let curve = Rc::new(Self {
            base,
            spread: Handle::new(spread),
            observable: ObservableImpl::new(),
        });
        let me: Weak<dyn Observer> = {
            let weak: Weak<Self> = Rc::downgrade(&curve);
            weak
        };
        curve.base.register_observer(me.clone());
        curve.spread.register_observer(me);
        curve
    }

    /// The base curve's handle.
    pub fn base(&self) -> &Handle<dyn YieldTermStructure> {
        &self.base
    }

    fn base_curve(&self) -> Result<Rc<dyn YieldTermStructure>> {
        self.base
            .current()
            .ok_or_else(|| Error::Calibration("spreaded curve has an empty base handle".into()))
    }

    fn spread(&self) -> Result<Spread> {
        self.spread
            .current()
            .and_then(|q| q.value())
            .ok_or_else(|| Error::Calibration("spreaded curve has an invalid spread quote".into()))
    }
}

impl Observer for ZeroSpreadedCurve {
    fn update(&self) {
        self.observable.notify();
    }
}

impl Observable for ZeroSpreadedCurve {
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.observable.register(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.observable.unregister(observer);
    }

    fn notify_observers(&self) {
        self.observable.notify();
    }
}

impl YieldTermStructure for ZeroSpreadedCurve {
    fn reference_date(&self) -> Date {
        self.base
            .current()
            .map_or(Date::MAX, |base| base.reference_date())
    }

    fn day_counter(&self) -> DayCounter {
        self.base
            .current()
            .map_or_else(DayCounter::default, |base| base.day_counter())
    }

    fn max_date(&self) -> Date {
        self.base.current().map_or(Date::MAX, |base| base.max_date())
    }

    fn allows_extrapolation(&self) -> bool {
        self.base
            .current()
            .map_or(false, |base| base.allows_extrapolation())
    }

    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        let base = self.base_curve()?.discount(t)?;
        Ok(base * (-self.spread()? * t).exp())
    }

    fn zero_rate_impl(&self, t: Time) -> Result<Rate> {
        let base = self.base_curve()?;
        Ok(base.zero_rate_impl(t)? + self.spread()?)
    }

    fn instantaneous_forward_impl(&self, t: Time) -> Result<Rate> {
        Ok(self.base_curve()?.instantaneous_forward(t)? + self.spread()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolated_curve::FlatForward;
    use approx::assert_abs_diff_eq;
    use pillar_core::patterns::observable::downgrade;
    use pillar_core::{Compounding, RelinkableHandle};
    use pillar_quotes::SimpleQuote;
    use pillar_time::Frequency;
    use std::cell::Cell;

    #[derive(Default)]
    struct Hits(Cell<u32>);

    impl Observer for Hits {
        fn update(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn spread_adds_to_zero_rates_and_forwards() {
        let reference = Date::from_ymd(2025, 1, 15).unwrap();
        let base: Rc<dyn YieldTermStructure> = Rc::new(FlatForward::new(
            reference,
            SimpleQuote::shared(0.03),
            DayCounter::Actual365Fixed,
        ));
        let curve = ZeroSpreadedCurve::new(Handle::new(base), SimpleQuote::shared(0.0025));
        let z = curve.zero_rate(3.0, Compounding::Continuous, Frequency::Annual).unwrap();
        assert_abs_diff_eq!(z.rate(), 0.0325, epsilon = 1e-14);
        assert_abs_diff_eq!(curve.instantaneous_forward(3.0).unwrap(), 0.0325, epsilon = 1e-8);
        assert_abs_diff_eq!(curve.discount(3.0).unwrap(), (-0.0975f64).exp(), epsilon = 1e-14);
        assert_eq!(curve.reference_date(), reference);
    }

    #[test]
    fn base_relinking_and_spread_changes_are_forwarded() {
        let reference = Date::from_ymd(2025, 1, 15).unwrap();
        let flat = |r| -> Rc<dyn YieldTermStructure> {
            Rc::new(FlatForward::new(reference, SimpleQuote::shared(r), DayCounter::Actual365Fixed))
        };
        let base = RelinkableHandle::new(flat(0.03));
        let spread = SimpleQuote::shared(0.001);
        let curve = ZeroSpreadedCurve::new(base.handle(), spread.clone());
        let hits = Rc::new(Hits::default());
        curve.register_observer(downgrade(&hits));

        spread.set_value(0.002);
        assert_eq!(hits.0.get(), 1);
        base.link_to(flat(0.04));
        assert_eq!(hits.0.get(), 2);
        assert_abs_diff_eq!(curve.discount(1.0).unwrap(), (-0.042f64).exp(), epsilon = 1e-14);

        base.unlink();
        assert!(matches!(curve.discount_impl(1.0), Err(Error::Calibration(_))));
    }
}
