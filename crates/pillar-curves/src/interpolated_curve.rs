//! Curves that are given rather than solved.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use pillar_core::errors::{Error, Result};
use pillar_core::{
    ensure_config, Compounding, DiscountFactor, Handle, Observable, ObservableImpl, Observer,
    Rate, Real, Time,
};
use pillar_math::Interpolator;
use pillar_quotes::Quote;
use pillar_time::{Date, DayCounter, Frequency, InterestRate};

use crate::bootstrap_curve::CurveData;
use crate::traits::CurveTrait;
use crate::yield_term_structure::YieldTermStructure;

// ── InterpolatedCurve ─────────────────────────────────────────────────────────

/// A curve through fixed nodes on any trait.
///
/// The first node date must be the reference date. Between nodes the
/// interpolation is used; past the last node the forward is held flat (only
/// with extrapolation enabled).
#[derive(Debug)]
pub struct InterpolatedCurve {
    reference_date: Date,
    day_counter: DayCounter,
    dates: Vec<Date>,
    data: CurveData,
    observable: ObservableImpl,
    extrapolation: Cell<bool>,
}

impl InterpolatedCurve {
    /// A curve through `(dates[i], values[i])` on the native scale of
    /// `curve_trait`.
    pub fn new(
        reference_date: Date,
        day_counter: DayCounter,
        curve_trait: CurveTrait,
        interpolator: Interpolator,
        dates: Vec<Date>,
        values: Vec<Real>,
    ) -> Result<Self> {
        curve_trait.check_interpolator(interpolator)?;
        ensure_config!(
            dates.len() == values.len(),
            "{} dates given for {} values",
            dates.len(),
            values.len()
        );
        ensure_config!(
            dates.first() == Some(&reference_date),
            "the first node must be the reference date {reference_date}"
        );
        let times: Vec<Time> = dates
            .iter()
            .map(|&d| day_counter.year_fraction(reference_date, d))
            .collect();
        if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::Configuration(format!(
                "node dates {} and {} are not increasing",
                dates[i],
                dates[i + 1]
            )));
        }
        let data = CurveData::new(curve_trait, interpolator, &times, &values)?;
        Ok(Self::from_parts(reference_date, day_counter, dates, data))
    }

    pub(crate) fn from_parts(
        reference_date: Date,
        day_counter: DayCounter,
        dates: Vec<Date>,
        data: CurveData,
    ) -> Self {
        Self {
            reference_date,
            day_counter,
            dates,
            data,
            observable: ObservableImpl::new(),
            extrapolation: Cell::new(false),
        }
    }

    /// Node dates.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Node times.
    pub fn times(&self) -> &[Time] {
        self.data.times()
    }

    /// Node values on the native scale.
    pub fn data(&self) -> &[Real] {
        self.data.values()
    }

    /// The nodes with their interpolation.
    pub fn curve_data(&self) -> &CurveData {
        &self.data
    }

    /// `(date, value)` pairs.
    pub fn nodes(&self) -> Vec<(Date, Real)> {
        self.dates.iter().copied().zip(self.data.values().iter().copied()).collect()
    }

    /// The curve trait.
    pub fn curve_trait(&self) -> CurveTrait {
        self.data.curve_trait()
    }

    /// The interpolation scheme.
    pub fn interpolator(&self) -> Interpolator {
        self.data.interpolator()
    }

    /// Allow queries past the last node.
    pub fn enable_extrapolation(&self) {
        self.extrapolation.set(true);
    }

    /// Forbid queries past the last node.
    pub fn disable_extrapolation(&self) {
        self.extrapolation.set(false);
    }
}

impl Observable for InterpolatedCurve {
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

impl YieldTermStructure for InterpolatedCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> DayCounter {
        self.day_counter
    }

    fn max_date(&self) -> Date {
        self.dates.last().copied().unwrap_or(self.reference_date)
    }

    fn allows_extrapolation(&self) -> bool {
        self.extrapolation.get()
    }

    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        Ok(self.data.discount(t))
    }

    fn zero_rate_impl(&self, t: Time) -> Result<Rate> {
        Ok(self.data.zero_rate(t))
    }

    fn instantaneous_forward_impl(&self, t: Time) -> Result<Rate> {
        Ok(self.data.forward(t))
    }
}

// ── FlatForward ───────────────────────────────────────────────────────────────

/// A curve with one constant rate read from a quote.
///
/// The curve has no end date and follows the quote: a change of the quote
/// is a change of the curve.
#[derive(Debug)]
pub struct FlatForward {
    reference_date: Date,
    day_counter: DayCounter,
    rate: Handle<dyn Quote>,
    compounding: Compounding,
    frequency: Frequency,
}

impl FlatForward {
    /// A flat continuously compounded rate.
    pub fn new(reference_date: Date, rate: Rc<dyn Quote>, day_counter: DayCounter) -> Self {
        Self {
            reference_date,
            day_counter,
            rate: Handle::new(rate),
            compounding: Compounding::Continuous,
            frequency: Frequency::Annual,
        }
    }

    /// Read the quote as a rate under other conventions.
    pub fn with_compounding(mut self, compounding: Compounding, frequency: Frequency) -> Self {
        self.compounding = compounding;
        self.frequency = frequency;
        self
    }

    fn rate(&self) -> Result<InterestRate> {
        let value = self
            .rate
            .current()
            .and_then(|q| q.value())
            .ok_or_else(|| Error::Calibration("flat forward rate quote is not valid".into()))?;
        InterestRate::new(value, self.compounding, self.frequency)
    }
}

impl Observable for FlatForward {
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.rate.register_observer(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.rate.unregister_observer(observer);
    }

    fn notify_observers(&self) {
        self.rate.notify_observers();
    }
}

impl YieldTermStructure for FlatForward {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> DayCounter {
        self.day_counter
    }

    fn max_date(&self) -> Date {
        Date::MAX
    }

    fn allows_extrapolation(&self) -> bool {
        true
    }

    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        self.rate()?.discount_factor(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pillar_core::patterns::observable::downgrade;
    use pillar_quotes::SimpleQuote;
    use std::cell::Cell;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[derive(Default)]
    struct Hits(Cell<u32>);

    impl Observer for Hits {
        fn update(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn interpolated_zero_curve_is_node_exact() {
        let reference = date(2025, 1, 15);
        let curve = InterpolatedCurve::new(
            reference,
            DayCounter::Actual365Fixed,
            CurveTrait::ZeroYield,
            Interpolator::Linear,
            vec![reference, date(2026, 1, 15), date(2030, 1, 15)],
            vec![0.02, 0.02, 0.03],
        )
        .unwrap();
        let t = curve.times()[2];
        assert_abs_diff_eq!(
            curve.zero_rate(t, Compounding::Continuous, Frequency::Annual).unwrap().rate(),
            0.03,
            epsilon = 1e-14
        );
        assert_abs_diff_eq!(curve.discount(t).unwrap(), (-0.03 * t).exp(), epsilon = 1e-14);
        assert!(matches!(curve.discount(t + 1.0), Err(Error::Extrapolation { .. })));
        curve.enable_extrapolation();
        assert!(curve.discount(t + 1.0).is_ok());
    }

    #[test]
    fn first_node_must_be_the_reference_date() {
        let result = InterpolatedCurve::new(
            date(2025, 1, 15),
            DayCounter::Actual365Fixed,
            CurveTrait::Discount,
            Interpolator::LogLinear,
            vec![date(2025, 2, 15), date(2026, 1, 15)],
            vec![1.0, 0.97],
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn flat_forward_follows_its_quote() {
        let quote = SimpleQuote::shared(0.05);
        let curve = Rc::new(FlatForward::new(
            date(2025, 1, 15),
            quote.clone(),
            DayCounter::Actual365Fixed,
        ));
        let hits = Rc::new(Hits::default());
        curve.register_observer(downgrade(&hits));

        assert_abs_diff_eq!(curve.discount(2.0).unwrap(), (-0.1f64).exp(), epsilon = 1e-15);
        quote.set_value(0.04);
        assert_eq!(hits.0.get(), 1);
        assert_abs_diff_eq!(curve.discount(2.0).unwrap(), (-0.08f64).exp(), epsilon = 1e-15);
        assert!(curve.discount(500.0).is_ok());
    }

    #[test]
    fn annual_flat_forward() {
        let curve = FlatForward::new(
            date(2025, 1, 15),
            SimpleQuote::shared(0.05),
            DayCounter::Actual365Fixed,
        )
        .with_compounding(Compounding::Compounded, Frequency::Annual);
        assert_abs_diff_eq!(curve.discount(2.0).unwrap(), 1.05f64.powi(-2), epsilon = 1e-15);
    }
}
