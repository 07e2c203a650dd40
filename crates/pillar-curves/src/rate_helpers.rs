//! Rate helpers: market quotes plus the trade economics that turn a curve
//! into an implied quote.
//!
//! A *rate helper* encapsulates a market-observable quote (a deposit rate,
//! FRA rate, futures price or par swap rate) together with the dates and
//! conventions needed to reprice it. The bootstrapper moves the pillar a
//! helper anchors until [`RateHelper::implied_quote`] matches the quote.
//!
//! Helpers never hold a pointer to the curve being built: each evaluation
//! receives a read-only [`BootstrapCurve`] view of the candidate state.

use std::fmt;
use std::rc::Rc;

use pillar_core::errors::{Error, Result};
use pillar_core::{ensure_config, DiscountFactor, Handle, Observable, Real};
use pillar_quotes::Quote;
use pillar_time::{Date, DayCounter, Frequency, Period, Schedule};

use crate::bootstrap_curve::BootstrapCurve;
use crate::yield_term_structure::YieldTermStructure;

// ── RateHelper trait ──────────────────────────────────────────────────────────

/// A market quote that constrains a curve at its pillar date.
pub trait RateHelper: fmt::Debug {
    /// The quote this helper reprices.
    fn quote(&self) -> &Handle<dyn Quote>;

    /// Current quote value; an empty or invalid quote is a calibration error.
    fn quote_value(&self) -> Result<Real> {
        self.quote()
            .current()
            .and_then(|q| q.value())
            .ok_or_else(|| Error::Calibration(format!("{} has an invalid quote", self.description())))
    }

    /// First date whose discount factor the helper reads.
    fn earliest_date(&self) -> Date;

    /// Maturity of the underlying trade.
    fn maturity_date(&self) -> Date;

    /// Last date whose discount factor the helper reads.
    fn latest_relevant_date(&self) -> Date {
        self.maturity_date()
    }

    /// The date whose curve node this helper determines.
    fn pillar_date(&self) -> Date {
        self.latest_relevant_date()
    }

    /// The quote implied by `curve`.
    fn implied_quote(&self, curve: &BootstrapCurve<'_>) -> Result<Real>;

    /// Implied minus observed quote.
    fn quote_error(&self, curve: &BootstrapCurve<'_>) -> Result<Real> {
        Ok(self.implied_quote(curve)? - self.quote_value()?)
    }

    /// Everything whose change invalidates a curve built on this helper:
    /// its quotes and the upstream curve handles it reads.
    fn observables(&self) -> Vec<Rc<dyn Observable>> {
        vec![self.quote().observable()]
    }

    /// Human-readable identity used in error messages and logs.
    fn description(&self) -> String;
}

// ── Shared pieces ─────────────────────────────────────────────────────────────

/// Discount factor at `date`, read from `external` when set and from the
/// curve under construction otherwise.
pub(crate) fn discount_on(
    external: Option<&Handle<dyn YieldTermStructure>>,
    curve: &BootstrapCurve<'_>,
    date: Date,
    role: &str,
) -> Result<DiscountFactor> {
    match external {
        None => curve.discount_date(date),
        Some(handle) => handle
            .current()
            .ok_or_else(|| Error::Calibration(format!("empty {role} curve handle")))?
            .discount_date(date),
    }
}

fn simple_forward(
    external: Option<&Handle<dyn YieldTermStructure>>,
    curve: &BootstrapCurve<'_>,
    start: Date,
    end: Date,
    day_counter: DayCounter,
) -> Result<Real> {
    let tau = day_counter.year_fraction(start, end);
    let p_start = discount_on(external, curve, start, "forwarding")?;
    let p_end = discount_on(external, curve, end, "forwarding")?;
    Ok((p_start / p_end - 1.0) / tau)
}

fn optional_value(quote: Option<&Handle<dyn Quote>>, what: &str) -> Result<Real> {
    match quote {
        None => Ok(0.0),
        Some(handle) => handle
            .current()
            .and_then(|q| q.value())
            .ok_or_else(|| Error::Calibration(format!("invalid {what} quote"))),
    }
}

fn check_dates(start: Date, end: Date, what: &str) -> Result<()> {
    ensure_config!(
        end > start,
        "{what}: maturity {end} must be after start {start}"
    );
    Ok(())
}

fn settlement(reference_date: Date, settlement_days: u32, tenor: Period) -> Result<(Date, Date)> {
    ensure_config!(tenor.length > 0, "non-positive tenor {tenor}");
    let start = reference_date.add_days(i64::from(settlement_days))?;
    Ok((start, start.advance(tenor)?))
}

// ── DepositRateHelper ─────────────────────────────────────────────────────────

/// A deposit (money-market) rate helper.
///
/// The implied quote is the simple rate over `[start, maturity]`:
/// `(P(start)/P(maturity) − 1) / τ`.
#[derive(Debug, Clone)]
pub struct DepositRateHelper {
    quote: Handle<dyn Quote>,
    start: Date,
    maturity: Date,
    day_counter: DayCounter,
}

impl DepositRateHelper {
    /// A deposit over explicit dates.
    pub fn new(
        quote: Rc<dyn Quote>,
        start: Date,
        maturity: Date,
        day_counter: DayCounter,
    ) -> Result<Self> {
        check_dates(start, maturity, "deposit")?;
        Ok(Self {
            quote: Handle::new(quote),
            start,
            maturity,
            day_counter,
        })
    }

    /// A deposit starting `settlement_days` calendar days after
    /// `reference_date` and running for `tenor`.
    pub fn from_tenor(
        quote: Rc<dyn Quote>,
        reference_date: Date,
        settlement_days: u32,
        tenor: Period,
        day_counter: DayCounter,
    ) -> Result<Self> {
        let (start, maturity) = settlement(reference_date, settlement_days, tenor)?;
        Self::new(quote, start, maturity, day_counter)
    }
}

impl RateHelper for DepositRateHelper {
    fn quote(&self) -> &Handle<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start
    }

    fn maturity_date(&self) -> Date {
        self.maturity
    }

    fn implied_quote(&self, curve: &BootstrapCurve<'_>) -> Result<Real> {
        simple_forward(None, curve, self.start, self.maturity, self.day_counter)
    }

    fn description(&self) -> String {
        format!("deposit {} to {}", self.start, self.maturity)
    }
}

// ── FraRateHelper ─────────────────────────────────────────────────────────────

/// Which period a FRA quote refers to.
///
/// Both conventions imply a simple forward rate; the convention only picks
/// the accrual period, and with it the pillar date. An indexed FRA runs for
/// exactly the index tenor from its start, an at-par FRA over whatever
/// `[start, end]` it was given (broken periods included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FraConvention {
    /// The quote is the index fixing: the forward over
    /// `[start, start + index tenor]`, pillared at the index maturity.
    #[default]
    Indexed,
    /// The quote is the par rate over the FRA's own accrual period
    /// `[start, end]`.
    AtPar,
}

/// A forward-rate-agreement helper.
#[derive(Debug, Clone)]
pub struct FraRateHelper {
    quote: Handle<dyn Quote>,
    start: Date,
    end: Date,
    day_counter: DayCounter,
    convention: FraConvention,
}

impl FraRateHelper {
    /// A FRA quoted on the index fixing over `[start, start + index_tenor]`.
    pub fn indexed(
        quote: Rc<dyn Quote>,
        start: Date,
        index_tenor: Period,
        day_counter: DayCounter,
    ) -> Result<Self> {
        ensure_config!(index_tenor.length > 0, "non-positive index tenor {index_tenor}");
        let end = start.advance(index_tenor)?;
        Self::build(quote, start, end, day_counter, FraConvention::Indexed)
    }

    /// A FRA quoted at par over its accrual period `[start, end]`.
    pub fn at_par(
        quote: Rc<dyn Quote>,
        start: Date,
        end: Date,
        day_counter: DayCounter,
    ) -> Result<Self> {
        Self::build(quote, start, end, day_counter, FraConvention::AtPar)
    }

    fn build(
        quote: Rc<dyn Quote>,
        start: Date,
        end: Date,
        day_counter: DayCounter,
        convention: FraConvention,
    ) -> Result<Self> {
        check_dates(start, end, "FRA")?;
        Ok(Self {
            quote: Handle::new(quote),
            start,
            end,
            day_counter,
            convention,
        })
    }

    /// The quoting convention.
    pub fn convention(&self) -> FraConvention {
        self.convention
    }
}

impl RateHelper for FraRateHelper {
    fn quote(&self) -> &Handle<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start
    }

    fn maturity_date(&self) -> Date {
        self.end
    }

    fn implied_quote(&self, curve: &BootstrapCurve<'_>) -> Result<Real> {
        simple_forward(None, curve, self.start, self.end, self.day_counter)
    }

    fn description(&self) -> String {
        let kind = match self.convention {
            FraConvention::Indexed => "indexed",
            FraConvention::AtPar => "at-par",
        };
        format!("{kind} FRA {} to {}", self.start, self.end)
    }
}

// ── FuturesRateHelper ─────────────────────────────────────────────────────────

/// How a futures quote is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FuturesQuoting {
    /// `100 · (1 − futures rate)`.
    Price,
    /// The futures rate itself.
    Rate,
}

/// An interest-rate futures helper.
///
/// The futures rate is the simple forward `F` over the contract period plus
/// an optional convexity adjustment `c`; the implied price is
/// `100 · (1 − (F + c))`.
#[derive(Debug, Clone)]
pub struct FuturesRateHelper {
    quote: Handle<dyn Quote>,
    quoting: FuturesQuoting,
    convexity: Option<Handle<dyn Quote>>,
    start: Date,
    end: Date,
    day_counter: DayCounter,
}

impl FuturesRateHelper {
    /// A contract quoted on price.
    pub fn from_price(
        price: Rc<dyn Quote>,
        start: Date,
        end: Date,
        day_counter: DayCounter,
    ) -> Result<Self> {
        Self::build(price, FuturesQuoting::Price, start, end, day_counter)
    }

    /// A contract quoted on its futures rate.
    pub fn from_rate(
        rate: Rc<dyn Quote>,
        start: Date,
        end: Date,
        day_counter: DayCounter,
    ) -> Result<Self> {
        Self::build(rate, FuturesQuoting::Rate, start, end, day_counter)
    }

    fn build(
        quote: Rc<dyn Quote>,
        quoting: FuturesQuoting,
        start: Date,
        end: Date,
        day_counter: DayCounter,
    ) -> Result<Self> {
        check_dates(start, end, "futures")?;
        Ok(Self {
            quote: Handle::new(quote),
            quoting,
            convexity: None,
            start,
            end,
            day_counter,
        })
    }

    /// Add a convexity adjustment (a rate) to the forward.
    pub fn with_convexity_adjustment(mut self, adjustment: Rc<dyn Quote>) -> Self {
        self.convexity = Some(Handle::new(adjustment));
        self
    }

    /// How the quote is expressed.
    pub fn quoting(&self) -> FuturesQuoting {
        self.quoting
    }
}

impl RateHelper for FuturesRateHelper {
    fn quote(&self) -> &Handle<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start
    }

    fn maturity_date(&self) -> Date {
        self.end
    }

    fn implied_quote(&self, curve: &BootstrapCurve<'_>) -> Result<Real> {
        let forward = simple_forward(None, curve, self.start, self.end, self.day_counter)?;
        let rate = forward + optional_value(self.convexity.as_ref(), "convexity adjustment")?;
        Ok(match self.quoting {
            FuturesQuoting::Price => 100.0 * (1.0 - rate),
            FuturesQuoting::Rate => rate,
        })
    }

    fn observables(&self) -> Vec<Rc<dyn Observable>> {
        let mut observables = vec![self.quote.observable()];
        observables.extend(self.convexity.iter().map(Handle::observable));
        observables
    }

    fn description(&self) -> String {
        format!("futures {} to {}", self.start, self.end)
    }
}

// ── SwapRateHelper ────────────────────────────────────────────────────────────

/// Leg conventions of a vanilla fixed-vs-floating swap.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapConventions {
    /// Fixed-leg payment frequency.
    pub fixed_frequency: Frequency,
    /// Fixed-leg accrual day counter.
    pub fixed_day_counter: DayCounter,
    /// Floating-leg payment (and index) frequency.
    pub float_frequency: Frequency,
    /// Floating-leg accrual day counter.
    pub float_day_counter: DayCounter,
}

impl Default for SwapConventions {
    fn default() -> Self {
        Self {
            fixed_frequency: Frequency::Annual,
            fixed_day_counter: DayCounter::Thirty360,
            float_frequency: Frequency::Quarterly,
            float_day_counter: DayCounter::Actual360,
        }
    }
}

/// A par-swap-rate helper.
///
/// Both legs run on unadjusted backward schedules. Floating forwards are
/// projected on the curve being built unless a forwarding handle is given;
/// cash flows are discounted on the curve being built unless a discounting
/// handle is given. The implied quote is
/// `Σ τ_j (F_j + s) D_j / Σ τ_i D_i`.
#[derive(Debug, Clone)]
pub struct SwapRateHelper {
    quote: Handle<dyn Quote>,
    spread: Option<Handle<dyn Quote>>,
    start: Date,
    maturity: Date,
    conventions: SwapConventions,
    fixed_schedule: Schedule,
    float_schedule: Schedule,
    discount_curve: Option<Handle<dyn YieldTermStructure>>,
    forward_curve: Option<Handle<dyn YieldTermStructure>>,
}

impl SwapRateHelper {
    /// A swap over explicit dates.
    pub fn new(
        quote: Rc<dyn Quote>,
        start: Date,
        maturity: Date,
        conventions: SwapConventions,
    ) -> Result<Self> {
        check_dates(start, maturity, "swap")?;
        Ok(Self {
            quote: Handle::new(quote),
            spread: None,
            start,
            maturity,
            conventions,
            fixed_schedule: Schedule::from_frequency(start, maturity, conventions.fixed_frequency)?,
            float_schedule: Schedule::from_frequency(start, maturity, conventions.float_frequency)?,
            discount_curve: None,
            forward_curve: None,
        })
    }

    /// A spot-starting swap of the given tenor.
    pub fn from_tenor(
        quote: Rc<dyn Quote>,
        reference_date: Date,
        settlement_days: u32,
        tenor: Period,
        conventions: SwapConventions,
    ) -> Result<Self> {
        let (start, maturity) = settlement(reference_date, settlement_days, tenor)?;
        Self::new(quote, start, maturity, conventions)
    }

    /// Add a spread over the floating index.
    pub fn with_spread(mut self, spread: Rc<dyn Quote>) -> Self {
        self.spread = Some(Handle::new(spread));
        self
    }

    /// Discount on an external curve instead of the one being built.
    pub fn with_discount_curve(mut self, curve: Handle<dyn YieldTermStructure>) -> Self {
        self.discount_curve = Some(curve);
        self
    }

    /// Project floating forwards on an external curve instead of the one
    /// being built.
    pub fn with_forward_curve(mut self, curve: Handle<dyn YieldTermStructure>) -> Self {
        self.forward_curve = Some(curve);
        self
    }

    /// Leg conventions.
    pub fn conventions(&self) -> SwapConventions {
        self.conventions
    }

    /// Fixed-leg schedule.
    pub fn fixed_schedule(&self) -> &Schedule {
        &self.fixed_schedule
    }

    /// Floating-leg schedule.
    pub fn float_schedule(&self) -> &Schedule {
        &self.float_schedule
    }
}

impl RateHelper for SwapRateHelper {
    fn quote(&self) -> &Handle<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start
    }

    fn maturity_date(&self) -> Date {
        self.maturity
    }

    fn implied_quote(&self, curve: &BootstrapCurve<'_>) -> Result<Real> {
        let discount = self.discount_curve.as_ref();
        let forward = self.forward_curve.as_ref();

        let mut annuity = 0.0;
        for (s, e) in self.fixed_schedule.periods() {
            let tau = self.conventions.fixed_day_counter.year_fraction(s, e);
            annuity += tau * discount_on(discount, curve, e, "discounting")?;
        }
        if annuity <= 0.0 {
            return Err(Error::Calibration(format!(
                "{}: non-positive fixed-leg annuity {annuity}",
                self.description()
            )));
        }

        let spread = optional_value(self.spread.as_ref(), "spread")?;
        let day_counter = self.conventions.float_day_counter;
        let mut floating = 0.0;
        for (s, e) in self.float_schedule.periods() {
            let tau = day_counter.year_fraction(s, e);
            let rate = simple_forward(forward, curve, s, e, day_counter)?;
            floating += tau * (rate + spread) * discount_on(discount, curve, e, "discounting")?;
        }
        Ok(floating / annuity)
    }

    fn observables(&self) -> Vec<Rc<dyn Observable>> {
        let mut observables = vec![self.quote.observable()];
        observables.extend(self.spread.iter().map(Handle::observable));
        observables.extend(self.discount_curve.iter().map(Handle::observable));
        observables.extend(self.forward_curve.iter().map(Handle::observable));
        observables
    }

    fn description(&self) -> String {
        format!("swap {} to {}", self.start, self.maturity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap_curve::CurveData;
    use crate::traits::CurveTrait;
    use approx::assert_abs_diff_eq;
    use pillar_math::Interpolator;
    use pillar_quotes::SimpleQuote;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn flat_data(r: Real) -> CurveData {
        let times = [0.0, 30.0];
        let values = [1.0, (-r * 30.0).exp()];
        CurveData::new(CurveTrait::Discount, Interpolator::LogLinear, &times, &values).unwrap()
    }

    #[test]
    fn deposit_implies_the_simple_rate() {
        let reference = date(2025, 1, 15);
        let data = flat_data(0.03);
        let curve = BootstrapCurve::new(reference, DayCounter::Actual365Fixed, &data);
        let helper = DepositRateHelper::from_tenor(
            SimpleQuote::shared(0.03),
            reference,
            2,
            Period::months(6),
            DayCounter::Actual360,
        )
        .unwrap();
        assert_eq!(helper.earliest_date(), date(2025, 1, 17));
        assert_eq!(helper.pillar_date(), date(2025, 7, 17));
        let t1 = DayCounter::Actual365Fixed.year_fraction(reference, helper.earliest_date());
        let t2 = DayCounter::Actual365Fixed.year_fraction(reference, helper.pillar_date());
        let tau = DayCounter::Actual360.year_fraction(helper.earliest_date(), helper.pillar_date());
        let expected = ((0.03 * (t2 - t1)).exp() - 1.0) / tau;
        assert_abs_diff_eq!(helper.implied_quote(&curve).unwrap(), expected, epsilon = 1e-14);
    }

    #[test]
    fn inconsistent_economics_are_configuration_errors() {
        let d = date(2025, 1, 15);
        let q = SimpleQuote::shared(0.03);
        assert!(matches!(
            DepositRateHelper::new(q.clone(), d, d, DayCounter::Actual360),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            DepositRateHelper::from_tenor(q.clone(), d, 0, Period::months(0), DayCounter::Actual360),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            SwapRateHelper::new(q, date(2026, 1, 15), d, SwapConventions::default()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn invalid_quote_is_a_calibration_error() {
        let q = Rc::new(SimpleQuote::empty());
        let helper =
            DepositRateHelper::new(q, date(2025, 1, 15), date(2025, 4, 15), DayCounter::Actual360)
                .unwrap();
        assert!(matches!(helper.quote_value(), Err(Error::Calibration(_))));
    }

    #[test]
    fn fra_conventions_choose_the_period() {
        let start = date(2025, 4, 15);
        let q = SimpleQuote::shared(0.03);
        let indexed = FraRateHelper::indexed(q.clone(), start, Period::months(3), DayCounter::Actual360)
            .unwrap();
        assert_eq!(indexed.pillar_date(), date(2025, 7, 15));
        assert_eq!(indexed.convention(), FraConvention::Indexed);
        let at_par = FraRateHelper::at_par(q, start, date(2025, 7, 31), DayCounter::Actual360).unwrap();
        assert_eq!(at_par.pillar_date(), date(2025, 7, 31));
        assert_eq!(at_par.convention(), FraConvention::AtPar);
    }

    #[test]
    fn fra_conventions_share_the_forward_economics() {
        let reference = date(2025, 1, 15);
        let data = flat_data(0.03);
        let curve = BootstrapCurve::new(reference, DayCounter::Actual365Fixed, &data);
        let start = date(2025, 4, 15);
        let q = SimpleQuote::shared(0.03);
        let indexed = FraRateHelper::indexed(q.clone(), start, Period::months(3), DayCounter::Actual360)
            .unwrap();
        let same_period =
            FraRateHelper::at_par(q.clone(), start, date(2025, 7, 15), DayCounter::Actual360).unwrap();
        let broken =
            FraRateHelper::at_par(q, start, date(2025, 7, 31), DayCounter::Actual360).unwrap();

        let f = indexed.implied_quote(&curve).unwrap();
        assert_eq!(f.to_bits(), same_period.implied_quote(&curve).unwrap().to_bits());
        let tau = DayCounter::Actual360.year_fraction(start, date(2025, 7, 15));
        let dt = DayCounter::Actual365Fixed.year_fraction(start, date(2025, 7, 15));
        assert_abs_diff_eq!(f, ((0.03 * dt).exp() - 1.0) / tau, epsilon = 1e-14);
        assert!((broken.implied_quote(&curve).unwrap() - f).abs() > 1e-8);
    }

    #[test]
    fn futures_price_includes_convexity() {
        let reference = date(2025, 1, 15);
        let data = flat_data(0.03);
        let curve = BootstrapCurve::new(reference, DayCounter::Actual365Fixed, &data);
        let (start, end) = (date(2025, 3, 19), date(2025, 6, 18));
        let plain =
            FuturesRateHelper::from_price(SimpleQuote::shared(97.0), start, end, DayCounter::Actual360)
                .unwrap();
        let adjusted = plain
            .clone()
            .with_convexity_adjustment(SimpleQuote::shared(0.0005));
        let rate_quoted =
            FuturesRateHelper::from_rate(SimpleQuote::shared(0.03), start, end, DayCounter::Actual360)
                .unwrap();
        let p = plain.implied_quote(&curve).unwrap();
        let r = rate_quoted.implied_quote(&curve).unwrap();
        assert_abs_diff_eq!(p, 100.0 * (1.0 - r), epsilon = 1e-12);
        assert_abs_diff_eq!(adjusted.implied_quote(&curve).unwrap(), p - 0.05, epsilon = 1e-12);
    }

    #[test]
    fn single_curve_swap_telescopes() {
        let reference = date(2025, 1, 15);
        let data = flat_data(0.03);
        let curve = BootstrapCurve::new(reference, DayCounter::Actual365Fixed, &data);
        let helper = SwapRateHelper::from_tenor(
            SimpleQuote::shared(0.03),
            reference,
            0,
            Period::years(5),
            SwapConventions::default(),
        )
        .unwrap();
        let mut annuity = 0.0;
        for (s, e) in helper.fixed_schedule().periods() {
            annuity += DayCounter::Thirty360.year_fraction(s, e) * curve.discount_date(e).unwrap();
        }
        let expected = (1.0 - curve.discount_date(helper.maturity_date()).unwrap()) / annuity;
        assert_abs_diff_eq!(helper.implied_quote(&curve).unwrap(), expected, epsilon = 1e-13);
        assert_eq!(helper.observables().len(), 1);
    }

    #[test]
    fn empty_external_handle_is_a_calibration_error() {
        let reference = date(2025, 1, 15);
        let data = flat_data(0.03);
        let curve = BootstrapCurve::new(reference, DayCounter::Actual365Fixed, &data);
        let helper = SwapRateHelper::from_tenor(
            SimpleQuote::shared(0.03),
            reference,
            0,
            Period::years(2),
            SwapConventions::default(),
        )
        .unwrap()
        .with_discount_curve(Handle::empty());
        assert!(matches!(helper.implied_quote(&curve), Err(Error::Calibration(_))));
        assert_eq!(helper.observables().len(), 2);
    }
}
