//! Market data and helpers shared by the curve integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use pillar_core::errors::{Error, Result};
use pillar_core::{Handle, Observable, Real};
use pillar_curves::{
    BootstrapCurve, DepositRateHelper, PiecewiseYieldCurve, RateHelper, SwapConventions,
    SwapRateHelper, YieldTermStructure,
};
use pillar_quotes::{Quote, SimpleQuote};
use pillar_time::{Date, DayCounter, Period};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness; `RUST_LOG` picks the level.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

pub fn today() -> Date {
    date(2025, 1, 15)
}

pub const CURVE_DAY_COUNTER: DayCounter = DayCounter::Actual365Fixed;

pub const DEPOSITS: [(i32, Real); 3] = [(1, 0.0300), (3, 0.0310), (6, 0.0315)];
pub const SWAPS: [(i32, Real); 5] = [
    (2, 0.0320),
    (3, 0.0330),
    (5, 0.0350),
    (7, 0.0360),
    (10, 0.0380),
];

pub fn deposit(quote: &Rc<SimpleQuote>, months: i32) -> Rc<dyn RateHelper> {
    let helper = DepositRateHelper::from_tenor(
        quote.clone(),
        today(),
        0,
        Period::months(months),
        DayCounter::Actual360,
    )
    .unwrap();
    Rc::new(helper)
}

pub fn swap(quote: &Rc<SimpleQuote>, years: i32) -> SwapRateHelper {
    SwapRateHelper::from_tenor(
        quote.clone(),
        today(),
        0,
        Period::years(years),
        SwapConventions::default(),
    )
    .unwrap()
}

/// Quotes and helpers of the standard deposit and swap strip.
pub struct Market {
    pub quotes: Vec<Rc<SimpleQuote>>,
    pub helpers: Vec<Rc<dyn RateHelper>>,
}

impl Market {
    pub fn new() -> Self {
        Self::with_discount_curve(None)
    }

    /// The strip, with swaps discounted on `discount` when given.
    pub fn with_discount_curve(discount: Option<Handle<dyn YieldTermStructure>>) -> Self {
        let mut quotes = Vec::new();
        let mut helpers: Vec<Rc<dyn RateHelper>> = Vec::new();
        for (months, rate) in DEPOSITS {
            let quote = SimpleQuote::shared(rate);
            helpers.push(deposit(&quote, months));
            quotes.push(quote);
        }
        for (years, rate) in SWAPS {
            let quote = SimpleQuote::shared(rate);
            let helper = match &discount {
                Some(handle) => swap(&quote, years).with_discount_curve(handle.clone()),
                None => swap(&quote, years),
            };
            helpers.push(Rc::new(helper));
            quotes.push(quote);
        }
        Self { quotes, helpers }
    }
}

/// Largest repricing error of `helpers` on the solved `curve`.
pub fn max_quote_error(curve: &PiecewiseYieldCurve, helpers: &[Rc<dyn RateHelper>]) -> Real {
    let data = curve.curve_data().unwrap();
    let view = BootstrapCurve::new(curve.reference_date(), curve.day_counter(), &data);
    helpers
        .iter()
        .map(|h| h.quote_error(&view).unwrap().abs())
        .fold(0.0, Real::max)
}

/// A deposit whose implied rate adds `weight` times the same-period rate
/// of another curve: `r_own + w · r_other`.
#[derive(Debug)]
pub struct CoupledDeposit {
    quote: Handle<dyn Quote>,
    start: Date,
    end: Date,
    other: Handle<dyn YieldTermStructure>,
    weight: Real,
}

impl CoupledDeposit {
    pub fn new(
        quote: Rc<dyn Quote>,
        months: i32,
        other: Handle<dyn YieldTermStructure>,
        weight: Real,
    ) -> Self {
        let start = today();
        Self {
            quote: Handle::new(quote),
            start,
            end: start.advance(Period::months(months)).unwrap(),
            other,
            weight,
        }
    }

    pub fn simple_rate(&self, discount: impl Fn(Date) -> Result<Real>) -> Result<Real> {
        let tau = DayCounter::Actual360.year_fraction(self.start, self.end);
        Ok((discount(self.start)? / discount(self.end)? - 1.0) / tau)
    }
}

impl RateHelper for CoupledDeposit {
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
        let other = self
            .other
            .current()
            .ok_or_else(|| Error::Calibration("empty coupled curve handle".into()))?;
        let own = self.simple_rate(|d| curve.discount_date(d))?;
        let theirs = self.simple_rate(|d| other.discount_date(d))?;
        Ok(own + self.weight * theirs)
    }

    fn observables(&self) -> Vec<Rc<dyn Observable>> {
        vec![self.quote.observable(), self.other.observable()]
    }

    fn description(&self) -> String {
        format!("coupled deposit to {}", self.end)
    }
}
