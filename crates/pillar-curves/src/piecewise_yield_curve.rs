//! `PiecewiseYieldCurve`: a curve bootstrapped from rate helpers.
//!
//! The curve is lazy. Construction only validates and subscribes to the
//! instruments' quotes and upstream handles; the first query solves the
//! pillars, later queries reuse them until a notification marks the curve
//! stale. A pass that fails leaves the last committed nodes in place (see
//! [`PiecewiseYieldCurve::last_valid`]) and the curve stale, so the next
//! query tries again.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use pillar_core::Compounding;
//! use pillar_curves::{DepositRateHelper, PiecewiseYieldCurve, RateHelper, YieldTermStructure};
//! use pillar_quotes::SimpleQuote;
//! use pillar_time::{Date, DayCounter, Frequency, Period};
//!
//! let today = Date::from_ymd(2025, 1, 15).unwrap();
//! let helpers: Vec<Rc<dyn RateHelper>> = [(3, 0.031), (6, 0.032), (12, 0.034)]
//!     .into_iter()
//!     .map(|(months, rate)| {
//!         let helper = DepositRateHelper::from_tenor(
//!             SimpleQuote::shared(rate),
//!             today,
//!             0,
//!             Period::months(months),
//!             DayCounter::Actual360,
//!         )
//!         .unwrap();
//!         Rc::new(helper) as Rc<dyn RateHelper>
//!     })
//!     .collect();
//!
//! let curve = PiecewiseYieldCurve::builder(today, DayCounter::Actual365Fixed)
//!     .name("deposits")
//!     .build(helpers)
//!     .unwrap();
//! let zero = curve.zero_rate(0.5, Compounding::Continuous, Frequency::Annual).unwrap();
//! assert!(zero.rate() > 0.03);
//! assert_eq!(curve.solve_count(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use pillar_core::errors::{Error, Result};
use pillar_core::{
    CurveState, DiscountFactor, LazyObject, LazyState, Observable, ObservableImpl, Observer, Rate,
    Real, Time,
};
use pillar_math::Interpolator;
use pillar_time::{Date, DayCounter};

use crate::bootstrap::{self, prepare_instruments, Bootstrap, CurveSpec, Solution};
use crate::bootstrap_curve::CurveData;
use crate::interpolated_curve::InterpolatedCurve;
use crate::multi_curve::MultiCurveGroup;
use crate::rate_helpers::RateHelper;
use crate::traits::CurveTrait;
use crate::yield_term_structure::YieldTermStructure;

// ── Builder ───────────────────────────────────────────────────────────────────

/// Builder for [`PiecewiseYieldCurve`].
#[derive(Debug, Clone)]
pub struct PiecewiseYieldCurveBuilder {
    reference_date: Date,
    day_counter: DayCounter,
    curve_trait: CurveTrait,
    interpolator: Option<Interpolator>,
    bootstrap: Bootstrap,
    name: Option<String>,
}

impl PiecewiseYieldCurveBuilder {
    /// The native quantity (default: discount factors).
    pub fn curve_trait(mut self, curve_trait: CurveTrait) -> Self {
        self.curve_trait = curve_trait;
        self
    }

    /// The interpolation scheme (default: log-linear on discount factors,
    /// linear otherwise).
    pub fn interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = Some(interpolator);
        self
    }

    /// The bootstrap strategy (default: iterative with default settings).
    pub fn bootstrap(mut self, bootstrap: impl Into<Bootstrap>) -> Self {
        self.bootstrap = bootstrap.into();
        self
    }

    /// A name used in diagnostics.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Validate the setup and create the curve. Nothing is solved yet.
    pub fn build(self, instruments: Vec<Rc<dyn RateHelper>>) -> Result<Rc<PiecewiseYieldCurve>> {
        let interpolator = self.interpolator.unwrap_or(match self.curve_trait {
            CurveTrait::Discount => Interpolator::LogLinear,
            _ => Interpolator::Linear,
        });
        let name = self
            .name
            .unwrap_or_else(|| format!("{} {}", interpolator, self.curve_trait));
        let spec = CurveSpec {
            name: &name,
            reference_date: self.reference_date,
            day_counter: self.day_counter,
            curve_trait: self.curve_trait,
            interpolator,
        };
        self.curve_trait.check_interpolator(interpolator)?;
        self.bootstrap.config().validate()?;
        prepare_instruments(&spec, &instruments)?;

        let curve = Rc::new_cyclic(|me| PiecewiseYieldCurve {
            name,
            reference_date: self.reference_date,
            day_counter: self.day_counter,
            curve_trait: self.curve_trait,
            interpolator,
            bootstrap: self.bootstrap,
            instruments: RefCell::new(Vec::new()),
            subscriptions: RefCell::new(Vec::new()),
            lazy: LazyState::new(),
            observable: ObservableImpl::new(),
            data: RefCell::new(None),
            working: RefCell::new(None),
            solve_count: Cell::new(0),
            extrapolation: Cell::new(false),
            group: RefCell::new(None),
            me: me.clone(),
        });
        curve.subscribe(instruments);
        Ok(curve)
    }
}

// ── Curve ─────────────────────────────────────────────────────────────────────

/// A yield curve whose nodes are solved so that every instrument reprices
/// to its quote.
pub struct PiecewiseYieldCurve {
    name: String,
    reference_date: Date,
    day_counter: DayCounter,
    curve_trait: CurveTrait,
    interpolator: Interpolator,
    bootstrap: Bootstrap,
    instruments: RefCell<Vec<Rc<dyn RateHelper>>>,
    subscriptions: RefCell<Vec<Rc<dyn Observable>>>,
    lazy: LazyState,
    observable: ObservableImpl,
    data: RefCell<Option<Solution>>,
    // set while a multi-curve group iterates; queries read it instead of
    // the committed data
    working: RefCell<Option<Solution>>,
    solve_count: Cell<usize>,
    extrapolation: Cell<bool>,
    group: RefCell<Option<Weak<MultiCurveGroup>>>,
    me: Weak<PiecewiseYieldCurve>,
}

impl PiecewiseYieldCurve {
    /// Start building a curve anchored at `reference_date`.
    pub fn builder(reference_date: Date, day_counter: DayCounter) -> PiecewiseYieldCurveBuilder {
        PiecewiseYieldCurveBuilder {
            reference_date,
            day_counter,
            curve_trait: CurveTrait::default(),
            interpolator: None,
            bootstrap: Bootstrap::default(),
            name: None,
        }
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The native quantity.
    pub fn curve_trait(&self) -> CurveTrait {
        self.curve_trait
    }

    /// The interpolation scheme.
    pub fn interpolator(&self) -> Interpolator {
        self.interpolator
    }

    /// The bootstrap strategy.
    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    /// The instruments, in the order they were given.
    pub fn instruments(&self) -> Vec<Rc<dyn RateHelper>> {
        self.instruments.borrow().clone()
    }

    /// Number of committed solves.
    pub fn solve_count(&self) -> usize {
        self.solve_count.get()
    }

    /// Current cache state.
    pub fn state(&self) -> CurveState {
        self.lazy.get()
    }

    /// Allow queries past the max date.
    pub fn enable_extrapolation(&self) {
        self.extrapolation.set(true);
    }

    /// Forbid queries past the max date.
    pub fn disable_extrapolation(&self) {
        self.extrapolation.set(false);
    }

    /// Node dates, starting with the reference date.
    pub fn dates(&self) -> Result<Vec<Date>> {
        self.with_solution(|s| s.dates.clone())
    }

    /// Node times.
    pub fn times(&self) -> Result<Vec<Time>> {
        self.with_solution(|s| s.data.times().to_vec())
    }

    /// Node values on the native scale.
    pub fn data(&self) -> Result<Vec<Real>> {
        self.with_solution(|s| s.data.values().to_vec())
    }

    /// `(date, value)` pairs.
    pub fn nodes(&self) -> Result<Vec<(Date, Real)>> {
        self.with_solution(|s| {
            s.dates
                .iter()
                .copied()
                .zip(s.data.values().iter().copied())
                .collect()
        })
    }

    /// The solved nodes with their interpolation, for pricing helpers
    /// against through a [`BootstrapCurve`](crate::BootstrapCurve).
    pub fn curve_data(&self) -> Result<CurveData> {
        self.with_solution(|s| s.data.clone())
    }

    /// Solved extra variables of a global bootstrap.
    pub fn extra_variables(&self) -> Result<Vec<Real>> {
        self.with_solution(|s| s.extra_variables.clone())
    }

    /// A snapshot of the last committed nodes, without solving.
    pub fn last_valid(&self) -> Option<InterpolatedCurve> {
        self.data.borrow().as_ref().map(|s| {
            InterpolatedCurve::from_parts(
                self.reference_date,
                self.day_counter,
                s.dates.clone(),
                s.data.clone(),
            )
        })
    }

    /// Replace the instrument set. The curve is re-solved on the next query.
    pub fn relink_instruments(&self, instruments: Vec<Rc<dyn RateHelper>>) -> Result<()> {
        prepare_instruments(&self.spec(), &instruments)?;
        let me = self.as_observer();
        for observable in self.subscriptions.take() {
            observable.unregister_observer(&me);
        }
        self.subscribe(instruments);
        if self.lazy.get() == CurveState::Clean {
            self.lazy.set(CurveState::Stale);
        }
        debug!(curve = %self.name, "instruments relinked");
        self.observable.notify();
        Ok(())
    }

    fn spec(&self) -> CurveSpec<'_> {
        CurveSpec {
            name: &self.name,
            reference_date: self.reference_date,
            day_counter: self.day_counter,
            curve_trait: self.curve_trait,
            interpolator: self.interpolator,
        }
    }

    fn as_observer(&self) -> Weak<dyn Observer> {
        let me: Weak<PiecewiseYieldCurve> = self.me.clone();
        me
    }

    fn subscribe(&self, instruments: Vec<Rc<dyn RateHelper>>) {
        let me = self.as_observer();
        let observables: Vec<Rc<dyn Observable>> = instruments
            .iter()
            .chain(self.bootstrap.additional_helpers())
            .flat_map(|h| h.observables())
            .collect();
        for observable in &observables {
            observable.register_observer(me.clone());
        }
        *self.subscriptions.borrow_mut() = observables;
        *self.instruments.borrow_mut() = instruments;
    }

    fn with_solution<R>(&self, f: impl FnOnce(&Solution) -> R) -> Result<R> {
        self.calculate()?;
        if let Some(working) = self.working.borrow().as_ref() {
            return Ok(f(working));
        }
        match self.data.borrow().as_ref() {
            Some(solution) => Ok(f(solution)),
            None => Err(Error::Calibration(format!("curve '{}' has not been solved", self.name))),
        }
    }

    fn group(&self) -> Option<Rc<MultiCurveGroup>> {
        self.group.borrow().as_ref().and_then(Weak::upgrade)
    }

    // ── Hooks for multi-curve groups ─────────────────────────────────────

    pub(crate) fn join_group(&self, group: Weak<MultiCurveGroup>) -> Result<()> {
        if self.group.borrow().is_some() {
            return Err(Error::Configuration(format!(
                "curve '{}' already belongs to a multi-curve group",
                self.name
            )));
        }
        *self.group.borrow_mut() = Some(group);
        if self.lazy.get() == CurveState::Clean {
            self.lazy.set(CurveState::Stale);
        }
        Ok(())
    }

    /// One bootstrap pass against the current state of everything else.
    pub(crate) fn solve_pass(&self, previous: Option<&Solution>) -> Result<Solution> {
        let instruments = self.instruments();
        bootstrap::solve(&self.spec(), &instruments, &self.bootstrap, previous)
    }

    pub(crate) fn committed(&self) -> Option<Solution> {
        self.data.borrow().clone()
    }

    pub(crate) fn working(&self) -> Option<Solution> {
        self.working.borrow().clone()
    }

    pub(crate) fn set_working(&self, solution: Option<Solution>) {
        *self.working.borrow_mut() = solution;
    }

    /// Make the working state the committed one.
    pub(crate) fn commit_working(&self) {
        if let Some(solution) = self.working.take() {
            *self.data.borrow_mut() = Some(solution);
            self.solve_count.set(self.solve_count.get() + 1);
        }
    }

    pub(crate) fn initial_solution(&self) -> Result<Solution> {
        let instruments = prepare_instruments(&self.spec(), &self.instruments())?;
        let mut dates = vec![self.reference_date];
        dates.extend(instruments.iter().map(|h| h.pillar_date()));
        let times = self.spec().times(&dates)?;
        let values: Vec<Real> = times.iter().map(|&t| self.curve_trait.flat_guess(t)).collect();
        Ok(Solution {
            dates,
            data: CurveData::new(self.curve_trait, self.interpolator, &times, &values)?,
            extra_variables: Vec::new(),
        })
    }
}

impl LazyObject for PiecewiseYieldCurve {
    fn perform_calculations(&self) -> Result<()> {
        if let Some(group) = self.group() {
            return group.solve();
        }
        let result = {
            let previous = self.data.borrow();
            self.solve_pass(previous.as_ref())
        };
        match result {
            Ok(solution) => {
                *self.data.borrow_mut() = Some(solution);
                self.solve_count.set(self.solve_count.get() + 1);
                debug!(curve = %self.name, solves = self.solve_count.get(), "curve solved");
                Ok(())
            }
            Err(error) => {
                warn!(curve = %self.name, %error, "bootstrap failed, keeping the last valid nodes");
                Err(error)
            }
        }
    }

    fn lazy_state(&self) -> &LazyState {
        &self.lazy
    }

    fn on_reentry(&self) -> Result<()> {
        if self.group().is_some() && self.working.borrow().is_some() {
            return Ok(());
        }
        Err(Error::Configuration(format!(
            "cyclic dependency: curve '{}' was queried while it was being solved",
            self.name
        )))
    }
}

impl Observer for PiecewiseYieldCurve {
    fn update(&self) {
        if self.invalidate() {
            self.observable.notify();
        }
    }
}

impl Observable for PiecewiseYieldCurve {
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

impl YieldTermStructure for PiecewiseYieldCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> DayCounter {
        self.day_counter
    }

    fn max_date(&self) -> Date {
        self.instruments
            .borrow()
            .iter()
            .chain(self.bootstrap.additional_helpers())
            .map(|h| h.latest_relevant_date())
            .chain(self.bootstrap.last_extra_date())
            .fold(self.reference_date, Date::max)
    }

    fn allows_extrapolation(&self) -> bool {
        self.extrapolation.get()
    }

    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        self.with_solution(|s| s.data.discount(t))
    }

    fn zero_rate_impl(&self, t: Time) -> Result<Rate> {
        self.with_solution(|s| s.data.zero_rate(t))
    }

    fn instantaneous_forward_impl(&self, t: Time) -> Result<Rate> {
        self.with_solution(|s| s.data.forward(t))
    }
}

impl fmt::Debug for PiecewiseYieldCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiecewiseYieldCurve")
            .field("name", &self.name)
            .field("reference_date", &self.reference_date)
            .field("curve_trait", &self.curve_trait)
            .field("interpolator", &self.interpolator)
            .field("instruments", &self.instruments.borrow().len())
            .field("state", &self.lazy.get())
            .field("solve_count", &self.solve_count.get())
            .finish()
    }
}
