//! Joint solving of curves that read each other.
//!
//! A projection curve whose swaps discount on an OIS curve, which in turn
//! reads the projection curve through a basis instrument, has no
//! pillar-by-pillar order. The group solves such curves together: each
//! outer iteration re-bootstraps every member against the latest working
//! state of the others, until no node moves by more than the accuracy.
//!
//! Members delegate their lazy calculation to the group, so querying any
//! member solves all of them. While the group iterates, a member read
//! through a handle serves its working nodes instead of recursing.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use pillar_core::errors::{BootstrapFailure, Result};
use pillar_core::{CurveState, LazyObject, Real, RelinkableHandle};

use crate::piecewise_yield_curve::PiecewiseYieldCurve;
use crate::yield_term_structure::YieldTermStructure;

/// Settings of the outer fixed-point iteration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiCurveConfig {
    /// Largest node change between two outer iterations that counts as
    /// converged.
    pub accuracy: Real,
    /// Outer iteration cap.
    pub max_iterations: usize,
}

impl Default for MultiCurveConfig {
    fn default() -> Self {
        Self {
            accuracy: 1.0e-10,
            max_iterations: 50,
        }
    }
}

impl MultiCurveConfig {
    /// Set the accuracy.
    pub fn with_accuracy(mut self, accuracy: Real) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

enum Member {
    Bootstrapped(Rc<PiecewiseYieldCurve>),
    // read by the others, never solved
    Derived(Rc<dyn YieldTermStructure>),
}

/// A set of mutually dependent curves solved to a joint fixed point.
pub struct MultiCurveGroup {
    config: MultiCurveConfig,
    members: RefCell<Vec<Member>>,
    running: Cell<bool>,
    iterations: Cell<usize>,
    me: Weak<MultiCurveGroup>,
}

impl MultiCurveGroup {
    /// An empty group.
    pub fn new(config: MultiCurveConfig) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            config,
            members: RefCell::new(Vec::new()),
            running: Cell::new(false),
            iterations: Cell::new(0),
            me: me.clone(),
        })
    }

    /// Build a curve with `factory`, make it a member and link `handle` to
    /// it.
    ///
    /// The handle is usually the one the other members' instruments already
    /// read, so the factory may build instruments on handles of curves that
    /// are added later.
    pub fn add_curve<F>(
        &self,
        handle: &RelinkableHandle<dyn YieldTermStructure>,
        factory: F,
    ) -> Result<Rc<PiecewiseYieldCurve>>
    where
        F: FnOnce() -> Result<Rc<PiecewiseYieldCurve>>,
    {
        let curve = factory()?;
        curve.join_group(self.me.clone())?;
        self.members
            .borrow_mut()
            .push(Member::Bootstrapped(Rc::clone(&curve)));
        let target: Rc<dyn YieldTermStructure> = curve.clone();
        handle.link_to(target);
        Ok(curve)
    }

    /// Link `handle` to a curve the group does not solve, such as a spreaded
    /// view of a member.
    pub fn add_derived(
        &self,
        handle: &RelinkableHandle<dyn YieldTermStructure>,
        curve: Rc<dyn YieldTermStructure>,
    ) {
        self.members
            .borrow_mut()
            .push(Member::Derived(Rc::clone(&curve)));
        handle.link_to(curve);
    }

    /// The bootstrapped members, in the order they were added.
    pub fn curves(&self) -> Vec<Rc<PiecewiseYieldCurve>> {
        self.members
            .borrow()
            .iter()
            .filter_map(|m| match m {
                Member::Bootstrapped(curve) => Some(Rc::clone(curve)),
                Member::Derived(_) => None,
            })
            .collect()
    }

    /// Number of members, derived ones included.
    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    /// `true` when the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Settings of the outer iteration.
    pub fn config(&self) -> &MultiCurveConfig {
        &self.config
    }

    /// Outer iterations used by the last successful solve.
    pub fn iterations(&self) -> usize {
        self.iterations.get()
    }

    /// Solve every member. Does nothing when all members are up to date.
    ///
    /// On failure no member commits: each keeps its previous nodes and
    /// stays stale.
    pub fn solve(&self) -> Result<()> {
        if self.running.get() {
            return Ok(());
        }
        let curves = self.curves();
        if curves.iter().all(|c| c.is_calculated()) {
            return Ok(());
        }

        self.running.set(true);
        let result = self.iterate(&curves);
        self.running.set(false);

        match result {
            Ok(iterations) => {
                for curve in &curves {
                    curve.commit_working();
                    curve.lazy_state().set(CurveState::Clean);
                }
                self.iterations.set(iterations);
                debug!(curves = curves.len(), iterations, "multi-curve group solved");
                Ok(())
            }
            Err(error) => {
                for curve in &curves {
                    curve.set_working(None);
                    curve.lazy_state().set(CurveState::Stale);
                }
                warn!(%error, "multi-curve group failed, members keep their last valid nodes");
                Err(error)
            }
        }
    }

    fn iterate(&self, curves: &[Rc<PiecewiseYieldCurve>]) -> Result<usize> {
        let mut warm = Vec::with_capacity(curves.len());
        for curve in curves {
            curve.lazy_state().set(CurveState::Solving);
            let start = match curve.committed() {
                Some(solution) => {
                    warm.push(true);
                    solution
                }
                None => {
                    warm.push(false);
                    curve.initial_solution()?
                }
            };
            curve.set_working(Some(start));
        }

        let accuracy = self.config.accuracy;
        let mut max_change = Real::INFINITY;
        let mut unstable = Vec::new();
        for iteration in 1..=self.config.max_iterations {
            max_change = 0.0;
            unstable.clear();
            for (curve, warm) in curves.iter().zip(warm.iter_mut()) {
                let previous = curve.working();
                let warm_start = if *warm { previous.as_ref() } else { None };
                let solution = curve.solve_pass(warm_start)?;
                let change = previous.map_or(Real::INFINITY, |p| solution.max_change(&p));
                trace!(curve = curve.name(), iteration, change, "member re-solved");
                curve.set_working(Some(solution));
                *warm = true;
                if !(change < accuracy) {
                    unstable.push(curve.name().to_string());
                }
                max_change = max_change.max(change);
            }
            debug!(iteration, max_change, unstable = unstable.len(), "multi-curve iteration");
            if unstable.is_empty() {
                return Ok(iteration);
            }
        }

        Err(BootstrapFailure::MultiCurve {
            iterations: self.config.max_iterations,
            max_change,
            unstable,
        }
        .into())
    }
}

impl fmt::Debug for MultiCurveGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.curves().iter().map(|c| c.name().to_string()).collect();
        f.debug_struct("MultiCurveGroup")
            .field("config", &self.config)
            .field("curves", &names)
            .field("members", &self.len())
            .field("iterations", &self.iterations.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_helpers::{DepositRateHelper, RateHelper};
    use crate::spreaded_curve::ZeroSpreadedCurve;
    use approx::assert_abs_diff_eq;
    use pillar_core::{Compounding, Error};
    use pillar_quotes::SimpleQuote;
    use pillar_time::{Date, DayCounter, Frequency, Period};

    fn today() -> Date {
        Date::from_ymd(2025, 1, 15).unwrap()
    }

    fn deposit_curve(name: &str, rate: Real) -> Result<Rc<PiecewiseYieldCurve>> {
        let helper = DepositRateHelper::from_tenor(
            SimpleQuote::shared(rate),
            today(),
            0,
            Period::months(6),
            DayCounter::Actual360,
        )?;
        PiecewiseYieldCurve::builder(today(), DayCounter::Actual365Fixed)
            .name(name)
            .build(vec![Rc::new(helper) as Rc<dyn RateHelper>])
    }

    #[test]
    fn uncoupled_member_converges_on_the_second_iteration() {
        let group = MultiCurveGroup::new(MultiCurveConfig::default());
        let handle = RelinkableHandle::<dyn YieldTermStructure>::empty();
        let curve = group.add_curve(&handle, || deposit_curve("ois", 0.03)).unwrap();

        let linked = handle.current().unwrap();
        assert!(linked.discount(0.25).unwrap() < 1.0);
        assert_eq!(group.iterations(), 2);
        assert_eq!(curve.solve_count(), 1);

        // a clean group does nothing
        group.solve().unwrap();
        assert_eq!(curve.solve_count(), 1);
    }

    #[test]
    fn derived_members_follow_the_solved_curve() {
        let group = MultiCurveGroup::new(MultiCurveConfig::default());
        let base = RelinkableHandle::<dyn YieldTermStructure>::empty();
        let spreaded = RelinkableHandle::<dyn YieldTermStructure>::empty();
        let curve = group.add_curve(&base, || deposit_curve("base", 0.03)).unwrap();
        group.add_derived(
            &spreaded,
            ZeroSpreadedCurve::new(base.handle(), SimpleQuote::shared(0.01)),
        );
        assert_eq!(group.len(), 2);
        assert_eq!(group.curves().len(), 1);

        let derived = spreaded.current().unwrap();
        let z = derived.zero_rate(0.4, Compounding::Continuous, Frequency::Annual).unwrap();
        let z_base = curve.zero_rate(0.4, Compounding::Continuous, Frequency::Annual).unwrap();
        assert_abs_diff_eq!(z.rate() - z_base.rate(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn a_curve_joins_one_group_only() {
        let first = MultiCurveGroup::new(MultiCurveConfig::default());
        let second = MultiCurveGroup::new(MultiCurveConfig::default());
        let handle = RelinkableHandle::<dyn YieldTermStructure>::empty();
        let curve = first.add_curve(&handle, || deposit_curve("ois", 0.03)).unwrap();
        let result = second.add_curve(&handle, || Ok(curve.clone()));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
