//! Bootstrap configuration and the shared preparation of a pass.
//!
//! Two strategies solve a curve's pillars from its instruments:
//!
//! * [`iterative`]: one pillar at a time in maturity order, with a bracketing
//!   root finder and a retry policy that widens the bracket.
//! * [`global`]: every pillar (plus optional extra nodes and free
//!   variables) at once, by least squares on the repricing errors.
//!
//! Both start from the same prepared input: instruments sorted by pillar
//! date, checked for expired or duplicated pillars, and their quotes read
//! once for the whole pass.

use std::rc::Rc;

use pillar_core::errors::{ordinal, Error, Result};
use pillar_core::{ensure_config, Real, Time};
use pillar_math::Interpolator;
use pillar_time::{Date, DayCounter};

use crate::bootstrap_curve::CurveData;
use crate::rate_helpers::RateHelper;
use crate::traits::CurveTrait;

pub mod global;
pub mod iterative;

pub use global::{AdditionalErrors, ExtraVariable, GlobalBootstrap};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Accuracy, bracket and iteration settings of a bootstrap.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BootstrapConfig {
    /// Largest repricing error accepted per instrument, and in a global
    /// bootstrap per residual.
    pub accuracy: Real,
    /// Lower bound on pillar values, overriding the curve trait's default.
    pub min_value: Option<Real>,
    /// Upper bound on pillar values, overriding the curve trait's default.
    pub max_value: Option<Real>,
    /// Retries per pillar after the first failed attempt.
    pub max_attempts: usize,
    /// Factor by which each retry scales the bracket about its centre. Rate
    /// brackets may cross zero this way; discount-factor brackets keep a
    /// positive lower end.
    pub widening_factor: Real,
    /// Sweep cap for global interpolations (iterative) or optimizer
    /// iteration cap (global).
    pub max_iterations: usize,
    /// Objective evaluations allowed per root search.
    pub max_evaluations: usize,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            accuracy: 1.0e-12,
            min_value: None,
            max_value: None,
            max_attempts: 1,
            widening_factor: 2.0,
            max_iterations: 100,
            max_evaluations: 100,
        }
    }
}

impl BootstrapConfig {
    /// Set the accuracy.
    pub fn with_accuracy(mut self, accuracy: Real) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Override the lower bound on pillar values.
    pub fn with_min_value(mut self, min_value: Real) -> Self {
        self.min_value = Some(min_value);
        self
    }

    /// Override the upper bound on pillar values.
    pub fn with_max_value(mut self, max_value: Real) -> Self {
        self.max_value = Some(max_value);
        self
    }

    /// Set the number of retries per pillar.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the bracket widening factor.
    pub fn with_widening_factor(mut self, factor: Real) -> Self {
        self.widening_factor = factor;
        self
    }

    /// Set the sweep or optimizer iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the evaluation budget of each root search.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_config!(
            self.accuracy > 0.0,
            "bootstrap accuracy must be positive, got {}",
            self.accuracy
        );
        ensure_config!(
            self.widening_factor > 1.0,
            "widening factor must exceed one, got {}",
            self.widening_factor
        );
        if let (Some(lo), Some(hi)) = (self.min_value, self.max_value) {
            ensure_config!(lo < hi, "min value {lo} is not below max value {hi}");
        }
        Ok(())
    }

    /// Apply the configured overrides to a trait-supplied bracket.
    pub(crate) fn bounds(&self, (lo, hi): (Real, Real)) -> (Real, Real) {
        (self.min_value.unwrap_or(lo), self.max_value.unwrap_or(hi))
    }
}

/// The strategy a piecewise curve is solved with.
#[derive(Debug, Clone)]
pub enum Bootstrap {
    /// Pillar-by-pillar root finding.
    Iterative(BootstrapConfig),
    /// Joint least-squares solve.
    Global(GlobalBootstrap),
}

impl Default for Bootstrap {
    fn default() -> Self {
        Bootstrap::Iterative(BootstrapConfig::default())
    }
}

impl From<BootstrapConfig> for Bootstrap {
    fn from(config: BootstrapConfig) -> Self {
        Bootstrap::Iterative(config)
    }
}

impl From<GlobalBootstrap> for Bootstrap {
    fn from(global: GlobalBootstrap) -> Self {
        Bootstrap::Global(global)
    }
}

impl Bootstrap {
    /// Accuracy and bracket settings.
    pub fn config(&self) -> &BootstrapConfig {
        match self {
            Bootstrap::Iterative(config) => config,
            Bootstrap::Global(global) => global.config(),
        }
    }

    /// Helpers that add residuals without anchoring pillars.
    pub fn additional_helpers(&self) -> &[Rc<dyn RateHelper>] {
        match self {
            Bootstrap::Iterative(_) => &[],
            Bootstrap::Global(global) => global.additional_helpers(),
        }
    }

    /// Latest extra node date, if any.
    pub(crate) fn last_extra_date(&self) -> Option<Date> {
        match self {
            Bootstrap::Iterative(_) => None,
            Bootstrap::Global(global) => global.extra_dates().iter().copied().max(),
        }
    }
}

// ── Pass input and output ─────────────────────────────────────────────────────

/// Static description of the curve a pass solves.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CurveSpec<'a> {
    pub name: &'a str,
    pub reference_date: Date,
    pub day_counter: DayCounter,
    pub curve_trait: CurveTrait,
    pub interpolator: Interpolator,
}

impl CurveSpec<'_> {
    pub fn time(&self, date: Date) -> Time {
        self.day_counter.year_fraction(self.reference_date, date)
    }

    /// Node times for `dates`, which must map to strictly increasing times.
    pub fn times(&self, dates: &[Date]) -> Result<Vec<Time>> {
        let times: Vec<Time> = dates.iter().map(|&d| self.time(d)).collect();
        if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::Configuration(format!(
                "curve '{}': dates {} and {} map to non-increasing times under {}",
                self.name,
                dates[i],
                dates[i + 1],
                self.day_counter
            )));
        }
        Ok(times)
    }
}

/// A committed or working curve state.
#[derive(Debug, Clone)]
pub(crate) struct Solution {
    pub dates: Vec<Date>,
    pub data: CurveData,
    pub extra_variables: Vec<Real>,
}

impl Solution {
    /// Largest node change against `other`; infinite when the node sets
    /// differ.
    pub fn max_change(&self, other: &Solution) -> Real {
        if self.dates != other.dates || self.extra_variables.len() != other.extra_variables.len() {
            return Real::INFINITY;
        }
        self.data
            .values()
            .iter()
            .zip(other.data.values())
            .chain(self.extra_variables.iter().zip(&other.extra_variables))
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, Real::max)
    }
}

/// Sort instruments by pillar date (stable) and reject expired or
/// duplicated pillars.
pub(crate) fn prepare_instruments(
    spec: &CurveSpec<'_>,
    instruments: &[Rc<dyn RateHelper>],
) -> Result<Vec<Rc<dyn RateHelper>>> {
    ensure_config!(!instruments.is_empty(), "curve '{}' has no instruments", spec.name);
    let mut sorted = instruments.to_vec();
    sorted.sort_by_key(|h| h.pillar_date());

    for (i, helper) in sorted.iter().enumerate() {
        let pillar = helper.pillar_date();
        ensure_config!(
            pillar > spec.reference_date,
            "curve '{}': {} instrument ({}) has pillar {pillar} on or before the reference date {}",
            spec.name,
            ordinal(i + 1),
            helper.description(),
            spec.reference_date
        );
        if i > 0 {
            let previous = &sorted[i - 1];
            ensure_config!(
                previous.pillar_date() != pillar,
                "curve '{}': {} and {} instruments ({}, {}) share the pillar date {pillar}",
                spec.name,
                ordinal(i),
                ordinal(i + 1),
                previous.description(),
                helper.description()
            );
        }
    }
    Ok(sorted)
}

/// Read every quote once.
pub(crate) fn snapshot_quotes(helpers: &[Rc<dyn RateHelper>]) -> Result<Vec<Real>> {
    helpers.iter().map(|h| h.quote_value()).collect()
}

/// Run one full pass of `bootstrap` for the curve described by `spec`.
pub(crate) fn solve(
    spec: &CurveSpec<'_>,
    instruments: &[Rc<dyn RateHelper>],
    bootstrap: &Bootstrap,
    previous: Option<&Solution>,
) -> Result<Solution> {
    spec.curve_trait.check_interpolator(spec.interpolator)?;
    bootstrap.config().validate()?;
    let helpers = prepare_instruments(spec, instruments)?;
    match bootstrap {
        Bootstrap::Iterative(config) => iterative::solve(spec, &helpers, config, previous),
        Bootstrap::Global(global) => global::solve(spec, &helpers, global, previous),
    }
}
