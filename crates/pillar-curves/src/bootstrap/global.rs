//! Joint least-squares bootstrap.
//!
//! All node values are unknowns of one problem, together with optional
//! extra nodes (at caller-chosen dates) and free variables. The residuals
//! are the repricing errors of the pillar instruments, then of any
//! additional helpers, then whatever the caller's additional-error closure
//! returns for the candidate curve. Levenberg–Marquardt drives every
//! residual below the accuracy in absolute value.
//!
//! Unknowns are bounded. Each one is optimized as an unconstrained `x` and
//! mapped into its bounds by `lo + (atan(x)/π + ½)·(hi − lo)`.

use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;

use nalgebra::DVector;
use tracing::{debug, warn};

use pillar_core::errors::{BootstrapFailure, Error, Result};
use pillar_core::{ensure_config, Real, Time};
use pillar_math::{CostFunction, EndCriteria, LevenbergMarquardt};
use pillar_time::Date;

use super::{snapshot_quotes, BootstrapConfig, CurveSpec, Solution};
use crate::bootstrap_curve::{BootstrapCurve, CurveData};
use crate::rate_helpers::RateHelper;

/// Caller-supplied residuals, evaluated on the candidate curve and the
/// current extra variables.
pub type AdditionalErrors = Rc<dyn Fn(&BootstrapCurve<'_>, &[Real]) -> Result<Vec<Real>>>;

/// A free variable solved jointly with the curve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtraVariable {
    /// Name used in diagnostics.
    pub name: String,
    /// Starting value.
    pub initial: Real,
    /// Lower bound.
    pub lower: Real,
    /// Upper bound.
    pub upper: Real,
}

impl ExtraVariable {
    /// A variable starting at `initial` within `[lower, upper]`.
    pub fn new(name: impl Into<String>, initial: Real, lower: Real, upper: Real) -> Self {
        Self {
            name: name.into(),
            initial,
            lower,
            upper,
        }
    }
}

/// Settings of a joint bootstrap.
#[derive(Clone, Default)]
pub struct GlobalBootstrap {
    config: BootstrapConfig,
    extra_dates: Vec<Date>,
    extra_variables: Vec<ExtraVariable>,
    additional_helpers: Vec<Rc<dyn RateHelper>>,
    additional_errors: Option<AdditionalErrors>,
}

impl GlobalBootstrap {
    /// A joint bootstrap with default accuracy and no extras.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the accuracy and bound settings. `max_iterations` caps the
    /// optimizer.
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// Add nodes at `dates`, solved jointly with the pillars. Dates on or
    /// before the reference date, or equal to a pillar, are ignored.
    pub fn with_extra_dates(mut self, dates: impl IntoIterator<Item = Date>) -> Self {
        self.extra_dates.extend(dates);
        self
    }

    /// Add a free variable.
    pub fn with_extra_variable(mut self, variable: ExtraVariable) -> Self {
        self.extra_variables.push(variable);
        self
    }

    /// Add helpers that contribute residuals without anchoring a pillar.
    pub fn with_additional_helpers(
        mut self,
        helpers: impl IntoIterator<Item = Rc<dyn RateHelper>>,
    ) -> Self {
        self.additional_helpers.extend(helpers);
        self
    }

    /// Add caller-defined residuals.
    pub fn with_additional_errors<F>(mut self, errors: F) -> Self
    where
        F: Fn(&BootstrapCurve<'_>, &[Real]) -> Result<Vec<Real>> + 'static,
    {
        self.additional_errors = Some(Rc::new(errors));
        self
    }

    /// Accuracy and bound settings.
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Requested extra node dates, as given.
    pub fn extra_dates(&self) -> &[Date] {
        &self.extra_dates
    }

    /// Free variables.
    pub fn extra_variables(&self) -> &[ExtraVariable] {
        &self.extra_variables
    }

    /// Non-pillar helpers.
    pub fn additional_helpers(&self) -> &[Rc<dyn RateHelper>] {
        &self.additional_helpers
    }
}

impl fmt::Debug for GlobalBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalBootstrap")
            .field("config", &self.config)
            .field("extra_dates", &self.extra_dates)
            .field("extra_variables", &self.extra_variables)
            .field("additional_helpers", &self.additional_helpers.len())
            .field("additional_errors", &self.additional_errors.is_some())
            .finish()
    }
}

// ── Solve ─────────────────────────────────────────────────────────────────────

/// Solve every node of the curve (and the extra variables) jointly.
pub(crate) fn solve(
    spec: &CurveSpec<'_>,
    helpers: &[Rc<dyn RateHelper>],
    global: &GlobalBootstrap,
    previous: Option<&Solution>,
) -> Result<Solution> {
    let config = &global.config;
    let quotes = snapshot_quotes(helpers)?;
    let additional_quotes = snapshot_quotes(&global.additional_helpers)?;

    let mut dates: Vec<Date> = helpers.iter().map(|h| h.pillar_date()).collect();
    let mut extra_dates: Vec<Date> = global
        .extra_dates
        .iter()
        .copied()
        .filter(|d| *d > spec.reference_date && !dates.contains(d))
        .collect();
    extra_dates.sort();
    extra_dates.dedup();
    dates.extend(extra_dates);
    dates.push(spec.reference_date);
    dates.sort();
    let times = spec.times(&dates)?;
    let nodes = dates.len() - 1;

    let mut bounds: Vec<(Real, Real)> = times[1..]
        .iter()
        .map(|&t| config.bounds(spec.curve_trait.global_bounds(t)))
        .collect();
    for variable in &global.extra_variables {
        ensure_config!(
            variable.lower < variable.upper,
            "extra variable '{}' has empty bounds [{}, {}]",
            variable.name,
            variable.lower,
            variable.upper
        );
        bounds.push((variable.lower, variable.upper));
    }
    if let Some(&(lo, hi)) = bounds.iter().find(|(lo, hi)| lo >= hi) {
        return Err(Error::Configuration(format!("empty node bounds [{lo}, {hi}]")));
    }

    let warm = previous.map(|p| &p.data);
    let start: Vec<Real> = times[1..]
        .iter()
        .map(|&t| match warm {
            Some(data) => data.native_value(t),
            None => spec.curve_trait.flat_guess(t),
        })
        .chain(global.extra_variables.iter().map(|v| v.initial))
        .zip(&bounds)
        .map(|(y, &(lo, hi))| to_unconstrained(y, lo, hi))
        .collect();
    let start = DVector::from_vec(start);

    let residuals = Residuals {
        spec,
        times: &times,
        bounds: &bounds,
        nodes,
        helpers,
        quotes: &quotes,
        additional_helpers: &global.additional_helpers,
        additional_quotes: &additional_quotes,
        additional_errors: global.additional_errors.as_ref(),
    };
    let residual_count = residuals.values(&start)?.len();
    ensure_config!(
        residual_count >= start.len(),
        "curve '{}': {residual_count} residuals cannot determine {} unknowns",
        spec.name,
        start.len()
    );

    // an rms of accuracy/√n bounds every single residual by accuracy
    let end_criteria = EndCriteria::new(
        config.max_iterations,
        EndCriteria::default().max_stationary_state_iterations,
        config.accuracy / (residual_count as Real).sqrt(),
        Real::EPSILON,
        0.0,
    );
    let result = LevenbergMarquardt::default().minimize(&residuals, start, &end_criteria)?;
    let rms = result.rms();
    let max_error = result.residuals.amax();
    debug!(
        curve = spec.name,
        unknowns = result.x.len(),
        residuals = residual_count,
        iterations = result.iterations,
        rms,
        max_error,
        end = ?result.end_type,
        "global bootstrap done"
    );
    if !(max_error <= config.accuracy) {
        warn!(
            curve = spec.name,
            max_error,
            rms,
            accuracy = config.accuracy,
            "global bootstrap did not converge"
        );
        return Err(BootstrapFailure::Global {
            max_error,
            rms,
            accuracy: config.accuracy,
            iterations: result.iterations,
        }
        .into());
    }

    let (data, extra_variables) = residuals.state(&result.x)?;
    Ok(Solution {
        dates,
        data,
        extra_variables,
    })
}

fn to_constrained(x: Real, lo: Real, hi: Real) -> Real {
    lo + (x.atan() / PI + 0.5) * (hi - lo)
}

fn to_unconstrained(y: Real, lo: Real, hi: Real) -> Real {
    let p = ((y - lo) / (hi - lo)).clamp(1e-8, 1.0 - 1e-8);
    (PI * (p - 0.5)).tan()
}

struct Residuals<'a> {
    spec: &'a CurveSpec<'a>,
    times: &'a [Time],
    bounds: &'a [(Real, Real)],
    nodes: usize,
    helpers: &'a [Rc<dyn RateHelper>],
    quotes: &'a [Real],
    additional_helpers: &'a [Rc<dyn RateHelper>],
    additional_quotes: &'a [Real],
    additional_errors: Option<&'a AdditionalErrors>,
}

impl Residuals<'_> {
    /// Curve nodes and extra variables for the unconstrained vector `x`.
    fn state(&self, x: &DVector<Real>) -> Result<(CurveData, Vec<Real>)> {
        let curve_trait = self.spec.curve_trait;
        let mapped: Vec<Real> = x
            .iter()
            .zip(self.bounds)
            .map(|(&x, &(lo, hi))| to_constrained(x, lo, hi))
            .collect();
        let (node_values, extra) = mapped.split_at(self.nodes);

        let mut values = Vec::with_capacity(self.nodes + 1);
        values.push(if curve_trait.mirrors_seed() {
            node_values[0]
        } else {
            curve_trait.initial_value()
        });
        values.extend_from_slice(node_values);
        let data = CurveData::new(curve_trait, self.spec.interpolator, self.times, &values)?;
        Ok((data, extra.to_vec()))
    }
}

impl CostFunction for Residuals<'_> {
    fn values(&self, x: &DVector<Real>) -> Result<DVector<Real>> {
        let (data, extra) = self.state(x)?;
        let curve = BootstrapCurve::new(self.spec.reference_date, self.spec.day_counter, &data);
        let mut residuals = Vec::with_capacity(self.helpers.len() + self.additional_helpers.len());
        let pairs = self
            .helpers
            .iter()
            .zip(self.quotes)
            .chain(self.additional_helpers.iter().zip(self.additional_quotes));
        for (helper, quote) in pairs {
            residuals.push(helper.implied_quote(&curve)? - quote);
        }
        if let Some(errors) = self.additional_errors {
            residuals.extend(errors(&curve, &extra)?);
        }
        Ok(DVector::from_vec(residuals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bound_transform_round_trips_inside_the_bounds() {
        for (y, lo, hi) in [(0.03, -1.0, 1.0), (0.97, 0.5, 2.0), (0.2, 0.0, 0.25)] {
            let x = to_unconstrained(y, lo, hi);
            assert_abs_diff_eq!(to_constrained(x, lo, hi), y, epsilon = 1e-14);
        }
        assert!(to_constrained(1e12, -1.0, 1.0) <= 1.0);
        assert!(to_constrained(-1e12, -1.0, 1.0) >= -1.0);
    }

    #[test]
    fn extra_variable_builder() {
        let global = GlobalBootstrap::new()
            .with_extra_variable(ExtraVariable::new("basis", 0.0, -0.01, 0.01))
            .with_extra_dates([Date::from_ymd(2026, 1, 2).unwrap()]);
        assert_eq!(global.extra_variables()[0].name, "basis");
        assert_eq!(global.extra_dates().len(), 1);
        assert!(format!("{global:?}").contains("additional_errors: false"));
    }
}
