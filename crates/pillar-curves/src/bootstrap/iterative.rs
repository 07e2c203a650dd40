//! Pillar-by-pillar bootstrap.
//!
//! Pillars are solved in maturity order. For pillar `i` the objective is
//! `implied_i(curve with node i = y) − quote_i`; earlier nodes are frozen
//! and later ones are not part of the curve yet. A failed root search is
//! retried with a widened bracket up to `max_attempts` times.
//!
//! With a global interpolation moving node `i` also moves the curve before
//! it, so after the first sweep the whole node set is re-solved sweep after
//! sweep until no pillar moves by more than the accuracy.

use std::rc::Rc;

use tracing::{debug, trace, warn};

use pillar_core::errors::{BootstrapFailure, Error, Result};
use pillar_core::{Real, Time};
use pillar_math::Brent;

use super::{snapshot_quotes, BootstrapConfig, CurveSpec, Solution};
use crate::bootstrap_curve::{BootstrapCurve, CurveData};
use crate::rate_helpers::RateHelper;
use crate::traits::CurveTrait;

/// Solve the pillars of `helpers` (sorted, validated) one at a time.
///
/// A warm-started pass that fails is repeated once from a cold start before
/// the failure is returned.
pub(crate) fn solve(
    spec: &CurveSpec<'_>,
    helpers: &[Rc<dyn RateHelper>],
    config: &BootstrapConfig,
    previous: Option<&Solution>,
) -> Result<Solution> {
    let quotes = snapshot_quotes(helpers)?;
    let mut dates = Vec::with_capacity(helpers.len() + 1);
    dates.push(spec.reference_date);
    dates.extend(helpers.iter().map(|h| h.pillar_date()));
    let times = spec.times(&dates)?;

    let pass = Pass {
        spec,
        helpers,
        quotes: &quotes,
        times: &times,
        config,
        brent: Brent::new(config.max_evaluations),
    };
    let data = match previous {
        Some(previous) => match pass.run(Some(&previous.data)) {
            Err(Error::Bootstrap(failure)) => {
                warn!(
                    curve = spec.name,
                    %failure,
                    "warm-started bootstrap failed, retrying from a cold start"
                );
                pass.run(None)?
            }
            other => other?,
        },
        None => pass.run(None)?,
    };
    debug!(curve = spec.name, pillars = helpers.len(), "iterative bootstrap done");
    Ok(Solution {
        dates,
        data,
        extra_variables: Vec::new(),
    })
}

struct Pass<'a> {
    spec: &'a CurveSpec<'a>,
    helpers: &'a [Rc<dyn RateHelper>],
    quotes: &'a [Real],
    times: &'a [Time],
    config: &'a BootstrapConfig,
    brent: Brent,
}

impl Pass<'_> {
    fn run(&self, warm: Option<&CurveData>) -> Result<CurveData> {
        let spec = self.spec;
        let (curve_trait, interpolator) = (spec.curve_trait, spec.interpolator);
        let n = self.helpers.len();
        let mirrors = curve_trait.mirrors_seed();
        let warm_values = warm.map(|w| w.values().to_vec());

        let mut values = vec![curve_trait.initial_value(); n + 1];
        let global = interpolator.is_global() && n > 1;
        let sweeps = if global {
            self.config.max_iterations.max(2)
        } else {
            1
        };

        for iteration in 1..=sweeps {
            let last_sweep = values.clone();
            // from the second sweep on, every node is in the curve
            let mut full = if iteration > 1 {
                Some(CurveData::new(curve_trait, interpolator, self.times, &values)?)
            } else {
                None
            };

            for i in 1..=n {
                let value = match full.as_mut() {
                    Some(data) => {
                        let bracket = self.bracket(i, &values, Some(&last_sweep));
                        self.solve_pillar(data, i, iteration, values[i], bracket)?
                    }
                    None => {
                        let guess = match warm {
                            Some(warm) => warm.native_value(self.times[i]),
                            None if i == 1 => curve_trait.first_guess(),
                            None => CurveData::new(
                                curve_trait,
                                interpolator,
                                &self.times[..i],
                                &values[..i],
                            )?
                            .native_value(self.times[i]),
                        };
                        values[i] = guess;
                        if i == 1 && mirrors {
                            values[0] = guess;
                        }
                        let mut data = CurveData::new(
                            curve_trait,
                            interpolator,
                            &self.times[..=i],
                            &values[..=i],
                        )?;
                        let bracket = self.bracket(i, &values, warm_values.as_deref());
                        self.solve_pillar(&mut data, i, iteration, guess, bracket)?
                    }
                };
                values[i] = value;
                if i == 1 && mirrors {
                    values[0] = value;
                }
                trace!(curve = spec.name, iteration, pillar = i, value, "pillar accepted");
            }

            if !global || iteration == 1 {
                continue;
            }
            let (worst, change) = values
                .iter()
                .zip(&last_sweep)
                .map(|(a, b)| (a - b).abs())
                .enumerate()
                .fold((0, 0.0), |best, (i, c)| if c > best.1 { (i, c) } else { best });
            debug!(curve = spec.name, iteration, change, "bootstrap sweep");
            if change < self.config.accuracy {
                break;
            }
            if iteration == sweeps {
                let helper = &self.helpers[worst.max(1) - 1];
                return Err(BootstrapFailure::Local {
                    iteration,
                    instrument: worst.max(1),
                    pillar: helper.pillar_date().to_string(),
                    description: helper.description(),
                    attempts: 1,
                    reason: format!(
                        "convergence not reached after {sweeps} sweeps: last change {change:e}, \
                         required accuracy {:e}",
                        self.config.accuracy
                    ),
                }
                .into());
            }
        }
        CurveData::new(curve_trait, interpolator, self.times, &values)
    }

    fn bracket(&self, i: usize, values: &[Real], valid: Option<&[Real]>) -> (Real, Real) {
        let curve_trait = self.spec.curve_trait;
        self.config.bounds((
            curve_trait.min_value_after(i, values, self.times, valid),
            curve_trait.max_value_after(i, values, self.times, valid),
        ))
    }

    fn solve_pillar(
        &self,
        data: &mut CurveData,
        i: usize,
        iteration: usize,
        guess: Real,
        (mut lo, mut hi): (Real, Real),
    ) -> Result<Real> {
        let spec = self.spec;
        let helper = &self.helpers[i - 1];
        let quote = self.quotes[i - 1];
        let accuracy = self.config.accuracy;
        let factor = self.config.widening_factor;
        let mut reason = String::new();

        for attempt in 0..=self.config.max_attempts {
            if attempt > 0 {
                (lo, hi) = widen(spec.curve_trait, lo, hi, factor);
                warn!(
                    curve = spec.name,
                    instrument = i,
                    attempt,
                    min = lo,
                    max = hi,
                    %reason,
                    "widening the bootstrap bracket"
                );
            }
            let objective = |y: Real| -> Result<Real> {
                data.update(i, y)?;
                let curve = BootstrapCurve::new(spec.reference_date, spec.day_counter, data);
                Ok(helper.implied_quote(&curve)? - quote)
            };
            match self.brent.solve(objective, accuracy, guess, lo, hi) {
                Ok(root) if root.value.abs() <= accuracy => {
                    data.update(i, root.x)?;
                    return Ok(root.x);
                }
                Ok(root) => {
                    reason = format!(
                        "solver stopped at {} with repricing error {:e}",
                        root.x, root.value
                    );
                }
                Err(Error::RootNotFound(message) | Error::Precondition(message)) => {
                    reason = message;
                }
                Err(e) => return Err(e),
            }
        }

        Err(BootstrapFailure::Local {
            iteration,
            instrument: i,
            pillar: helper.pillar_date().to_string(),
            description: helper.description(),
            attempts: self.config.max_attempts + 1,
            reason,
        }
        .into())
    }
}

/// Scale the bracket by `factor` about its centre. Rate brackets may cross
/// zero; a discount-factor bracket keeps a positive lower end.
fn widen(curve_trait: CurveTrait, lo: Real, hi: Real, factor: Real) -> (Real, Real) {
    let centre = 0.5 * (lo + hi);
    let half = 0.5 * factor * (hi - lo);
    let (mut new_lo, new_hi) = (centre - half, centre + half);
    if curve_trait == CurveTrait::Discount && new_lo <= 0.0 {
        new_lo = lo / factor;
    }
    (new_lo, new_hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::prepare_instruments;
    use crate::rate_helpers::DepositRateHelper;
    use approx::assert_abs_diff_eq;
    use pillar_math::Interpolator;
    use pillar_quotes::SimpleQuote;
    use pillar_time::{Date, DayCounter, Period};

    fn spec(curve_trait: CurveTrait, interpolator: Interpolator) -> CurveSpec<'static> {
        CurveSpec {
            name: "test",
            reference_date: Date::from_ymd(2025, 1, 15).unwrap(),
            day_counter: DayCounter::Actual365Fixed,
            curve_trait,
            interpolator,
        }
    }

    fn deposits(spec: &CurveSpec<'_>, rates: &[(i32, Real)]) -> Vec<Rc<dyn RateHelper>> {
        rates
            .iter()
            .map(|&(months, r)| {
                Rc::new(
                    DepositRateHelper::from_tenor(
                        SimpleQuote::shared(r),
                        spec.reference_date,
                        0,
                        Period::months(months),
                        DayCounter::Actual360,
                    )
                    .unwrap(),
                ) as Rc<dyn RateHelper>
            })
            .collect()
    }

    #[test]
    fn deposits_reprice_on_every_trait() {
        for (curve_trait, interpolator) in [
            (CurveTrait::Discount, Interpolator::LogLinear),
            (CurveTrait::ZeroYield, Interpolator::Linear),
            (CurveTrait::ForwardRate, Interpolator::BackwardFlat),
        ] {
            let spec = spec(curve_trait, interpolator);
            let helpers = deposits(&spec, &[(1, 0.030), (3, 0.032), (6, 0.033), (12, 0.035)]);
            let helpers = prepare_instruments(&spec, &helpers).unwrap();
            let solution = solve(&spec, &helpers, &BootstrapConfig::default(), None).unwrap();
            let curve = BootstrapCurve::new(spec.reference_date, spec.day_counter, &solution.data);
            for helper in &helpers {
                assert_abs_diff_eq!(helper.quote_error(&curve).unwrap(), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn exhausted_retries_name_the_instrument() {
        let spec = spec(CurveTrait::ZeroYield, Interpolator::Linear);
        let helpers = deposits(&spec, &[(6, 0.02), (12, 0.12)]);
        let config = BootstrapConfig::default()
            .with_min_value(-0.05)
            .with_max_value(0.05)
            .with_max_attempts(0);
        let err = solve(&spec, &helpers, &config, None).unwrap_err();
        match err {
            Error::Bootstrap(BootstrapFailure::Local {
                instrument,
                attempts,
                ..
            }) => {
                assert_eq!(instrument, 2);
                assert_eq!(attempts, 1);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn widening_crosses_zero_on_rate_traits() {
        let (lo, hi) = widen(CurveTrait::ZeroYield, 0.0, 0.05, 2.0);
        assert_abs_diff_eq!(lo, -0.025, epsilon = 1e-15);
        assert_abs_diff_eq!(hi, 0.075, epsilon = 1e-15);

        let (lo, hi) = widen(CurveTrait::Discount, 0.5, 1.5, 2.0);
        assert_abs_diff_eq!(lo, 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(hi, 2.0, epsilon = 1e-15);
    }

    #[test]
    fn negative_rates_are_reached_from_a_non_negative_bracket() {
        let spec = spec(CurveTrait::ZeroYield, Interpolator::Linear);
        let helpers = deposits(&spec, &[(12, -0.005)]);
        let bounded = BootstrapConfig::default().with_min_value(0.0).with_max_value(0.05);

        let strict = bounded.clone().with_max_attempts(0);
        assert!(matches!(
            solve(&spec, &helpers, &strict, None),
            Err(Error::Bootstrap(BootstrapFailure::Local { .. }))
        ));

        let solution = solve(&spec, &helpers, &bounded.with_max_attempts(1), None).unwrap();
        assert!(solution.data.values()[1] < 0.0);
        let curve = BootstrapCurve::new(spec.reference_date, spec.day_counter, &solution.data);
        assert_abs_diff_eq!(helpers[0].quote_error(&curve).unwrap(), 0.0, epsilon = 1e-12);
    }
}
