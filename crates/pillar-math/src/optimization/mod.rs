//! Nonlinear least squares.
//!
//! A [`CostFunction`] returns a residual vector; [`LevenbergMarquardt`]
//! minimizes half its squared norm. The global bootstrap maps every pillar
//! value, extra node and extra variable into one unknown vector and hands
//! the repricing errors to this optimizer.

use nalgebra::{DMatrix, DVector};
use tracing::trace;

use pillar_core::{
    errors::{Error, Result},
    Real,
};

// ── Cost function trait ───────────────────────────────────────────────────────

/// A vector-valued residual function.
pub trait CostFunction {
    /// Residuals at `x`.
    fn values(&self, x: &DVector<Real>) -> Result<DVector<Real>>;

    /// Scalar cost `0.5 * Σ r²(x)`.
    fn value(&self, x: &DVector<Real>) -> Result<Real> {
        Ok(0.5 * self.values(x)?.norm_squared())
    }

    /// Jacobian of the residuals at `x`, one row per residual, given the
    /// residuals already computed there. The default uses forward
    /// differences.
    fn jacobian(&self, x: &DVector<Real>, residuals: &DVector<Real>) -> Result<DMatrix<Real>> {
        let n = x.len();
        let m = residuals.len();
        let mut jac = DMatrix::zeros(m, n);
        let mut bumped = x.clone();
        for j in 0..n {
            let h = Real::EPSILON.sqrt() * x[j].abs().max(1.0);
            bumped[j] = x[j] + h;
            let shifted = self.values(&bumped)?;
            if shifted.len() != m {
                return Err(Error::Runtime(format!(
                    "cost function returned {} residuals, expected {m}",
                    shifted.len()
                )));
            }
            jac.set_column(j, &((shifted - residuals) / h));
            bumped[j] = x[j];
        }
        Ok(jac)
    }
}

// ── End criteria ──────────────────────────────────────────────────────────────

/// Criteria to stop an optimization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndCriteria {
    /// Maximum number of accepted steps.
    pub max_iterations: usize,
    /// Maximum number of consecutive steps that barely reduce the cost.
    pub max_stationary_state_iterations: usize,
    /// Stop when the root-mean-square residual drops below this.
    pub root_epsilon: Real,
    /// Stop when a step, relative to the parameters, drops below this.
    pub function_epsilon: Real,
    /// Stop when the largest gradient component drops below this.
    pub gradient_norm_epsilon: Real,
}

impl EndCriteria {
    /// Create new end criteria.
    pub fn new(
        max_iterations: usize,
        max_stationary_state_iterations: usize,
        root_epsilon: Real,
        function_epsilon: Real,
        gradient_norm_epsilon: Real,
    ) -> Self {
        Self {
            max_iterations,
            max_stationary_state_iterations,
            root_epsilon,
            function_epsilon,
            gradient_norm_epsilon,
        }
    }

    /// Set the maximum number of accepted steps.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Set the stationary-state allowance.
    pub fn with_max_stationary_state_iterations(mut self, n: usize) -> Self {
        self.max_stationary_state_iterations = n;
        self
    }

    /// Set the residual tolerance.
    pub fn with_root_epsilon(mut self, eps: Real) -> Self {
        self.root_epsilon = eps;
        self
    }

    /// Set the step tolerance.
    pub fn with_function_epsilon(mut self, eps: Real) -> Self {
        self.function_epsilon = eps;
        self
    }

    /// Set the gradient tolerance.
    pub fn with_gradient_norm_epsilon(mut self, eps: Real) -> Self {
        self.gradient_norm_epsilon = eps;
        self
    }
}

impl Default for EndCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            max_stationary_state_iterations: 100,
            root_epsilon: 1e-8,
            function_epsilon: 1e-8,
            gradient_norm_epsilon: 1e-8,
        }
    }
}

/// The reason an optimization terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCriteriaType {
    /// Maximum iterations reached.
    MaxIterations,
    /// Residual norm below root epsilon.
    RootEpsilon,
    /// Step below function epsilon.
    FunctionEpsilon,
    /// Gradient below gradient norm epsilon.
    GradientNormEpsilon,
    /// No further progress possible (stationary cost, or damping blew up).
    StationaryPoint,
}

/// Result of an optimization.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Final parameter values.
    pub x: DVector<Real>,
    /// Residuals at `x`.
    pub residuals: DVector<Real>,
    /// Final cost `0.5 * Σ r²`.
    pub value: Real,
    /// Number of accepted steps.
    pub iterations: usize,
    /// Reason for termination.
    pub end_type: EndCriteriaType,
}

impl OptimizationResult {
    /// Root-mean-square of the final residuals.
    pub fn rms(&self) -> Real {
        rms(&self.residuals)
    }
}

fn done(
    x: DVector<Real>,
    residuals: DVector<Real>,
    value: Real,
    iterations: usize,
    end_type: EndCriteriaType,
) -> Result<OptimizationResult> {
    Ok(OptimizationResult {
        x,
        residuals,
        value,
        iterations,
        end_type,
    })
}

fn rms(r: &DVector<Real>) -> Real {
    if r.is_empty() {
        0.0
    } else {
        (r.norm_squared() / r.len() as Real).sqrt()
    }
}

// ── Levenberg–Marquardt ───────────────────────────────────────────────────────

const MAX_DAMPING: Real = 1e16;
const MIN_DAMPING: Real = 1e-15;

/// Levenberg–Marquardt with Marquardt's diagonal scaling.
///
/// Each iteration solves `(JᵀJ + λ·diag(JᵀJ)) δ = −Jᵀr` by Cholesky
/// factorization. A step that lowers the cost is accepted and `λ` shrinks;
/// otherwise `λ` grows and the step is recomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevenbergMarquardt {
    initial_damping: Real,
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self {
            initial_damping: 1e-3,
        }
    }
}

impl LevenbergMarquardt {
    /// An optimizer starting from damping `initial_damping`.
    pub fn new(initial_damping: Real) -> Self {
        Self { initial_damping }
    }

    /// Minimize `cost_fn` starting from `initial_values`.
    ///
    /// Reaching an end criterion is not an error: callers decide whether
    /// the final residuals are acceptable. Errors come only from the cost
    /// function.
    pub fn minimize<C: CostFunction + ?Sized>(
        &self,
        cost_fn: &C,
        initial_values: DVector<Real>,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult> {
        let mut x = initial_values;
        let mut r = cost_fn.values(&x)?;
        let mut cost = 0.5 * r.norm_squared();
        if !cost.is_finite() {
            return Err(Error::Runtime(
                "cost function is not finite at the starting point".into(),
            ));
        }
        let mut lambda = self.initial_damping;
        let mut stationary = 0;
        let n = x.len();

        for iteration in 0..end_criteria.max_iterations {
            if rms(&r) <= end_criteria.root_epsilon {
                return done(x, r, cost, iteration, EndCriteriaType::RootEpsilon);
            }
            let jac = cost_fn.jacobian(&x, &r)?;
            let gradient = jac.tr_mul(&r);
            if gradient.amax() <= end_criteria.gradient_norm_epsilon {
                return done(x, r, cost, iteration, EndCriteriaType::GradientNormEpsilon);
            }
            let jtj = jac.tr_mul(&jac);

            let step = loop {
                if lambda > MAX_DAMPING {
                    return done(x, r, cost, iteration, EndCriteriaType::StationaryPoint);
                }
                let mut system = jtj.clone();
                for i in 0..n {
                    system[(i, i)] += lambda * jtj[(i, i)].max(Real::EPSILON);
                }
                let Some(cholesky) = system.cholesky() else {
                    lambda *= 10.0;
                    continue;
                };
                let delta = cholesky.solve(&(-&gradient));
                let candidate = &x + &delta;
                let candidate_r = cost_fn.values(&candidate)?;
                let candidate_cost = 0.5 * candidate_r.norm_squared();
                if candidate_cost.is_finite() && candidate_cost < cost {
                    lambda = (lambda / 10.0).max(MIN_DAMPING);
                    break (delta, candidate, candidate_r, candidate_cost);
                }
                lambda *= 10.0;
            };

            let (delta, candidate, candidate_r, candidate_cost) = step;
            let improvement = cost - candidate_cost;
            x = candidate;
            r = candidate_r;
            cost = candidate_cost;
            trace!(
                iteration,
                rms = rms(&r),
                lambda,
                step = delta.norm(),
                "levenberg-marquardt step"
            );

            let eps = end_criteria.function_epsilon;
            if delta.norm() <= eps * (x.norm() + eps) {
                let end_type = if rms(&r) <= end_criteria.root_epsilon {
                    EndCriteriaType::RootEpsilon
                } else {
                    EndCriteriaType::FunctionEpsilon
                };
                return done(x, r, cost, iteration + 1, end_type);
            }
            if improvement <= eps * cost {
                stationary += 1;
                if stationary > end_criteria.max_stationary_state_iterations {
                    return done(x, r, cost, iteration + 1, EndCriteriaType::StationaryPoint);
                }
            } else {
                stationary = 0;
            }
        }

        let end_type = if rms(&r) <= end_criteria.root_epsilon {
            EndCriteriaType::RootEpsilon
        } else {
            EndCriteriaType::MaxIterations
        };
        done(x, r, cost, end_criteria.max_iterations, end_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    struct Rosenbrock;

    impl CostFunction for Rosenbrock {
        fn values(&self, x: &DVector<Real>) -> Result<DVector<Real>> {
            Ok(DVector::from_vec(vec![
                10.0 * (x[1] - x[0] * x[0]),
                1.0 - x[0],
            ]))
        }
    }

    // y = a + b·t sampled exactly
    struct LineFit {
        ts: Vec<Real>,
        ys: Vec<Real>,
    }

    impl CostFunction for LineFit {
        fn values(&self, x: &DVector<Real>) -> Result<DVector<Real>> {
            Ok(DVector::from_iterator(
                self.ts.len(),
                self.ts.iter().zip(&self.ys).map(|(t, y)| x[0] + x[1] * t - y),
            ))
        }
    }

    struct Constant;

    impl CostFunction for Constant {
        fn values(&self, x: &DVector<Real>) -> Result<DVector<Real>> {
            Ok(DVector::from_vec(vec![x[0] - 1.0, x[0] - 2.0, x[0] - 3.0]))
        }
    }

    #[test]
    fn rosenbrock_residuals() {
        let ec = EndCriteria::default().with_root_epsilon(1e-12);
        let result = LevenbergMarquardt::default()
            .minimize(&Rosenbrock, DVector::from_vec(vec![-1.2, 1.0]), &ec)
            .unwrap();
        assert_abs_diff_eq!(result.x[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.x[1], 1.0, epsilon = 1e-6);
        assert!(result.rms() <= 1e-10, "rms {}", result.rms());
    }

    #[test]
    fn exact_linear_fit() {
        let ts = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = ts.iter().map(|t| 0.5 - 0.25 * t).collect();
        let cost = LineFit { ts, ys };
        let result = LevenbergMarquardt::default()
            .minimize(&cost, DVector::zeros(2), &EndCriteria::default())
            .unwrap();
        assert_abs_diff_eq!(result.x[0], 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(result.x[1], -0.25, epsilon = 1e-7);
        assert!(result.rms() <= 1e-8);
    }

    #[test]
    fn inconsistent_system_stops_at_least_squares_solution() {
        let result = LevenbergMarquardt::default()
            .minimize(&Constant, DVector::from_vec(vec![10.0]), &EndCriteria::default())
            .unwrap();
        assert_abs_diff_eq!(result.x[0], 2.0, epsilon = 1e-6);
        assert_ne!(result.end_type, EndCriteriaType::RootEpsilon);
        assert_abs_diff_eq!(result.value, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let ec = EndCriteria::default()
            .with_max_iterations(1)
            .with_root_epsilon(1e-14);
        let result = LevenbergMarquardt::default()
            .minimize(&Rosenbrock, DVector::from_vec(vec![-1.2, 1.0]), &ec)
            .unwrap();
        assert_eq!(result.end_type, EndCriteriaType::MaxIterations);
        assert_eq!(result.iterations, 1);
    }
}
