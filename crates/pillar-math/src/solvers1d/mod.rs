//! 1D root finding.
//!
//! The bootstrap solves one pillar at a time: the objective is the repricing
//! error of a single instrument as a function of one node value, evaluated
//! inside a bracket that the curve trait supplies. Objectives are fallible,
//! since a helper may be unable to price against a candidate curve, and an
//! objective error stops the search immediately.

use pillar_core::{
    ensure,
    errors::{Error, Result},
    Real,
};

const DEFAULT_MAX_EVALUATIONS: usize = 100;

/// A root located by a solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    /// Abscissa of the root.
    pub x: Real,
    /// Objective value at `x`.
    pub value: Real,
    /// Number of objective evaluations spent, bounds included.
    pub evaluations: usize,
}

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method: bisection, secant and inverse quadratic interpolation on
/// a sign-changing bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brent {
    max_evaluations: usize,
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl Brent {
    /// A solver allowed `max_evaluations` objective calls.
    pub fn new(max_evaluations: usize) -> Self {
        Self { max_evaluations }
    }

    /// Maximum number of objective evaluations.
    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    /// Find `x` in `[x_min, x_max]` with `|f(x)| <= accuracy`.
    ///
    /// Both bounds are evaluated first and must bracket a sign change. The
    /// guess is clamped into the bracket and used to tighten it before the
    /// iteration starts.
    ///
    /// # Errors
    /// [`Error::RootNotFound`] when the bracket has no sign change or the
    /// evaluation budget runs out; any error returned by `f` unchanged.
    pub fn solve<F>(
        &self,
        mut f: F,
        accuracy: Real,
        guess: Real,
        x_min: Real,
        x_max: Real,
    ) -> Result<Root>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        ensure!(accuracy > 0.0, "accuracy must be positive, got {accuracy}");
        ensure!(x_min < x_max, "invalid bracket [{x_min}, {x_max}]");

        let mut evaluations = 2;
        let f_min = f(x_min)?;
        if f_min.abs() <= accuracy {
            return Ok(Root {
                x: x_min,
                value: f_min,
                evaluations: 1,
            });
        }
        let f_max = f(x_max)?;
        if f_max.abs() <= accuracy {
            return Ok(Root { x: x_max, value: f_max, evaluations });
        }
        if !f_min.is_finite() || !f_max.is_finite() || f_min.signum() == f_max.signum() {
            return Err(Error::RootNotFound(format!(
                "root not bracketed: f[{x_min}, {x_max}] = [{f_min:e}, {f_max:e}]"
            )));
        }

        let (mut a, mut fa, mut b, mut fb) = (x_min, f_min, x_max, f_max);

        let guess = guess.clamp(x_min, x_max);
        if guess > x_min && guess < x_max {
            evaluations += 1;
            let fg = f(guess)?;
            if fg.abs() <= accuracy {
                return Ok(Root { x: guess, value: fg, evaluations });
            }
            if fg.is_finite() {
                if fg.signum() == fa.signum() {
                    a = guess;
                    fa = fg;
                } else {
                    b = guess;
                    fb = fg;
                }
            }
        }

        let x_accuracy = 0.5e-3 * accuracy;
        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        while evaluations < self.max_evaluations {
            if fb.signum() == fc.signum() {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }
            let tol = 2.0 * Real::EPSILON * b.abs() + x_accuracy;
            let xm = 0.5 * (c - b);
            if xm.abs() <= tol || fb.abs() <= accuracy {
                return Ok(Root { x: b, value: fb, evaluations });
            }
            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (p, q) = if a == c {
                    (2.0 * xm * s, 1.0 - s)
                } else {
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
                if 2.0 * p < (3.0 * xm * q - (tol * q).abs()).min((e * q).abs()) {
                    e = d;
                    d = p / q;
                } else {
                    d = xm;
                    e = d;
                }
            } else {
                d = xm;
                e = d;
            }
            a = b;
            fa = fb;
            b += if d.abs() > tol { d } else { tol.copysign(xm) };
            evaluations += 1;
            fb = f(b)?;
            if !fb.is_finite() {
                return Err(Error::RootNotFound(format!(
                    "objective is not finite at {b}"
                )));
            }
        }
        Err(Error::RootNotFound(format!(
            "maximum number of function evaluations ({}) exceeded",
            self.max_evaluations
        )))
    }
}
