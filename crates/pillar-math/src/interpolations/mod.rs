//! 1D interpolation: the [`Interpolation1D`] trait, the closed set of
//! schemes a curve can use, and the [`Interpolator`] factory that builds
//! them.
//!
//! Every scheme is node-exact: evaluating at `x_i` returns `y_i`. Updating
//! a single ordinate through [`Interpolation1D::update`] costs O(1) for the
//! local schemes (linear, log-linear, backward-flat) and a full O(n) refit
//! for the global ones (natural cubic spline, convex-monotone), which is
//! what [`Interpolator::is_global`] reports to the bootstrappers.

use std::fmt;

use pillar_core::errors::{Error, Result};
use pillar_core::{ensure, Real};

pub mod backward_flat;
pub mod convex_monotone;
pub mod cubic;
pub mod linear;

pub use backward_flat::BackwardFlatInterpolation;
pub use convex_monotone::ConvexMonotoneInterpolation;
pub use cubic::CubicNaturalSpline;
pub use linear::{LinearInterpolation, LogLinearInterpolation};

/// A 1D interpolation function `f: R → R` defined by a set of known points.
pub trait Interpolation1D: fmt::Debug {
    /// Abscissae, strictly increasing.
    fn xs(&self) -> &[Real];

    /// Ordinates.
    fn ys(&self) -> &[Real];

    /// Evaluate at `x`, extrapolating outside the node range.
    fn value_at(&self, x: Real) -> Real;

    /// First derivative at `x`, extrapolating outside the node range.
    fn derivative_at(&self, x: Real) -> Real;

    /// Integral from `x_min` to `x`, extrapolating outside the node range.
    fn primitive_at(&self, x: Real) -> Real;

    /// Replace the ordinate at `index` and refit whatever depends on it.
    fn update(&mut self, index: usize, y: Real) -> Result<()>;

    /// Lower end of the interpolation domain.
    fn x_min(&self) -> Real {
        self.xs()[0]
    }

    /// Upper end of the interpolation domain.
    fn x_max(&self) -> Real {
        let xs = self.xs();
        xs[xs.len() - 1]
    }

    /// `true` if `x` is within the node range (with a small relative
    /// tolerance for floating-point noise on the end points).
    fn is_in_range(&self, x: Real) -> bool {
        let (lo, hi) = (self.x_min(), self.x_max());
        let tol = 1e-12 * (hi - lo).abs().max(1.0);
        x >= lo - tol && x <= hi + tol
    }

    /// Evaluate at `x`; outside the node range this is an
    /// [`Error::Extrapolation`] unless `allow_extrapolation` is set.
    fn value(&self, x: Real, allow_extrapolation: bool) -> Result<Real> {
        self.check_range(x, allow_extrapolation)?;
        Ok(self.value_at(x))
    }

    /// First derivative at `x`, range-checked like [`value`][Self::value].
    fn derivative(&self, x: Real, allow_extrapolation: bool) -> Result<Real> {
        self.check_range(x, allow_extrapolation)?;
        Ok(self.derivative_at(x))
    }

    /// Integral from `x_min` to `x`, range-checked like [`value`][Self::value].
    fn primitive(&self, x: Real, allow_extrapolation: bool) -> Result<Real> {
        self.check_range(x, allow_extrapolation)?;
        Ok(self.primitive_at(x))
    }

    /// Fail with [`Error::Extrapolation`] if `x` is out of range and
    /// extrapolation is not allowed.
    fn check_range(&self, x: Real, allow_extrapolation: bool) -> Result<()> {
        if allow_extrapolation || self.is_in_range(x) {
            Ok(())
        } else {
            Err(Error::Extrapolation {
                x,
                min: self.x_min(),
                max: self.x_max(),
            })
        }
    }
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// The interpolation schemes available to curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolator {
    /// Piecewise linear.
    #[default]
    Linear,
    /// Linear on `ln(y)`; ordinates must be positive.
    LogLinear,
    /// Piecewise constant, each node's value holding on the interval to its
    /// left.
    BackwardFlat,
    /// Natural cubic spline (zero second derivative at both ends).
    CubicNatural,
    /// Hagan–West monotone-convex scheme on zero rates.
    ConvexMonotone,
}

impl Interpolator {
    /// Build an interpolation through `(xs, ys)`.
    pub fn interpolate(&self, xs: &[Real], ys: &[Real]) -> Result<Interpolation> {
        Ok(match self {
            Interpolator::Linear => Interpolation::Linear(LinearInterpolation::new(xs, ys)?),
            Interpolator::LogLinear => {
                Interpolation::LogLinear(LogLinearInterpolation::new(xs, ys)?)
            }
            Interpolator::BackwardFlat => {
                Interpolation::BackwardFlat(BackwardFlatInterpolation::new(xs, ys)?)
            }
            Interpolator::CubicNatural => {
                Interpolation::CubicNatural(CubicNaturalSpline::new(xs, ys)?)
            }
            Interpolator::ConvexMonotone => {
                Interpolation::ConvexMonotone(ConvexMonotoneInterpolation::new(xs, ys)?)
            }
        })
    }

    /// `true` when moving one node changes the function away from the
    /// adjacent intervals, so pillar-by-pillar solving must be repeated
    /// until the whole curve settles.
    pub fn is_global(&self) -> bool {
        matches!(
            self,
            Interpolator::CubicNatural | Interpolator::ConvexMonotone
        )
    }

    /// Minimum number of nodes the scheme accepts.
    pub fn required_points(&self) -> usize {
        2
    }

    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Interpolator::Linear => "linear",
            Interpolator::LogLinear => "log-linear",
            Interpolator::BackwardFlat => "backward-flat",
            Interpolator::CubicNatural => "natural cubic",
            Interpolator::ConvexMonotone => "convex-monotone",
        }
    }
}

impl fmt::Display for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A built interpolation of any of the supported schemes.
#[derive(Debug, Clone)]
pub enum Interpolation {
    /// See [`LinearInterpolation`].
    Linear(LinearInterpolation),
    /// See [`LogLinearInterpolation`].
    LogLinear(LogLinearInterpolation),
    /// See [`BackwardFlatInterpolation`].
    BackwardFlat(BackwardFlatInterpolation),
    /// See [`CubicNaturalSpline`].
    CubicNatural(CubicNaturalSpline),
    /// See [`ConvexMonotoneInterpolation`].
    ConvexMonotone(ConvexMonotoneInterpolation),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Interpolation::Linear($inner) => $body,
            Interpolation::LogLinear($inner) => $body,
            Interpolation::BackwardFlat($inner) => $body,
            Interpolation::CubicNatural($inner) => $body,
            Interpolation::ConvexMonotone($inner) => $body,
        }
    };
}

impl Interpolation1D for Interpolation {
    fn xs(&self) -> &[Real] {
        dispatch!(self, i => i.xs())
    }

    fn ys(&self) -> &[Real] {
        dispatch!(self, i => i.ys())
    }

    fn value_at(&self, x: Real) -> Real {
        dispatch!(self, i => i.value_at(x))
    }

    fn derivative_at(&self, x: Real) -> Real {
        dispatch!(self, i => i.derivative_at(x))
    }

    fn primitive_at(&self, x: Real) -> Real {
        dispatch!(self, i => i.primitive_at(x))
    }

    fn update(&mut self, index: usize, y: Real) -> Result<()> {
        dispatch!(self, i => i.update(index, y))
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Validate node arrays: equal lengths, at least `min_points`, strictly
/// increasing finite abscissae, finite ordinates.
pub(crate) fn check_nodes(xs: &[Real], ys: &[Real], min_points: usize) -> Result<()> {
    ensure!(
        xs.len() == ys.len(),
        "xs and ys must have the same length ({} vs {})",
        xs.len(),
        ys.len()
    );
    ensure!(
        xs.len() >= min_points,
        "need at least {min_points} points for interpolation, got {}",
        xs.len()
    );
    ensure!(
        xs.iter().chain(ys).all(|v| v.is_finite()),
        "interpolation nodes must be finite"
    );
    if let Some(w) = xs.windows(2).find(|w| w[0] >= w[1]) {
        return Err(Error::Precondition(format!(
            "abscissae must be strictly increasing ({} then {})",
            w[0], w[1]
        )));
    }
    Ok(())
}

/// Check an index and ordinate passed to `update`.
pub(crate) fn check_update(len: usize, index: usize, y: Real) -> Result<()> {
    ensure!(index < len, "node index {index} out of range [0, {len})");
    ensure!(y.is_finite(), "non-finite ordinate {y} at node {index}");
    Ok(())
}

/// Binary search: find `i` such that `xs[i] <= x < xs[i+1]`, clamped to
/// `[0, n-2]`.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}
