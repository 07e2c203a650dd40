//! # pillar-math
//!
//! Numerical building blocks for curve construction: the interpolation
//! schemes a curve can use on its nodes, a bracketing 1D root finder for
//! pillar-by-pillar bootstrapping, and a Levenberg–Marquardt least-squares
//! optimizer (over nalgebra) for joint solves.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// 1D interpolation schemes.
pub mod interpolations;

/// Least-squares optimization.
pub mod optimization;

/// 1D root-finding solvers.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use interpolations::{Interpolation, Interpolation1D, Interpolator};
pub use optimization::{
    CostFunction, EndCriteria, EndCriteriaType, LevenbergMarquardt, OptimizationResult,
};
pub use solvers1d::{Brent, Root};
