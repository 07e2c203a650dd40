//! Error types for pillar.
//!
//! A single `thiserror`-derived enum carries the whole taxonomy: configuration
//! mistakes detected before solving, calibration problems raised by rate
//! helpers, bootstrap failures, and extrapolation outside a curve's range.
//! The `ensure!`, `ensure_config!` and `fail!` macros keep the checks terse.

use crate::Real;
use thiserror::Error;

/// The top-level error type used throughout pillar.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Inconsistent setup detected before any solving starts: pillar dates
    /// out of order or duplicated, non-positive tenors, incompatible
    /// trait/interpolation pairs, cyclic curve dependencies.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A rate helper could not evaluate its economics against a curve state
    /// (negative time, empty upstream handle, invalid quote).
    #[error("calibration error: {0}")]
    Calibration(String),

    /// A bootstrap pass did not produce a consistent curve.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapFailure),

    /// Evaluation outside the solved range without extrapolation enabled.
    #[error("extrapolation error: {x} is outside the range [{min}, {max}]")]
    Extrapolation {
        /// The requested abscissa.
        x: Real,
        /// Lower end of the allowed range.
        min: Real,
        /// Upper end of the allowed range.
        max: Real,
    },

    /// A one-dimensional solver could not bracket or converge on a root.
    #[error("root not found: {0}")]
    RootNotFound(String),

    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Date-related error.
    #[error("date error: {0}")]
    Date(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// The ways a bootstrap can fail after configuration checks passed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BootstrapFailure {
    /// The local, pillar-by-pillar solver exhausted its retries.
    #[error(
        "{} iteration: failed at {} alive instrument ({description}), \
         pillar {pillar}, after {attempts} attempt(s): {reason}",
        nth(.iteration),
        nth(.instrument)
    )]
    Local {
        /// 1-based sweep number (greater than one only for global interpolators).
        iteration: usize,
        /// 1-based position of the failing instrument among the alive ones.
        instrument: usize,
        /// Pillar date of the failing instrument.
        pillar: String,
        /// Human-readable identity of the failing instrument.
        description: String,
        /// Number of attempts made, including the first.
        attempts: usize,
        /// The last solver error.
        reason: String,
    },

    /// The global solver left a residual above accuracy.
    #[error(
        "global bootstrap failed: largest residual {max_error:e} (rms {rms:e}) above \
         accuracy {accuracy:e} after {iterations} iteration(s)"
    )]
    Global {
        /// Largest absolute residual at the end of the solve.
        max_error: Real,
        /// Root-mean-square residual at the end of the solve.
        rms: Real,
        /// Requested accuracy.
        accuracy: Real,
        /// Optimizer iterations spent.
        iterations: usize,
    },

    /// A multi-curve group did not reach a joint fixed point.
    #[error(
        "multi-curve bootstrap did not converge after {iterations} iteration(s) \
         (max change {max_change:e}); unstable curves: {}",
        .unstable.join(", ")
    )]
    MultiCurve {
        /// Outer iterations spent.
        iterations: usize,
        /// Largest pillar change in the last iteration.
        max_change: Real,
        /// Names of the curves still moving in the last iteration.
        unstable: Vec<String>,
    },
}

/// Shorthand `Result` type used throughout pillar.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// English ordinal of `n` (`1st`, `2nd`, `11th`, `23rd`).
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn nth(n: &usize) -> String {
    ordinal(*n)
}

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use pillar_core::{ensure, errors::Error};
/// fn positive(x: f64) -> pillar_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Configuration(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use pillar_core::{ensure_config, errors::Error};
/// fn tenor(days: i64) -> pillar_core::errors::Result<i64> {
///     ensure_config!(days > 0, "non-positive tenor: {days} days");
///     Ok(days)
/// }
/// assert!(matches!(tenor(0), Err(Error::Configuration(_))));
/// ```
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Configuration(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use pillar_core::{fail, errors::Error};
/// fn always_err() -> pillar_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
