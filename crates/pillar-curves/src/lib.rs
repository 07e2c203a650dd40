//! # pillar-curves
//!
//! Yield term structures and the machinery that bootstraps them from market
//! instruments.
//!
//! A [`PiecewiseYieldCurve`] holds one node per instrument (its *pillar*)
//! on the native scale of a [`CurveTrait`] (discount factors, zero rates or
//! instantaneous forwards) and interpolates between them. Node values are
//! solved so that every [`RateHelper`] reprices to its quote, either one
//! pillar at a time ([`BootstrapConfig`]) or jointly by least squares
//! ([`GlobalBootstrap`]). Curves that read each other are solved together
//! by a [`MultiCurveGroup`].
//!
//! Curves are lazy and observable: a quote change marks every dependent
//! curve stale, and the next query re-solves.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Bond rate helpers.
pub mod bond_helpers;

/// Iterative and global bootstrap strategies.
pub mod bootstrap;

/// Curve data on a native scale and the view helpers price against.
pub mod bootstrap_curve;

/// Given curves: fixed nodes and flat forwards.
pub mod interpolated_curve;

/// Joint solving of interdependent curves.
pub mod multi_curve;

/// The bootstrapped curve.
pub mod piecewise_yield_curve;

/// Money-market, FRA, futures and swap rate helpers.
pub mod rate_helpers;

/// Curves derived by a zero spread.
pub mod spreaded_curve;

/// Native quantities a curve can interpolate.
pub mod traits;

/// The `YieldTermStructure` trait.
pub mod yield_term_structure;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use bond_helpers::FixedRateBondHelper;
pub use bootstrap::{AdditionalErrors, Bootstrap, BootstrapConfig, ExtraVariable, GlobalBootstrap};
pub use bootstrap_curve::{BootstrapCurve, CurveData};
pub use interpolated_curve::{FlatForward, InterpolatedCurve};
pub use multi_curve::{MultiCurveConfig, MultiCurveGroup};
pub use piecewise_yield_curve::{PiecewiseYieldCurve, PiecewiseYieldCurveBuilder};
pub use rate_helpers::{
    DepositRateHelper, FraConvention, FraRateHelper, FuturesQuoting, FuturesRateHelper,
    RateHelper, SwapConventions, SwapRateHelper,
};
pub use spreaded_curve::ZeroSpreadedCurve;
pub use traits::CurveTrait;
pub use yield_term_structure::YieldTermStructure;
