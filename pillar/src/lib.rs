//! # pillar
//!
//! Piecewise yield-curve bootstrapping: market quotes in, a continuous
//! discount / zero / forward curve out, with local, global and multi-curve
//! solvers and lazy, observer-driven re-solving.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on it rather than on the individual
//! `pillar-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use std::rc::Rc;
//! use pillar::curves::{
//!     DepositRateHelper, PiecewiseYieldCurve, RateHelper, SwapConventions, SwapRateHelper,
//!     YieldTermStructure,
//! };
//! use pillar::quotes::SimpleQuote;
//! use pillar::time::{Date, DayCounter, Period};
//!
//! let today = Date::from_ymd(2025, 1, 15).unwrap();
//! let deposit = DepositRateHelper::from_tenor(
//!     SimpleQuote::shared(0.031),
//!     today,
//!     0,
//!     Period::months(6),
//!     DayCounter::Actual360,
//! )
//! .unwrap();
//! let swap = SwapRateHelper::from_tenor(
//!     SimpleQuote::shared(0.034),
//!     today,
//!     0,
//!     Period::years(5),
//!     SwapConventions::default(),
//! )
//! .unwrap();
//! let instruments = vec![
//!     Rc::new(deposit) as Rc<dyn RateHelper>,
//!     Rc::new(swap) as Rc<dyn RateHelper>,
//! ];
//!
//! let curve = PiecewiseYieldCurve::builder(today, DayCounter::Actual365Fixed)
//!     .build(instruments)
//!     .unwrap();
//! let df = curve.discount(5.0).unwrap();
//! assert!(df > 0.8 && df < 0.9);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Numeric aliases, errors, observers, lazy state and handles.
pub use pillar_core as core;

/// Dates, periods, day counters, schedules and interest rates.
pub use pillar_time as time;

/// Interpolation, root finding and least-squares optimization.
pub use pillar_math as math;

/// Market quotes.
pub use pillar_quotes as quotes;

/// Term structures, rate helpers and bootstrapping.
pub use pillar_curves as curves;
