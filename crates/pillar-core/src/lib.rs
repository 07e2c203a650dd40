//! # pillar-core
//!
//! Core types, traits, and error definitions for pillar.
//!
//! This crate provides the foundational building blocks shared across all
//! other crates in the workspace: numeric type aliases, the error taxonomy,
//! the Observer/Observable pattern with explicit listener edges, the
//! `Clean`/`Solving`/`Stale` lazy-state machine, and relinkable handles.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Compounding conventions.
pub mod compounding;

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

/// Shared, observable, relinkable references (`Handle<T>`, `RelinkableHandle<T>`).
pub mod handle;

/// Design patterns: observable and lazy object.
pub mod patterns;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A spread over a reference rate.
pub type Spread = Real;

/// A discount factor, normally in (0, 1].
pub type DiscountFactor = Real;

/// A price or value.
pub type Price = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use compounding::Compounding;
pub use errors::{BootstrapFailure, Error, Result};
pub use handle::{Handle, RelinkableHandle};
pub use patterns::lazy_object::{CurveState, LazyObject, LazyState};
pub use patterns::observable::{Observable, ObservableImpl, Observer};
