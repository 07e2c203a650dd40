//! LazyObject pattern with an explicit per-object state machine.
//!
//! A lazy object caches an expensive computation and recomputes it only when
//! its inputs change. Its cache lives in one of three states:
//!
//! | state | meaning |
//! |-------|---------|
//! | [`CurveState::Stale`] | inputs changed (or never computed); next query recomputes |
//! | [`CurveState::Solving`] | a computation is running right now |
//! | [`CurveState::Clean`] | cached results are current |
//!
//! Entering `Solving` while already `Solving` means the computation pulled
//! on itself through a dependency cycle. The default reaction is a
//! [`Error::Configuration`]; objects that are coordinated externally (for
//! instance curves solved jointly by a group) override
//! [`LazyObject::on_reentry`] to serve their last-known values instead.

use std::cell::Cell;

use crate::errors::{Error, Result};

/// The cache state of a lazy object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CurveState {
    /// Results are current.
    Clean,
    /// A computation is in progress.
    Solving,
    /// Results must be recomputed before use.
    #[default]
    Stale,
}

/// Trait for objects that lazily compute and cache their results.
///
/// Implementors provide [`perform_calculations`][Self::perform_calculations]
/// and access to an embedded [`LazyState`]; the state transitions live in the
/// provided methods.
pub trait LazyObject {
    /// Perform the actual (expensive) calculation.
    fn perform_calculations(&self) -> Result<()>;

    /// Access to the embedded bookkeeping.
    fn lazy_state(&self) -> &LazyState;

    /// Called when [`calculate`][Self::calculate] finds the object already
    /// `Solving`.
    fn on_reentry(&self) -> Result<()> {
        Err(Error::Configuration(
            "cyclic dependency: object re-entered while it was being solved".into(),
        ))
    }

    /// Ensure results are up-to-date.
    ///
    /// A failed calculation leaves the object `Stale`, so the next call tries
    /// again.
    fn calculate(&self) -> Result<()> {
        let state = self.lazy_state();
        match state.get() {
            CurveState::Clean => Ok(()),
            CurveState::Solving => self.on_reentry(),
            CurveState::Stale => {
                state.set(CurveState::Solving);
                let result = self.perform_calculations();
                state.set(if result.is_ok() {
                    CurveState::Clean
                } else {
                    CurveState::Stale
                });
                result
            }
        }
    }

    /// Mark the cached results as stale without recomputing.
    ///
    /// Returns `true` when this call moved the object from `Clean` to
    /// `Stale`; only then does the change need to be forwarded to
    /// observers. An object that is `Solving` stays `Solving`.
    fn invalidate(&self) -> bool {
        self.lazy_state().invalidate()
    }

    /// `true` when the cached results are current.
    fn is_calculated(&self) -> bool {
        self.lazy_state().get() == CurveState::Clean
    }
}

/// Bookkeeping fields required by [`LazyObject`].
///
/// # Example
/// ```
/// use std::cell::Cell;
/// use pillar_core::patterns::lazy_object::{LazyObject, LazyState};
///
/// struct MyLazy {
///     state: LazyState,
///     result: Cell<f64>,
/// }
///
/// impl LazyObject for MyLazy {
///     fn perform_calculations(&self) -> pillar_core::errors::Result<()> {
///         self.result.set(42.0);
///         Ok(())
///     }
///     fn lazy_state(&self) -> &LazyState { &self.state }
/// }
///
/// let obj = MyLazy { state: LazyState::new(), result: Cell::new(0.0) };
/// obj.calculate().unwrap();
/// assert_eq!(obj.result.get(), 42.0);
/// assert!(obj.is_calculated());
/// ```
#[derive(Debug, Default)]
pub struct LazyState {
    state: Cell<CurveState>,
}

impl LazyState {
    /// Create a new `LazyState`; the cache is initially stale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn get(&self) -> CurveState {
        self.state.get()
    }

    /// Force a state.
    pub fn set(&self, state: CurveState) {
        self.state.set(state);
    }

    /// Move `Clean` to `Stale`; returns whether a transition happened.
    pub fn invalidate(&self) -> bool {
        if self.state.get() == CurveState::Clean {
            self.state.set(CurveState::Stale);
            true
        } else {
            false
        }
    }
}
