//! `Quote` trait and `SimpleQuote` implementation.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use pillar_core::{Observable, ObservableImpl, Observer, Real};

/// A market-observable value.
///
/// Observers registered with a quote are notified whenever its value
/// changes, which is how a quote update reaches the curves built on it.
pub trait Quote: Observable + fmt::Debug {
    /// The current value, or `None` while the quote is not set.
    fn value(&self) -> Option<Real>;

    /// `true` if the quote currently holds a value.
    fn is_valid(&self) -> bool {
        self.value().is_some()
    }
}

/// A settable market quote.
///
/// Mutation goes through `&self` so a quote can be shared as
/// `Rc<SimpleQuote>` between the market-data owner and any number of rate
/// helpers.
#[derive(Default)]
pub struct SimpleQuote {
    value: Cell<Option<Real>>,
    observable: ObservableImpl,
}

impl SimpleQuote {
    /// A quote holding `value`.
    pub fn new(value: Real) -> Self {
        Self {
            value: Cell::new(Some(value)),
            observable: ObservableImpl::new(),
        }
    }

    /// An unset (invalid) quote.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shared quote holding `value`.
    pub fn shared(value: Real) -> Rc<Self> {
        Rc::new(Self::new(value))
    }

    /// Set a new value. Observers are notified only if the value changed.
    pub fn set_value(&self, value: Real) {
        if self.value.get() != Some(value) {
            self.value.set(Some(value));
            self.observable.notify();
        }
    }

    /// Clear the value, making the quote invalid.
    pub fn reset(&self) {
        if self.value.get().is_some() {
            self.value.set(None);
            self.observable.notify();
        }
    }
}

impl Quote for SimpleQuote {
    fn value(&self) -> Option<Real> {
        self.value.get()
    }
}

impl Observable for SimpleQuote {
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.observable.register(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.observable.unregister(observer);
    }

    fn notify_observers(&self) {
        self.observable.notify();
    }
}

impl fmt::Debug for SimpleQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleQuote")
            .field("value", &self.value.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pillar_core::patterns::observable::downgrade;

    #[derive(Default)]
    struct Counter {
        hits: Cell<u32>,
    }

    impl Observer for Counter {
        fn update(&self) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    #[test]
    fn simple_quote() {
        let q = SimpleQuote::new(1.05);
        assert!(q.is_valid());
        assert_eq!(q.value(), Some(1.05));
    }

    #[test]
    fn empty_quote() {
        let q = SimpleQuote::empty();
        assert!(!q.is_valid());
        assert_eq!(q.value(), None);
    }

    #[test]
    fn notifies_only_on_change() {
        let q = SimpleQuote::shared(0.03);
        let counter = Rc::new(Counter::default());
        q.register_observer(downgrade(&counter));

        q.set_value(0.03);
        assert_eq!(counter.hits.get(), 0);
        q.set_value(0.031);
        assert_eq!(counter.hits.get(), 1);
        q.reset();
        assert_eq!(counter.hits.get(), 2);
        q.reset();
        assert_eq!(counter.hits.get(), 2);
        q.set_value(0.031);
        assert_eq!(counter.hits.get(), 3);
    }

    #[test]
    fn usable_as_trait_object() {
        let q: Rc<dyn Quote> = SimpleQuote::shared(99.5);
        assert_eq!(q.value(), Some(99.5));
    }
}
