//! Observer / Observable pattern.
//!
//! * An **Observable** object notifies registered **Observer**s whenever it
//!   changes state.
//! * Observers react in `update()`, typically by marking themselves stale and
//!   forwarding the notification to their own observers.
//!
//! There is no global registry: every observable owns its listener list, so
//! the dependency graph is made of explicit edges between objects. Listeners
//! are held as `Weak` references and pruned once dropped. Everything is
//! single-threaded and uses interior mutability so that registration and
//! notification work through `&self`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// An object that can notify interested parties when it changes.
pub trait Observable {
    /// Register an observer to receive future change notifications.
    fn register_observer(&self, observer: Weak<dyn Observer>);

    /// Remove a previously registered observer.
    fn unregister_observer(&self, observer: &Weak<dyn Observer>);

    /// Notify all currently registered observers that this object has changed.
    fn notify_observers(&self);
}

/// An object that reacts to changes in [`Observable`]s it has subscribed to.
pub trait Observer {
    /// Called by every observable this observer is registered with when that
    /// observable changes state.
    fn update(&self);
}

/// Standard listener-list management, embeddable in any observable type.
#[derive(Default)]
pub struct ObservableImpl {
    observers: RefCell<Vec<Weak<dyn Observer>>>,
}

impl ObservableImpl {
    /// Create a new, empty observable implementation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Registering the same observer twice is a no-op.
    pub fn register(&self, observer: Weak<dyn Observer>) {
        let mut observers = self.observers.borrow_mut();
        if !observers.iter().any(|o| Weak::ptr_eq(o, &observer)) {
            observers.push(observer);
        }
    }

    /// Remove an observer (by pointer equality of the `Weak`).
    pub fn unregister(&self, observer: &Weak<dyn Observer>) {
        self.observers
            .borrow_mut()
            .retain(|o| !Weak::ptr_eq(o, observer));
    }

    /// Number of live observers.
    pub fn len(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }

    /// `true` when no live observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify all live observers, removing dead `Weak` references as we go.
    ///
    /// Observers are called outside the borrow, so an observer may register
    /// or unregister itself (or others) while being notified.
    pub fn notify(&self) {
        let live: Vec<Rc<dyn Observer>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|w| w.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in live {
            observer.update();
        }
    }
}

impl std::fmt::Debug for ObservableImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableImpl")
            .field("observers", &self.len())
            .finish()
    }
}

/// Upcast a strong observer to the weak trait object the listener lists store.
pub fn downgrade<T: Observer + 'static>(observer: &Rc<T>) -> Weak<dyn Observer> {
    let weak: Weak<T> = Rc::downgrade(observer);
    weak
}
