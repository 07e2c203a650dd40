//! `Handle<T>`: a shared, observable, optionally empty reference.
//!
//! All copies of a handle share one *link*. Relinking through a
//! [`RelinkableHandle`] replaces the link's target for every copy at once
//! and notifies the link's observers. While linked, the link also forwards
//! every notification raised by its target, so an object observing a handle
//! hears about both relinking and changes of whatever the handle points to.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use crate::patterns::observable::{Observable, ObservableImpl, Observer};

struct Link<T: ?Sized> {
    target: RefCell<Option<Rc<T>>>,
    observable: ObservableImpl,
    me: Weak<Link<T>>,
}

impl<T: ?Sized + Observable + 'static> Link<T> {
    fn new(target: Option<Rc<T>>) -> Rc<Self> {
        let link = Rc::new_cyclic(|me| Link {
            target: RefCell::new(None),
            observable: ObservableImpl::new(),
            me: me.clone(),
        });
        if let Some(target) = target {
            link.link_to(target);
        }
        link
    }

    fn as_observer(&self) -> Weak<dyn Observer> {
        let me: Weak<Link<T>> = self.me.clone();
        me
    }

    fn link_to(&self, target: Rc<T>) {
        let me = self.as_observer();
        let previous = self.target.replace(Some(Rc::clone(&target)));
        if let Some(previous) = previous {
            previous.unregister_observer(&me);
        }
        target.register_observer(me);
    }

    fn unlink(&self) {
        if let Some(previous) = self.target.replace(None) {
            previous.unregister_observer(&self.as_observer());
        }
    }
}

impl<T: ?Sized + Observable + 'static> Observer for Link<T> {
    fn update(&self) {
        self.observable.notify();
    }
}

impl<T: ?Sized + Observable + 'static> Observable for Link<T> {
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

/// A shared, optionally empty reference to a `T`.
///
/// The handle itself cannot be relinked; use a [`RelinkableHandle`] to hand
/// out handles whose target can later be replaced.
pub struct Handle<T: ?Sized> {
    link: Rc<Link<T>>,
}

impl<T: ?Sized + Observable + 'static> Handle<T> {
    /// A handle permanently pointing at `target`.
    pub fn new(target: Rc<T>) -> Self {
        Self {
            link: Link::new(Some(target)),
        }
    }

    /// An empty handle.
    pub fn empty() -> Self {
        Self {
            link: Link::new(None),
        }
    }

    /// The current target, if any.
    pub fn current(&self) -> Option<Rc<T>> {
        self.link.target.borrow().clone()
    }

    /// `true` when the handle points at nothing.
    pub fn is_empty(&self) -> bool {
        self.link.target.borrow().is_none()
    }

    /// The shared link as an observable: it notifies on relinking and
    /// forwards the target's notifications.
    pub fn observable(&self) -> Rc<dyn Observable> {
        let link: Rc<Link<T>> = Rc::clone(&self.link);
        link
    }

    /// `true` when both handles share the same link.
    pub fn same_link(&self, other: &Handle<T>) -> bool {
        Rc::ptr_eq(&self.link, &other.link)
    }
}

impl<T: ?Sized> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            link: Rc::clone(&self.link),
        }
    }
}

impl<T: ?Sized + Observable + 'static> Default for Handle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized + Observable + 'static> Observable for Handle<T> {
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.link.register_observer(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.link.unregister_observer(observer);
    }

    fn notify_observers(&self) {
        self.link.notify_observers();
    }
}

impl<T: ?Sized> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.link.target.borrow().is_some() {
            write!(f, "Handle(linked)")
        } else {
            write!(f, "Handle(empty)")
        }
    }
}

/// A [`Handle`] whose target can be replaced at runtime.
///
/// Every handle obtained through [`handle`][Self::handle] (or through
/// `Deref`) sees the new target, and observers of the link are notified.
pub struct RelinkableHandle<T: ?Sized> {
    handle: Handle<T>,
}

impl<T: ?Sized + Observable + 'static> RelinkableHandle<T> {
    /// A relinkable handle initially pointing at `target`.
    pub fn new(target: Rc<T>) -> Self {
        Self {
            handle: Handle::new(target),
        }
    }

    /// A relinkable handle initially empty.
    pub fn empty() -> Self {
        Self {
            handle: Handle::empty(),
        }
    }

    /// Point every copy of this handle at `target` and notify observers.
    pub fn link_to(&self, target: Rc<T>) {
        self.handle.link.link_to(target);
        self.handle.link.notify_observers();
    }

    /// Empty every copy of this handle and notify observers.
    pub fn unlink(&self) {
        self.handle.link.unlink();
        self.handle.link.notify_observers();
    }

    /// A read-only handle sharing this handle's link.
    pub fn handle(&self) -> Handle<T> {
        self.handle.clone()
    }
}

impl<T: ?Sized + Observable + 'static> Default for RelinkableHandle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> Clone for RelinkableHandle<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<T: ?Sized> Deref for RelinkableHandle<T> {
    type Target = Handle<T>;

    fn deref(&self) -> &Handle<T> {
        &self.handle
    }
}

impl<T: ?Sized> fmt::Debug for RelinkableHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Relinkable{:?}", self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::observable::downgrade;
    use std::cell::Cell;

    #[derive(Default)]
    struct Source {
        observable: ObservableImpl,
        value: Cell<i32>,
    }

    impl Observable for Source {
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

    #[derive(Default)]
    struct Listener {
        hits: Cell<u32>,
    }

    impl Observer for Listener {
        fn update(&self) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    #[test]
    fn empty_handle() {
        let h: Handle<Source> = Handle::empty();
        assert!(h.is_empty());
        assert!(h.current().is_none());
    }

    #[test]
    fn copies_see_relinking() {
        let a = Rc::new(Source::default());
        a.value.set(1);
        let b = Rc::new(Source::default());
        b.value.set(2);
        let relinkable = RelinkableHandle::new(a);
        let copy = relinkable.handle();
        assert_eq!(copy.current().map(|s| s.value.get()), Some(1));
        relinkable.link_to(b);
        assert_eq!(copy.current().map(|s| s.value.get()), Some(2));
        assert!(copy.same_link(&relinkable));
    }

    #[test]
    fn relinking_and_target_changes_are_forwarded() {
        let a = Rc::new(Source::default());
        let b = Rc::new(Source::default());
        let relinkable = RelinkableHandle::new(Rc::clone(&a));
        let listener = Rc::new(Listener::default());
        relinkable.register_observer(downgrade(&listener));

        a.notify_observers();
        assert_eq!(listener.hits.get(), 1);

        relinkable.link_to(Rc::clone(&b));
        assert_eq!(listener.hits.get(), 2);

        // the old target is no longer forwarded
        a.notify_observers();
        assert_eq!(listener.hits.get(), 2);
        b.notify_observers();
        assert_eq!(listener.hits.get(), 3);

        relinkable.unlink();
        assert_eq!(listener.hits.get(), 4);
        assert!(relinkable.is_empty());
        b.notify_observers();
        assert_eq!(listener.hits.get(), 4);
    }
}
