//! Synchronous publish/subscribe used by every component.
//!
//! Datasources, cursors and grid viewports compose a [`ChangeNotifier`]
//! instead of sharing an event-target base. Dispatch happens on the
//! caller's stack, in subscription order, before the publishing method
//! returns.

use std::cell::Cell;
use std::fmt;

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// A list of listeners for events of type `E`.
pub struct ChangeNotifier<E> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<E>)>,
}

impl<E> ChangeNotifier<E> {
    /// Create a notifier with no listeners.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        self.subscribe_boxed(Box::new(listener))
    }

    /// Register an already boxed listener.
    pub fn subscribe_boxed(&mut self, listener: Box<dyn FnMut(&E)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener.
    pub fn publish(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<E> Default for ChangeNotifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ChangeNotifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// An event any listener may veto.
#[derive(Debug)]
pub struct Cancelable<E> {
    event: E,
    canceled: Cell<bool>,
}

impl<E> Cancelable<E> {
    /// Wrap an event.
    pub fn new(event: E) -> Self {
        Self {
            event,
            canceled: Cell::new(false),
        }
    }

    /// The wrapped event.
    pub fn event(&self) -> &E {
        &self.event
    }

    /// Veto the action this event announces.
    pub fn cancel(&self) {
        self.canceled.set(true);
    }

    /// Check whether a listener vetoed the event.
    pub fn is_canceled(&self) -> bool {
        self.canceled.get()
    }

    /// Unwrap the event.
    pub fn into_inner(self) -> E {
        self.event
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_publish_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = ChangeNotifier::new();

        let a = Rc::clone(&seen);
        notifier.subscribe(move |e: &u32| a.borrow_mut().push(("a", *e)));
        let b = Rc::clone(&seen);
        notifier.subscribe(move |e: &u32| b.borrow_mut().push(("b", *e)));

        notifier.publish(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(Cell::new(0));
        let mut notifier = ChangeNotifier::new();
        let c = Rc::clone(&count);
        let id = notifier.subscribe(move |_: &()| c.set(c.get() + 1));

        notifier.publish(&());
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.publish(&());

        assert_eq!(count.get(), 1);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn test_cancelable() {
        let mut notifier = ChangeNotifier::new();
        notifier.subscribe(|e: &Cancelable<i32>| {
            if *e.event() < 0 {
                e.cancel();
            }
        });

        let positive = Cancelable::new(1);
        notifier.publish(&positive);
        assert!(!positive.is_canceled());

        let negative = Cancelable::new(-1);
        notifier.publish(&negative);
        assert!(negative.is_canceled());
        assert_eq!(negative.into_inner(), -1);
    }
}
