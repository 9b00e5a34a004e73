//! Subscription registry for view adapters
//!
//! Views register callbacks with the engine and never talk to each other
//! directly. Callbacks run synchronously, in registration order, after the
//! engine state is consistent.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Handle returned by a subscription, used to unsubscribe
///
/// Unique across every registry in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

/// Ordered list of callbacks for one event type
pub struct Listeners<E> {
    callbacks: Vec<(SubscriptionId, Callback<E>)>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed));
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback; returns `false` if it was not registered here
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sid, _)| *sid != id);
        self.callbacks.len() != before
    }

    /// Deliver an event to every callback
    pub fn emit(&mut self, event: &E) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::<u32>::new();

        let a = Rc::clone(&log);
        listeners.subscribe(move |e| a.borrow_mut().push(format!("a{e}")));
        let b = Rc::clone(&log);
        listeners.subscribe(move |e| b.borrow_mut().push(format!("b{e}")));

        listeners.emit(&1);
        assert_eq!(*log.borrow(), vec!["a1", "b1"]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::<()>::new();

        let c = Rc::clone(&count);
        let id = listeners.subscribe(move |_| *c.borrow_mut() += 1);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));

        listeners.emit(&());
        assert_eq!(*count.borrow(), 0);
        assert!(listeners.is_empty());
    }
}
