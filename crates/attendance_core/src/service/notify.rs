//! In-process change listeners.
//!
//! # Invariants
//! - Listeners run synchronously, in subscription order, after state changed.
//! - Subscription ids are never reused within one registry.

use std::collections::BTreeMap;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// Ordered listener registry for one store's events.
pub struct Subscribers<E> {
    next_id: u64,
    listeners: BTreeMap<SubscriptionId, Listener<E>>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            listeners: BTreeMap::new(),
        }
    }
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Returns `false` when the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn notify(&mut self, event: &E) {
        for listener in self.listeners.values_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Subscribers;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notify_reaches_listeners_in_order_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::<u32>::new();

        let first_seen = Rc::clone(&seen);
        let first = subscribers.subscribe(move |event| first_seen.borrow_mut().push(("a", *event)));
        let second_seen = Rc::clone(&seen);
        subscribers.subscribe(move |event| second_seen.borrow_mut().push(("b", *event)));

        subscribers.notify(&1);
        assert!(subscribers.unsubscribe(first));
        assert!(!subscribers.unsubscribe(first));
        subscribers.notify(&2);

        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
    }
}
