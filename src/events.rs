//! Synchronous event bus
//!
//! Collaborators (score, audio, effects) subscribe once at startup. The core
//! publishes during its tick and every subscriber sees the event before the
//! tick returns. Published events are also queued so a host that prefers
//! polling can `drain` them after the tick; the game loops clear that queue at
//! the start of each tick so it never outlives one tick.

use std::fmt;

type Subscriber<E> = Box<dyn FnMut(&E)>;

/// Observer list plus a pending queue of published events
pub struct EventBus<E> {
    subscribers: Vec<Subscriber<E>>,
    pending: Vec<E>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            pending: Vec::new(),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending)
            .finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback, invoked in subscription order
    pub fn subscribe(&mut self, subscriber: impl FnMut(&E) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Deliver to all subscribers, then queue for polling
    pub fn publish(&mut self, event: E) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&event);
        }
        self.pending.push(event);
    }

    /// Take every queued event in publish order
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending)
    }

    /// Events published since the last drain
    pub fn pending(&self) -> &[E] {
        &self.pending
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribers_see_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&seen);
        bus.subscribe(move |e: &u32| sink.borrow_mut().push(*e));

        bus.publish(1);
        bus.publish(2);

        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(bus.drain(), vec![1, 2]);
        assert!(bus.pending().is_empty());
    }

    #[test]
    fn test_drain_without_subscribers() {
        let mut bus: EventBus<&str> = EventBus::new();
        bus.publish("merged");
        assert_eq!(bus.pending().len(), 1);
        bus.clear();
        assert!(bus.drain().is_empty());
    }
}
