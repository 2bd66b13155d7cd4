//! Synchronous pub/sub over [`SimEvent`] (spec §4.10, §9 "Event emitter").
//!
//! Grounded on the teacher's `EventBus` (`src/app/events.rs`): a flat list
//! of boxed handlers invoked in subscription order. Extended with per-kind
//! filtering and a subscription id so callers can `unsubscribe`, which the
//! teacher's bus doesn't need since it never outlives one `App`. No
//! listener may recursively step the simulation — enforced by ownership,
//! not a lock: `publish` only ever borrows `&SimEvent`, never `&mut
//! Simulation`.

use evo_data::{EventKind, SimEvent};

pub type EventHandler = Box<dyn FnMut(&SimEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kinds: Option<Vec<EventKind>>,
    handler: EventHandler,
}

/// Dispatches every tick's events to interested subscribers. Subscribers
/// that pass `None` for `kinds` see every event; otherwise only events
/// whose `kind()` is in the list.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every event kind.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&SimEvent) + 'static,
    {
        self.subscribe_to(None, handler)
    }

    /// Subscribe to a specific subset of event kinds.
    pub fn subscribe_to<F>(&mut self, kinds: Option<Vec<EventKind>>, handler: F) -> SubscriptionId
    where
        F: FnMut(&SimEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            kinds,
            handler: Box::new(handler),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.retain(|s| s.id != id);
    }

    pub fn publish(&mut self, event: &SimEvent) {
        let kind = event.kind();
        for sub in &mut self.subscriptions {
            if sub.kinds.as_ref().map_or(true, |kinds| kinds.contains(&kind)) {
                (sub.handler)(event);
            }
        }
    }

    pub fn publish_all(&mut self, events: &[SimEvent]) {
        for event in events {
            self.publish(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribe_all_receives_every_event() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        bus.subscribe(move |_| *c.borrow_mut() += 1);

        bus.publish(&SimEvent::Paused);
        bus.publish(&SimEvent::Resumed);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_subscribe_to_filters_by_kind() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        bus.subscribe_to(Some(vec![EventKind::Paused]), move |_| *c.borrow_mut() += 1);

        bus.publish(&SimEvent::Resumed);
        bus.publish(&SimEvent::Paused);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = bus.subscribe(move |_| *c.borrow_mut() += 1);

        bus.publish(&SimEvent::Paused);
        bus.unsubscribe(id);
        bus.publish(&SimEvent::Paused);
        assert_eq!(*count.borrow(), 1);
    }
}
