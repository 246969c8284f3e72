//! Change-notification subscriptions
//!
//! Subscribers receive an immutable snapshot after every tick or command
//! that produced an observable change. Delivery happens in subscription
//! order, on the caller's thread; callbacks get a shared reference and
//! cannot reach back into the engine.

use crate::engine::snapshot::EngineSnapshot;

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

type SnapshotCallback = Box<dyn FnMut(&EngineSnapshot)>;

/// Ordered registry of snapshot subscribers
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, SnapshotCallback)>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: SnapshotCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, callback));
        id
    }

    /// Remove a subscriber; returns false when the id was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn notify(&mut self, snapshot: &EngineSnapshot) {
        for (_, callback) in &mut self.subscribers {
            callback(snapshot);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }
}
