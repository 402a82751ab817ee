//! Event bus for session lifecycle notifications.
//!
//! One event kind matters to the session kernel: [`SessionEvent::SessionRenewed`],
//! published when an expired session is replaced by a newly sampled one.
//! Delivery is synchronous callback fanout in subscription order; the model
//! is single-threaded and non-blocking, so there are no channels or queues.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Session lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// An expired session record was replaced by a newly sampled one.
    /// Never published for the first decision of a visit.
    SessionRenewed,
}

/// Handle identifying a subscription, for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&SessionEvent) + Send>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<(u64, Callback)>,
}

/// Publish/subscribe channel for [`SessionEvent`]s.
///
/// Subscribers are invoked in subscription order. Callbacks run while the
/// bus lock is held: they must not subscribe, unsubscribe, or publish.
#[derive(Default)]
pub struct EventBus {
    inner: Mutex<BusInner>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every published event.
    pub fn subscribe(&self, callback: impl FnMut(&SessionEvent) + Send + 'static) -> SubscriptionId {
        let mut inner = self.inner.lock().expect("event bus mutex poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock().expect("event bus mutex poisoned");
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sub_id, _)| *sub_id != id.0);
        inner.subscribers.len() != before
    }

    /// Deliver an event to all subscribers in subscription order.
    pub fn publish(&self, event: &SessionEvent) {
        let mut inner = self.inner.lock().expect("event bus mutex poisoned");
        for (_, callback) in &mut inner.subscribers {
            callback(event);
        }
    }

    /// Current number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let inner = self.inner.lock().expect("event bus mutex poisoned");
        inner.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
