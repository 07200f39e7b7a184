//! Notification dispatch.
//!
//! The session only needs something it can hand an [`Event`] to.
//! [`Hooks`] is the registry implementation: any number of independent
//! subscribers per event kind, each removable through its token.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::events::{Event, EventKind};

pub trait NotificationDispatcher: Send + Sync {
    /// Deliver `event`. Fire-and-forget; nothing is returned to the session.
    fn notify(&self, event: &Event);
}

/// Token returned by [`Hooks::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type HookFn = Arc<dyn Fn(&Event) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    callback: HookFn,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

#[derive(Default)]
pub struct Hooks {
    registry: Mutex<Registry>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry.subscribers.push(Subscriber {
            id,
            kind,
            callback: Arc::new(callback),
        });
        id
    }

    /// Returns false if the token was unknown or already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let before = registry.subscribers.len();
        registry.subscribers.retain(|s| s.id != id);
        registry.subscribers.len() != before
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }
}

impl NotificationDispatcher for Hooks {
    fn notify(&self, event: &Event) {
        let kind = event.kind();
        // Callbacks run outside the lock so they may (un)subscribe.
        let callbacks: Vec<HookFn> = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.callback))
            .collect();

        trace!(event = %kind, subscribers = callbacks.len(), "dispatching");
        for callback in callbacks {
            callback(event);
        }
    }
}
