use std::sync::{Arc, Mutex, PoisonError, Weak};

use bevy::prelude::*;

/// Which editing affordances are currently interactable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Affordances {
    pub undo: bool,
    pub redo: bool,
    pub save: bool,
    pub load: bool,
}

type Listener = Arc<dyn Fn(&Affordances) + Send + Sync>;

#[derive(Default)]
struct HubInner {
    next_key: u64,
    listeners: Vec<(u64, Listener)>,
    current: Affordances,
}

/// Shared listener list for affordance changes.
///
/// Cloning the hub shares the same listeners, so UI code can hold one copy
/// while the publishing system owns another.
#[derive(Clone, Default)]
pub struct SignalHub(Arc<Mutex<HubInner>>);

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. It stays registered for as long as the returned
    /// guard lives; the current state is delivered immediately.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Affordances) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let (key, current) = {
            let mut inner = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            let key = inner.next_key;
            inner.next_key += 1;
            inner.listeners.push((key, listener.clone()));
            (key, inner.current)
        };
        listener(&current);

        Subscription {
            hub: Arc::downgrade(&self.0),
            key,
        }
    }

    pub fn current(&self) -> Affordances {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).current
    }

    pub fn listener_count(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).listeners.len()
    }

    /// Store `next` and notify listeners if it differs from the current state.
    /// Returns whether anything was published.
    pub fn publish(&self, next: Affordances) -> bool {
        let listeners: Vec<Listener> = {
            let mut inner = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            if inner.current == next {
                return false;
            }
            inner.current = next;
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        // Called outside the lock so listeners may subscribe or drop guards.
        for listener in listeners {
            listener(&next);
        }
        true
    }
}

impl std::fmt::Debug for SignalHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalHub")
            .field("current", &self.current())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Scoped listener registration. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    hub: Weak<Mutex<HubInner>>,
    key: u64,
}

impl Subscription {
    /// Unsubscribe now. Same as dropping the guard.
    pub fn release(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(hub) = self.hub.upgrade() else { return };
        let mut inner = hub.lock().unwrap_or_else(PoisonError::into_inner);
        inner.listeners.retain(|(key, _)| *key != self.key);
    }
}

/// The hub as a Bevy resource, shared with UI code through `hub()`.
#[derive(Resource, Clone, Debug, Default)]
pub struct AffordanceHub(pub SignalHub);

impl AffordanceHub {
    pub fn hub(&self) -> SignalHub {
        self.0.clone()
    }
}

/// Fired whenever the published affordances change.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffordancesChanged(pub Affordances);
