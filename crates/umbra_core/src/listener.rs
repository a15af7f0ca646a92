//! Listener registries and subscription tokens
//!
//! A [`ListenerList`] keeps callbacks in registration order. Registering the
//! same `Arc` twice returns the original ID instead of adding a duplicate.
//! Dispatch works on a [`snapshot`](ListenerList::snapshot) so the owning
//! lock can be released before any callback runs.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::id::{IdGenerator, SubscriberId};

/// Ordered, identity-deduplicated list of listeners
pub struct ListenerList<F: ?Sized> {
    entries: Vec<(SubscriberId, Arc<F>)>,
    ids: IdGenerator,
}

impl<F: ?Sized> ListenerList<F> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            ids: IdGenerator::new(),
        }
    }

    /// Register a listener.
    ///
    /// Returns the existing ID if this exact `Arc` is already registered.
    pub fn insert(&mut self, listener: Arc<F>) -> SubscriberId {
        if let Some(id) = self.find(&listener) {
            return id;
        }

        let id = self.ids.next();
        self.entries.push((id, listener));
        id
    }

    /// Find the ID a listener was registered under, compared by identity
    pub fn find(&self, listener: &Arc<F>) -> Option<SubscriberId> {
        let target = Arc::as_ptr(listener) as *const ();
        self.entries
            .iter()
            .find(|(_, existing)| Arc::as_ptr(existing) as *const () == target)
            .map(|(id, _)| *id)
    }

    /// Remove a listener. Removing an unknown ID is a no-op.
    pub fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    /// Look up a listener by ID
    pub fn get(&self, id: SubscriberId) -> Option<&Arc<F>> {
        // IDs are handed out in increasing order and removal keeps order
        self.entries
            .binary_search_by_key(&id, |(existing, _)| *existing)
            .ok()
            .map(|index| &self.entries[index].1)
    }

    /// Check whether an ID is still registered
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.get(id).is_some()
    }

    /// Clone the current listeners, in registration order
    pub fn snapshot(&self) -> Vec<(SubscriberId, Arc<F>)> {
        self.entries
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect()
    }

    /// Remove every listener
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: ?Sized> Default for ListenerList<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Something a [`Subscription`] can be cancelled against
pub trait Unsubscribe: Send + Sync {
    /// Remove the registration. Must be idempotent.
    fn unsubscribe(&self, id: SubscriberId) -> bool;
}

impl<F: ?Sized + Send + Sync> Unsubscribe for Mutex<ListenerList<F>> {
    fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.lock().remove(id)
    }
}

/// Token returned by `subscribe` calls.
///
/// Dropping the token does not unsubscribe; call [`Subscription::unsubscribe`].
/// The token only holds a weak reference, so it never keeps its registry alive.
#[derive(Clone)]
pub struct Subscription {
    id: SubscriberId,
    owner: Option<Weak<dyn Unsubscribe>>,
}

impl Subscription {
    /// Create a token bound to a registry
    pub fn new(id: SubscriberId, owner: Weak<dyn Unsubscribe>) -> Self {
        Self {
            id,
            owner: Some(owner),
        }
    }

    /// Create a token that is not attached to anything
    pub fn inert() -> Self {
        Self {
            id: SubscriberId::INERT,
            owner: None,
        }
    }

    /// Get the subscriber ID
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Check whether this token was never registered
    pub fn is_inert(&self) -> bool {
        self.owner.is_none()
    }

    /// Cancel the registration.
    ///
    /// Returns `true` only for the call that actually removed the listener.
    pub fn unsubscribe(&self) -> bool {
        self.owner
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|owner| owner.unsubscribe(self.id))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("inert", &self.is_inert())
            .finish()
    }
}
