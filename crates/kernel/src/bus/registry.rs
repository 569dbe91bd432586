//! Handler registry - ordered event handlers per key.
//!
//! Each key maps to its handlers in registration order. Registrations are
//! identified by a [`SubscriptionId`] handed out on subscribe; that id is
//! the only way to remove a single handler.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Event handler. A returned error is logged by the bus and does not stop
/// other handlers.
pub type Handler<P> = Arc<dyn Fn(&P) -> anyhow::Result<()> + Send + Sync>;

/// Opaque token identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A registered handler.
pub struct Registration<P> {
    pub id: SubscriptionId,
    pub handler: Handler<P>,
    /// Removed after its first delivery.
    pub once: bool,
}

impl<P> Clone for Registration<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
            once: self.once,
        }
    }
}

/// Map from event key to ordered registrations.
pub struct HandlerRegistry<P> {
    handlers: HashMap<String, Vec<Registration<P>>>,
    next_id: u64,
}

impl<P> HandlerRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            next_id: 1,
        }
    }

    /// Append a handler for `key`.
    pub fn insert(&mut self, key: &str, handler: Handler<P>, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(key.to_string())
            .or_default()
            .push(Registration { id, handler, once });
        id
    }

    /// Remove one registration. Returns false if it was already gone.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let mut emptied = None;
        let mut found = false;
        for (key, list) in &mut self.handlers {
            if let Some(pos) = list.iter().position(|r| r.id == id) {
                list.remove(pos);
                found = true;
                if list.is_empty() {
                    emptied = Some(key.clone());
                }
                break;
            }
        }
        if let Some(key) = emptied {
            self.handlers.remove(&key);
        }
        found
    }

    /// Remove every handler for `key`. Returns how many were removed.
    pub fn remove_key(&mut self, key: &str) -> usize {
        self.handlers.remove(key).map_or(0, |list| list.len())
    }

    /// Remove every key and handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Copy the handlers for `key`, in order, and retire the one-shot ones.
    ///
    /// The copy is what an emit iterates, so handlers subscribing or
    /// unsubscribing during delivery do not affect it.
    pub fn snapshot(&mut self, key: &str) -> Vec<Registration<P>> {
        let Some(list) = self.handlers.get_mut(key) else {
            return Vec::new();
        };
        let snapshot = list.clone();
        list.retain(|r| !r.once);
        if list.is_empty() {
            self.handlers.remove(key);
        }
        snapshot
    }

    /// Number of handlers registered for `key`.
    pub fn handler_count(&self, key: &str) -> usize {
        self.handlers.get(key).map_or(0, Vec::len)
    }

    /// Keys with at least one handler.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Whether no handler is registered under any key.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<P> Default for HandlerRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
