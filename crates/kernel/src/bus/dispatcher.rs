//! Event bus - delivers payloads to subscribed handlers in order.
//!
//! Delivery is synchronous and runs over a snapshot of the handler list, so
//! handlers may subscribe or unsubscribe while an emit is in flight. A
//! handler that errors or panics is logged and skipped; the rest still run.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use super::registry::{Handler, HandlerRegistry, SubscriptionId};

/// Outcome of one emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Handlers that returned `Ok`.
    pub delivered: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// Keyed publish/subscribe bus.
pub struct EventBus<P> {
    registry: Mutex<HandlerRegistry<P>>,
}

impl<P> EventBus<P> {
    /// Create an event bus with no subscriptions.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(HandlerRegistry::new()),
        }
    }

    /// Subscribe `handler` to `key` until removed with [`off`](Self::off).
    pub fn on<F>(&self, key: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&P) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe(key, Arc::new(handler), false)
    }

    /// Subscribe `handler` to the next emit of `key` only.
    pub fn once<F>(&self, key: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&P) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe(key, Arc::new(handler), true)
    }

    /// Subscribe a shared handler.
    pub fn subscribe(&self, key: &str, handler: Handler<P>, once: bool) -> SubscriptionId {
        let id = self.registry.lock().insert(key, handler, once);
        debug!(key = %key, subscription = %id, once, "handler subscribed");
        id
    }

    /// Remove one subscription. Returns false if it was already gone.
    pub fn off(&self, id: SubscriptionId) -> bool {
        self.registry.lock().remove(id)
    }

    /// Remove every handler for `key`. Returns how many were removed.
    pub fn off_key(&self, key: &str) -> usize {
        self.registry.lock().remove_key(key)
    }

    /// Remove every key and handler.
    pub fn clear(&self) {
        self.registry.lock().clear();
        debug!("event bus cleared");
    }

    /// Number of handlers subscribed to `key`.
    pub fn handler_count(&self, key: &str) -> usize {
        self.registry.lock().handler_count(key)
    }

    /// Deliver `payload` to every handler of `key`, in subscription order.
    pub fn emit(&self, key: &str, payload: &P) -> EmitReport {
        // The lock is released before any handler runs.
        let handlers = self.registry.lock().snapshot(key);
        if handlers.is_empty() {
            debug!(key = %key, "no handlers subscribed");
            return EmitReport::default();
        }

        let mut report = EmitReport::default();
        for registration in &handlers {
            if invoke(key, registration.id, &registration.handler, payload) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one handler, containing errors and panics. Returns true on success.
pub(crate) fn invoke<P>(key: &str, id: SubscriptionId, handler: &Handler<P>, payload: &P) -> bool {
    match catch_unwind(AssertUnwindSafe(|| handler(payload))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(key = %key, subscription = %id, error = %e, "event handler failed");
            false
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(key = %key, subscription = %id, panic = %message, "event handler panicked");
            false
        }
    }
}
