//! Route change notifications.
//!
//! The router reports every completed navigation here; tab bars, breadcrumbs
//! and view caches listen. The last change is remembered so late listeners
//! can catch up immediately.

use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::dispatcher::{EmitReport, EventBus, invoke};
use super::registry::{Handler, SubscriptionId};
use crate::menu::MenuNode;

/// Event key used for route changes.
pub const ROUTE_CHANGE: &str = "route-change";

/// A completed navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteChange {
    /// Absolute path navigated to.
    pub path: String,
    pub name: String,
    pub title: String,
    /// Path navigated away from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl RouteChange {
    /// Navigation to a menu entry.
    pub fn from_menu_entry(entry: &MenuNode, from: Option<&str>) -> Self {
        Self {
            path: entry.path.clone(),
            name: entry.name.clone(),
            title: entry.title.clone(),
            from: from.map(str::to_string),
        }
    }
}

/// Event bus specialised for route changes.
#[derive(Default)]
pub struct RouteChangeBus {
    bus: EventBus<RouteChange>,
    last: Mutex<Option<RouteChange>>,
}

impl RouteChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide bus.
    pub fn global() -> &'static RouteChangeBus {
        static GLOBAL: OnceLock<RouteChangeBus> = OnceLock::new();
        GLOBAL.get_or_init(RouteChangeBus::new)
    }

    /// Underlying keyed bus.
    pub fn bus(&self) -> &EventBus<RouteChange> {
        &self.bus
    }

    /// Record a navigation and notify listeners.
    pub fn set_route_change(&self, change: RouteChange) -> EmitReport {
        *self.last.lock() = Some(change.clone());
        self.bus.emit(ROUTE_CHANGE, &change)
    }

    /// Listen for route changes. With `immediate`, the handler is also run
    /// right away with the last recorded change, if there is one.
    pub fn listen_route_change<F>(&self, handler: F, immediate: bool) -> SubscriptionId
    where
        F: Fn(&RouteChange) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let handler: Handler<RouteChange> = std::sync::Arc::new(handler);
        let id = self.bus.subscribe(ROUTE_CHANGE, handler.clone(), false);
        if immediate {
            let last = self.last.lock().clone();
            if let Some(change) = last {
                invoke(ROUTE_CHANGE, id, &handler, &change);
            }
        }
        id
    }

    /// Stop listening.
    pub fn remove_listener(&self, id: SubscriptionId) -> bool {
        self.bus.off(id)
    }

    /// Last recorded change.
    pub fn last_change(&self) -> Option<RouteChange> {
        self.last.lock().clone()
    }

    /// Drop every listener and forget the last change (logout, teardown).
    pub fn clear(&self) {
        self.bus.clear();
        *self.last.lock() = None;
    }
}
