//! View component registry.
//!
//! Routes refer to views by key. The registry maps keys to loader
//! capabilities; loading is deferred until a view is first needed.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::node::{ComponentRef, RouteNode};
use crate::error::{RouteError, RouteResult};

/// A loaded, renderable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Registry key the view was loaded from.
    pub key: String,
    /// Resolved module or asset identifier.
    pub source: String,
}

/// Capability that produces a view on demand.
pub trait ViewLoader: Send + Sync {
    fn load(&self) -> anyhow::Result<View>;
}

/// Loader for views that are available up front.
#[derive(Debug, Clone)]
pub struct StaticView(pub View);

impl ViewLoader for StaticView {
    fn load(&self) -> anyhow::Result<View> {
        Ok(self.0.clone())
    }
}

type LoadFn = dyn Fn() -> anyhow::Result<View> + Send + Sync;

/// Loader that runs its load function once and caches the view.
///
/// A failed load is not cached; the next call tries again.
pub struct LazyView {
    load: Box<LoadFn>,
    loaded: OnceLock<View>,
}

impl LazyView {
    /// Wrap a load function; it runs on first use.
    pub fn new(load: impl Fn() -> anyhow::Result<View> + Send + Sync + 'static) -> Self {
        Self {
            load: Box::new(load),
            loaded: OnceLock::new(),
        }
    }

    /// Whether the view has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }
}

impl fmt::Debug for LazyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyView")
            .field("loaded", &self.loaded.get())
            .finish_non_exhaustive()
    }
}

impl ViewLoader for LazyView {
    fn load(&self) -> anyhow::Result<View> {
        if let Some(view) = self.loaded.get() {
            return Ok(view.clone());
        }
        let view = (self.load)()?;
        Ok(self.loaded.get_or_init(|| view).clone())
    }
}

/// Registry of view loaders keyed by component reference.
#[derive(Default)]
pub struct ComponentRegistry {
    loaders: HashMap<String, Arc<dyn ViewLoader>>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader, replacing any previous one for `key`.
    pub fn register(&mut self, key: impl Into<String>, loader: Arc<dyn ViewLoader>) {
        self.loaders.insert(key.into(), loader);
    }

    /// Whether a loader is registered for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.loaders.contains_key(key)
    }

    /// Number of registered loaders.
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Whether no loader is registered.
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Look up the loader for a route's component.
    pub fn resolve(&self, route: &RouteNode) -> RouteResult<Option<Arc<dyn ViewLoader>>> {
        route
            .component()
            .map(|component| self.loader_for(&route.name, component))
            .transpose()
    }

    fn loader_for(&self, route: &str, component: &ComponentRef) -> RouteResult<Arc<dyn ViewLoader>> {
        self.loaders
            .get(component.as_str())
            .cloned()
            .ok_or_else(|| RouteError::UnknownComponent {
                route: route.to_string(),
                component: component.as_str().to_string(),
            })
    }

    /// Check that every component referenced in `routes` is registered.
    pub fn check(&self, routes: &[RouteNode]) -> RouteResult<()> {
        for route in routes {
            self.resolve(route)?;
            self.check(route.children())?;
        }
        Ok(())
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.loaders.keys().collect();
        keys.sort();
        f.debug_struct("ComponentRegistry").field("keys", &keys).finish()
    }
}
