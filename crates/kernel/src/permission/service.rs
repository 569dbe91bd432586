//! Permission service - owns the route set of the signed-in session.
//!
//! Route sets are built once per authority and cached; login, logout and
//! authority switches swap the session's set instead of editing it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::authority::Authority;
use crate::builder::{BuildOptions, RouteSet, build_routes};
use crate::error::RouteResult;
use crate::route::{ComponentRegistry, RouteCatalog};

/// Session state: who is signed in and what they can see.
#[derive(Debug, Default)]
struct Session {
    authenticated: bool,
    authority: Option<Authority>,
    routes: Option<Arc<RouteSet>>,
    last_build: Option<DateTime<Utc>>,
}

/// Permission service with per-authority route set caching.
#[derive(Clone)]
pub struct PermissionService {
    inner: Arc<PermissionServiceInner>,
}

struct PermissionServiceInner {
    /// Current catalog; replaced wholesale on reload.
    catalog: RwLock<CatalogSlot>,

    options: BuildOptions,

    /// Cache of authority -> built route set.
    cache: DashMap<Option<Authority>, Arc<RouteSet>>,

    session: RwLock<Session>,
}

/// Catalog plus a counter bumped on every reload.
///
/// Cache inserts happen under the read lock and only for the generation the
/// set was built from; reload swaps and clears under the write lock.
struct CatalogSlot {
    catalog: Arc<RouteCatalog>,
    generation: u64,
}

impl PermissionService {
    /// Create a permission service over `catalog`.
    pub fn new(catalog: RouteCatalog, options: BuildOptions) -> Self {
        Self {
            inner: Arc::new(PermissionServiceInner {
                catalog: RwLock::new(CatalogSlot {
                    catalog: Arc::new(catalog),
                    generation: 0,
                }),
                options,
                cache: DashMap::new(),
                session: RwLock::new(Session::default()),
            }),
        }
    }

    /// Create a permission service after checking every component reference
    /// in `catalog` against `registry`.
    pub fn with_registry(
        catalog: RouteCatalog,
        options: BuildOptions,
        registry: &ComponentRegistry,
    ) -> RouteResult<Self> {
        registry.check(catalog.routes())?;
        Ok(Self::new(catalog, options))
    }

    /// Build options in effect.
    pub fn options(&self) -> &BuildOptions {
        &self.inner.options
    }

    /// Current catalog.
    pub fn catalog(&self) -> Arc<RouteCatalog> {
        self.inner.catalog.read().catalog.clone()
    }

    /// Route set visible to `authority`, from cache when possible.
    pub fn route_set(&self, authority: Option<Authority>) -> RouteResult<Arc<RouteSet>> {
        if let Some(cached) = self.inner.cache.get(&authority) {
            return Ok(cached.value().clone());
        }

        let (catalog, generation) = {
            let slot = self.inner.catalog.read();
            (slot.catalog.clone(), slot.generation)
        };
        let set = Arc::new(build_routes(&catalog, authority, &self.inner.options)?);

        let slot = self.inner.catalog.read();
        if slot.generation == generation {
            self.inner.cache.insert(authority, Arc::clone(&set));
        } else {
            debug!(
                authority = authority.map_or("none", Authority::as_str),
                "catalog reloaded during build, not caching"
            );
        }
        Ok(set)
    }

    /// Start a session for a principal with `authority` (none = no role).
    pub fn login(&self, authority: Option<Authority>) -> RouteResult<Arc<RouteSet>> {
        let set = self.route_set(authority)?;
        let mut session = self.inner.session.write();
        session.authenticated = true;
        session.authority = authority;
        session.routes = Some(Arc::clone(&set));
        session.last_build = Some(Utc::now());
        info!(
            authority = authority.map_or("none", Authority::as_str),
            routes = set.route_count(),
            "session routes built"
        );
        Ok(set)
    }

    /// Switch the signed-in principal to another authority.
    ///
    /// Behaves like a fresh login when nobody is signed in.
    pub fn switch_authority(&self, authority: Option<Authority>) -> RouteResult<Arc<RouteSet>> {
        self.login(authority)
    }

    /// End the session and drop its routes.
    pub fn logout(&self) {
        *self.inner.session.write() = Session::default();
        debug!("session routes cleared");
    }

    /// Whether a principal is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.inner.session.read().authenticated
    }

    /// Authority of the signed-in principal.
    pub fn current_authority(&self) -> Option<Authority> {
        self.inner.session.read().authority
    }

    /// Route set of the signed-in principal.
    pub fn current(&self) -> Option<Arc<RouteSet>> {
        self.inner.session.read().routes.clone()
    }

    /// When the session's route set was last (re)assigned.
    pub fn last_build(&self) -> Option<DateTime<Utc>> {
        self.inner.session.read().last_build
    }

    /// Replace the catalog, drop cached sets, and rebuild the session's
    /// routes if someone is signed in.
    pub fn reload(&self, catalog: RouteCatalog) -> RouteResult<()> {
        {
            let mut slot = self.inner.catalog.write();
            slot.catalog = Arc::new(catalog);
            slot.generation += 1;
            self.invalidate_all();
        }

        let session = {
            let s = self.inner.session.read();
            s.authenticated.then_some(s.authority)
        };
        if let Some(authority) = session {
            self.login(authority)?;
        }
        Ok(())
    }

    /// Invalidate the cached route set for one authority.
    pub fn invalidate(&self, authority: Option<Authority>) {
        self.inner.cache.remove(&authority);
    }

    /// Invalidate every cached route set.
    pub fn invalidate_all(&self) {
        self.inner.cache.clear();
    }

    /// Number of cached route sets (for monitoring).
    pub fn cache_size(&self) -> usize {
        self.inner.cache.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::authority::AuthorityRule;
    use crate::route::{ComponentRef, RouteMeta, RouteNode, StaticView, View};

    fn gated(path: &str, name: &str, authority: Authority) -> RouteNode {
        let meta = RouteMeta {
            title: name.to_string(),
            authority: Some(AuthorityRule::One(authority)),
            ..Default::default()
        };
        RouteNode::leaf(path, name, None, meta)
    }

    fn catalog() -> RouteCatalog {
        RouteCatalog::from_routes(vec![
            RouteNode::leaf("/home", "Home", None, RouteMeta::titled("Home")),
            gated("/tenants", "Tenants", Authority::SysAdmin),
            gated("/customers", "Customers", Authority::TenantAdmin),
        ])
        .unwrap()
    }

    fn service() -> PermissionService {
        PermissionService::new(catalog(), BuildOptions::default())
    }

    #[test]
    fn route_sets_are_cached_per_authority() {
        let service = service();
        let a = service.route_set(Some(Authority::SysAdmin)).unwrap();
        let b = service.route_set(Some(Authority::SysAdmin)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        service.route_set(None).unwrap();
        assert_eq!(service.cache_size(), 2);

        service.invalidate(None);
        assert_eq!(service.cache_size(), 1);
        service.invalidate_all();
        assert_eq!(service.cache_size(), 0);
    }

    #[test]
    fn login_switch_logout() {
        let service = service();
        assert!(!service.is_authenticated());
        assert!(service.current().is_none());

        let set = service.login(Some(Authority::SysAdmin)).unwrap();
        assert!(service.is_authenticated());
        assert_eq!(set.route_count(), 2);
        assert!(service.last_build().is_some());

        let set = service.switch_authority(Some(Authority::TenantAdmin)).unwrap();
        assert_eq!(service.current_authority(), Some(Authority::TenantAdmin));
        assert_eq!(set.routes[1].name, "Customers");
        assert!(Arc::ptr_eq(&set, &service.current().unwrap()));

        service.logout();
        assert!(!service.is_authenticated());
        assert!(service.current().is_none());
        assert!(service.last_build().is_none());
    }

    #[test]
    fn login_without_role_sees_ungated_routes() {
        let service = service();
        let set = service.login(None).unwrap();
        assert!(service.is_authenticated());
        assert_eq!(set.route_count(), 1);
    }

    #[test]
    fn reload_rebuilds_session() {
        let service = service();
        service.login(Some(Authority::TenantAdmin)).unwrap();
        service.route_set(Some(Authority::SysAdmin)).unwrap();

        let smaller = RouteCatalog::from_routes(vec![RouteNode::leaf(
            "/home",
            "Home",
            None,
            RouteMeta::titled("Home"),
        )])
        .unwrap();
        service.reload(smaller).unwrap();

        assert_eq!(service.current().unwrap().route_count(), 1);
        assert_eq!(service.cache_size(), 1);
        assert_eq!(service.catalog().len(), 1);
    }

    #[test]
    fn reload_never_leaves_old_catalog_cached() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let one_route = || {
            RouteCatalog::from_routes(vec![RouteNode::leaf(
                "/home",
                "Home",
                None,
                RouteMeta::titled("Home"),
            )])
            .unwrap()
        };

        for _ in 0..200 {
            let service = service();
            let done = AtomicBool::new(false);
            std::thread::scope(|scope| {
                scope.spawn(|| {
                    while !done.load(Ordering::Relaxed) {
                        service.route_set(Some(Authority::SysAdmin)).unwrap();
                    }
                });
                service.invalidate(Some(Authority::SysAdmin));
                service.reload(one_route()).unwrap();
                done.store(true, Ordering::Relaxed);
            });

            let set = service.route_set(Some(Authority::SysAdmin)).unwrap();
            assert_eq!(set.route_count(), 1);
        }
    }

    #[test]
    fn with_registry_checks_components() {
        let catalog = RouteCatalog::from_routes(vec![RouteNode::leaf(
            "/home",
            "Home",
            Some(ComponentRef::new("HomePage")),
            RouteMeta::titled("Home"),
        )])
        .unwrap();

        let mut registry = ComponentRegistry::new();
        assert!(
            PermissionService::with_registry(catalog.clone(), BuildOptions::default(), &registry)
                .is_err()
        );

        registry.register(
            "HomePage",
            Arc::new(StaticView(View {
                key: "HomePage".to_string(),
                source: "views/home.vue".to_string(),
            })),
        );
        assert!(
            PermissionService::with_registry(catalog, BuildOptions::default(), &registry).is_ok()
        );
    }
}
