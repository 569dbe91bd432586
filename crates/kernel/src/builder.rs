//! Route set builder: catalog → flatten → filter → menu.

use serde::Serialize;
use tracing::debug;

use crate::authority::Authority;
use crate::error::RouteResult;
use crate::menu::{MenuNode, to_menu};
use crate::permission::filter_by_authority;
use crate::route::{ComponentRegistry, RouteCatalog, RouteNode, flatten};

/// Default pinned home page.
pub const DEFAULT_HOME_PATH: &str = "/home";

/// Default nesting depth supported by the router (roots plus one level).
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Parameters of a route build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Path of the pinned home entry.
    pub home_path: String,
    /// Deepest route level the router can register.
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            home_path: DEFAULT_HOME_PATH.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Routes and menu visible to one authority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSet {
    /// Flattened routes to register with the router.
    pub routes: Vec<RouteNode>,
    /// Navigation menu.
    pub menu: Vec<MenuNode>,
}

impl RouteSet {
    /// Total number of registered routes.
    pub fn route_count(&self) -> usize {
        self.routes.iter().map(RouteNode::count).sum()
    }

    /// Total number of menu entries.
    pub fn menu_count(&self) -> usize {
        self.menu.iter().map(MenuNode::count).sum()
    }
}

/// Build the routes and menu `authority` may see.
pub fn build_routes(
    catalog: &RouteCatalog,
    authority: Option<Authority>,
    options: &BuildOptions,
) -> RouteResult<RouteSet> {
    let flat = flatten(catalog.routes(), options.max_depth)?;
    let routes = filter_by_authority(&flat, authority);
    let menu = to_menu(&routes, &options.home_path);
    let set = RouteSet { routes, menu };

    debug!(
        authority = authority.map_or("none", Authority::as_str),
        routes = set.route_count(),
        menu = set.menu_count(),
        "built route set"
    );
    Ok(set)
}

/// [`build_routes`] after checking every component reference in `catalog`
/// against `registry`.
pub fn build_routes_checked(
    catalog: &RouteCatalog,
    authority: Option<Authority>,
    options: &BuildOptions,
    registry: &ComponentRegistry,
) -> RouteResult<RouteSet> {
    registry.check(catalog.routes())?;
    build_routes(catalog, authority, options)
}
