//! Waypoint Kernel Library
//!
//! Builds permission-filtered route sets and navigation menus from a static
//! route catalog, and carries route change notifications to listeners.
//! The `waypoint` binary exposes the builder on the command line.

pub mod authority;
pub mod builder;
pub mod bus;
pub mod config;
pub mod error;
pub mod menu;
pub mod permission;
pub mod route;

pub use authority::{Authority, AuthorityRule};
pub use builder::{BuildOptions, RouteSet, build_routes, build_routes_checked};
pub use bus::{EventBus, RouteChange, RouteChangeBus, SubscriptionId};
pub use config::Config;
pub use error::{RouteError, RouteResult};
pub use menu::{MenuNode, to_menu};
pub use permission::{PermissionService, filter_by_authority};
pub use route::{RouteCatalog, RouteMeta, RouteNode, flatten};
