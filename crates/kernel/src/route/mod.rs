//! Route catalog and tree transformations.
//!
//! The catalog is the static route tree declared by the application. It is
//! validated on load, checked against the component registry, and flattened
//! for routers that only support bounded nesting.

mod catalog;
mod component;
mod flatten;
mod node;

pub use catalog::{CatalogFormat, RouteCatalog};
pub use component::{ComponentRegistry, LazyView, StaticView, View, ViewLoader};
pub use flatten::flatten;
pub use node::{ComponentRef, RouteBody, RouteMeta, RouteNode, RouteRecord, join_path};
