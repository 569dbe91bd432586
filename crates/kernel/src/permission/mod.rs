//! Authority filtering and the per-session route store.

mod filter;
mod service;

pub use filter::filter_by_authority;
pub use service::PermissionService;
