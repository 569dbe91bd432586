//! Publish/subscribe bus for navigation events.
//!
//! Handlers are kept per key in subscription order and removed with the
//! [`SubscriptionId`] returned on subscribe. Emits are synchronous; a failing
//! handler is logged and never reaches the emitter.

mod dispatcher;
mod registry;
mod route_change;

pub use dispatcher::{EmitReport, EventBus};
pub use registry::{Handler, HandlerRegistry, Registration, SubscriptionId};
pub use route_change::{ROUTE_CHANGE, RouteChange, RouteChangeBus};
