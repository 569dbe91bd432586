//! Navigation menu derived from the permission-filtered route tree.
//!
//! The menu is display-only: it carries titles, icons, absolute paths and
//! the pinned flag, and is rebuilt whenever the visible routes change.

mod projector;

pub use projector::{MenuNode, to_menu};
