//! Route building error types.
//!
//! Every problem with a route catalog is a configuration error: it is
//! surfaced at startup and the kernel does not try to recover from it.

use thiserror::Error;

/// Maximum nesting accepted anywhere in a route tree.
///
/// Anything deeper is treated as a malformed (likely cyclic) catalog.
pub const MAX_NESTING: usize = 50;

/// Errors raised while loading, validating, or transforming routes.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The catalog violates a structural invariant.
    #[error("route configuration error: {0}")]
    Configuration(String),

    /// A route references a component key the registry does not know.
    #[error("route '{route}': unknown component '{component}'")]
    UnknownComponent { route: String, component: String },

    /// A catalog file could not be read.
    #[error("failed to read route catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A catalog document could not be parsed.
    #[error("failed to parse {format} route catalog: {details}")]
    Parse { format: String, details: String },
}

impl RouteError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Nesting exceeded [`MAX_NESTING`] below the named route.
    pub fn too_deep(route: impl AsRef<str>) -> Self {
        Self::Configuration(format!(
            "route '{}' is nested deeper than {MAX_NESTING} levels; check the catalog for cycles",
            route.as_ref()
        ))
    }

    /// Two routes share a name.
    pub fn duplicate_name(name: impl AsRef<str>) -> Self {
        Self::Configuration(format!(
            "route name '{}' is declared more than once; names must be unique across the catalog",
            name.as_ref()
        ))
    }

    /// Two siblings share a path.
    pub fn duplicate_path(parent: Option<&str>, path: impl AsRef<str>) -> Self {
        Self::Configuration(format!(
            "path '{}' is declared twice under {}",
            path.as_ref(),
            parent.map_or_else(|| "the catalog root".to_string(), |p| format!("'{p}'"))
        ))
    }

    /// Create a parse error.
    pub fn parse(format: impl Into<String>, details: impl ToString) -> Self {
        Self::Parse {
            format: format.into(),
            details: details.to_string(),
        }
    }
}

/// Result type alias using RouteError.
pub type RouteResult<T> = Result<T, RouteError>;
