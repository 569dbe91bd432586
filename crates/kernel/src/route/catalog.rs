//! Route catalog - the static, declarative route tree of the application.
//!
//! Catalogs are loaded from YAML, JSON, or TOML documents. A document is
//! either a bare list of routes or a table with a `routes` list (TOML only
//! supports the latter). Structural invariants are checked on load so the
//! transformations downstream can rely on them.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::node::RouteNode;
use crate::error::{MAX_NESTING, RouteError, RouteResult};

/// Catalog document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Yaml,
    Json,
    Toml,
}

impl CatalogFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
            Self::Toml => "TOML",
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped { routes: Vec<RouteNode> },
    List(Vec<RouteNode>),
}

impl CatalogDocument {
    fn into_routes(self) -> Vec<RouteNode> {
        match self {
            Self::Wrapped { routes } | Self::List(routes) => routes,
        }
    }
}

/// Validated, immutable route catalog.
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: Vec<RouteNode>,
}

impl RouteCatalog {
    /// Build a catalog from routes, validating it.
    pub fn from_routes(routes: Vec<RouteNode>) -> RouteResult<Self> {
        validate(&routes)?;
        let catalog = Self { routes };
        debug!(
            roots = catalog.routes.len(),
            routes = catalog.len(),
            "route catalog validated"
        );
        Ok(catalog)
    }

    /// Parse a catalog document.
    pub fn parse(content: &str, format: CatalogFormat) -> RouteResult<Self> {
        let document: CatalogDocument = match format {
            CatalogFormat::Yaml => {
                serde_yml::from_str(content).map_err(|e| RouteError::parse(format.label(), e))?
            }
            CatalogFormat::Json => {
                serde_json::from_str(content).map_err(|e| RouteError::parse(format.label(), e))?
            }
            CatalogFormat::Toml => {
                toml::from_str(content).map_err(|e| RouteError::parse(format.label(), e))?
            }
        };
        Self::from_routes(document.into_routes())
    }

    /// Load a catalog file; the format follows the extension.
    pub fn load(path: &Path) -> RouteResult<Self> {
        let format = CatalogFormat::from_path(path).ok_or_else(|| {
            RouteError::configuration(format!(
                "cannot tell the format of {}; use a .yaml, .yml, .json or .toml extension",
                path.display()
            ))
        })?;
        let content = std::fs::read_to_string(path).map_err(|source| RouteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, format)
    }

    /// Root routes, in declaration order.
    pub fn routes(&self) -> &[RouteNode] {
        &self.routes
    }

    /// Total number of routes at every depth.
    pub fn len(&self) -> usize {
        self.routes.iter().map(RouteNode::count).sum()
    }

    /// Whether the catalog has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find a route by name anywhere in the tree.
    pub fn find(&self, name: &str) -> Option<&RouteNode> {
        fn walk<'a>(nodes: &'a [RouteNode], name: &str) -> Option<&'a RouteNode> {
            nodes.iter().find_map(|node| {
                if node.name == name {
                    Some(node)
                } else {
                    walk(node.children(), name)
                }
            })
        }
        walk(&self.routes, name)
    }
}

fn validate(routes: &[RouteNode]) -> RouteResult<()> {
    let mut names = HashSet::new();
    validate_level(routes, None, 1, &mut names)
}

fn validate_level<'a>(
    nodes: &'a [RouteNode],
    parent: Option<&str>,
    depth: usize,
    names: &mut HashSet<&'a str>,
) -> RouteResult<()> {
    if depth > MAX_NESTING && !nodes.is_empty() {
        return Err(RouteError::too_deep(parent.unwrap_or("<root>")));
    }

    let mut paths = HashSet::new();
    for node in nodes {
        if node.name.trim().is_empty() {
            return Err(RouteError::configuration(format!(
                "route with path '{}' has no name",
                node.path
            )));
        }
        if node.path.is_empty() && parent.is_none() {
            return Err(RouteError::configuration(format!(
                "root route '{}' has an empty path",
                node.name
            )));
        }
        if !names.insert(node.name.as_str()) {
            return Err(RouteError::duplicate_name(&node.name));
        }
        if !paths.insert(node.path.as_str()) {
            return Err(RouteError::duplicate_path(parent, &node.path));
        }
        validate_level(node.children(), Some(&node.name), depth + 1, names)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::route::RouteMeta;

    const YAML: &str = r#"
- path: /home
  name: Home
  component: HomePage
  meta:
    title: Home
    affix: true
- path: /device
  name: Device
  component: Layout
  meta:
    title: Devices
    authority: [TENANT_ADMIN, CUSTOMER_USER]
  children:
    - path: list
      name: DeviceList
      component: DeviceTable
      meta:
        title: Device list
"#;

    #[test]
    fn parse_yaml_list() {
        let catalog = RouteCatalog::parse(YAML, CatalogFormat::Yaml).unwrap();
        assert_eq!(catalog.routes().len(), 2);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.find("DeviceList").is_some());
        assert!(catalog.find("Missing").is_none());
    }

    #[test]
    fn parse_json_wrapped() {
        let json = r#"{"routes": [{"path": "/home", "name": "Home", "meta": {"title": "Home"}}]}"#;
        let catalog = RouteCatalog::parse(json, CatalogFormat::Json).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn parse_toml_tables() {
        let toml = r#"
[[routes]]
path = "/home"
name = "Home"

[routes.meta]
title = "Home"

[[routes]]
path = "/alarms"
name = "Alarms"

[[routes.children]]
path = "list"
name = "AlarmList"
"#;
        let catalog = RouteCatalog::parse(toml, CatalogFormat::Toml).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.routes()[1].is_container());
    }

    #[test]
    fn duplicate_name_rejected() {
        let routes = vec![
            RouteNode::leaf("/a", "Same", None, RouteMeta::default()),
            RouteNode::container(
                "/b",
                "B",
                None,
                RouteMeta::default(),
                vec![RouteNode::leaf("c", "Same", None, RouteMeta::default())],
            ),
        ];
        let err = RouteCatalog::from_routes(routes).unwrap_err();
        assert!(err.to_string().contains("'Same'"));
    }

    #[test]
    fn duplicate_sibling_path_rejected() {
        let routes = vec![RouteNode::container(
            "/b",
            "B",
            None,
            RouteMeta::default(),
            vec![
                RouteNode::leaf("c", "C1", None, RouteMeta::default()),
                RouteNode::leaf("c", "C2", None, RouteMeta::default()),
            ],
        )];
        assert!(matches!(
            RouteCatalog::from_routes(routes),
            Err(RouteError::Configuration(_))
        ));
    }

    #[test]
    fn same_path_under_different_parents_is_fine() {
        let routes = vec![
            RouteNode::container(
                "/a",
                "A",
                None,
                RouteMeta::default(),
                vec![RouteNode::leaf("list", "AList", None, RouteMeta::default())],
            ),
            RouteNode::container(
                "/b",
                "B",
                None,
                RouteMeta::default(),
                vec![RouteNode::leaf("list", "BList", None, RouteMeta::default())],
            ),
        ];
        assert!(RouteCatalog::from_routes(routes).is_ok());
    }

    #[test]
    fn nesting_guard() {
        let mut node = RouteNode::leaf("leaf", "N0", None, RouteMeta::default());
        for i in 1..=MAX_NESTING {
            node = RouteNode::container(
                format!("p{i}"),
                format!("N{i}"),
                None,
                RouteMeta::default(),
                vec![node],
            );
        }
        node.path = "/root".to_string();
        let err = RouteCatalog::from_routes(vec![node]).unwrap_err();
        assert!(err.to_string().contains("deeper than 50"));
    }

    #[test]
    fn nesting_at_the_limit_is_accepted() {
        let mut node = RouteNode::leaf("leaf", "N0", None, RouteMeta::default());
        for i in 1..MAX_NESTING {
            node = RouteNode::container(
                format!("p{i}"),
                format!("N{i}"),
                None,
                RouteMeta::default(),
                vec![node],
            );
        }
        node.path = "/root".to_string();
        let catalog = RouteCatalog::from_routes(vec![node]).unwrap();
        assert_eq!(catalog.len(), MAX_NESTING);
    }

    #[test]
    fn unknown_extension_rejected() {
        let err = RouteCatalog::load(Path::new("routes.ini")).unwrap_err();
        assert!(matches!(err, RouteError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RouteCatalog::load(Path::new("/nonexistent/routes.yaml")).unwrap_err();
        assert!(matches!(err, RouteError::Io { .. }));
    }
}
