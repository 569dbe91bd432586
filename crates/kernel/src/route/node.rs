//! Route tree node types.
//!
//! Routes are stored as a tagged tree: a node is either a leaf that renders a
//! view or a container that groups children. On the wire (catalog files and
//! JSON output) both shapes share a single record with an optional
//! `children` array.

use serde::{Deserialize, Serialize};

use crate::authority::{Authority, AuthorityRule};

/// Key of a view component, resolved through a
/// [`ComponentRegistry`](super::ComponentRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRef(pub String);

impl ComponentRef {
    /// Create a reference to the view registered under `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Registry key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Display and access metadata attached to a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    /// Menu and tab title.
    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Required authority (absent = visible to every authenticated principal).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<AuthorityRule>,

    /// Registered with the router but left out of the menu.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hide_menu: bool,

    /// Shown in the menu as a leaf; its children stay navigable.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hide_children_in_menu: bool,

    /// Pinned tab flag consumed by the tab bar.
    #[serde(default, skip_serializing_if = "is_false")]
    pub affix: bool,

    /// Explicit sibling order (ascending, unset sorts last).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_no: Option<i32>,

    /// Set by flattening on a container whose children were relocated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_children: bool,

    /// Set by flattening on a relocated node: name of its original parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_parent: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RouteMeta {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Whether the route is visible to `authority`.
    pub fn visible_to(&self, authority: Option<Authority>) -> bool {
        self.authority
            .as_ref()
            .is_none_or(|rule| rule.allows(authority))
    }
}

/// Shape of a route: a view leaf or a pure container.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteBody {
    /// Renders `component` (none for redirect-only routes).
    Leaf { component: Option<ComponentRef> },
    /// Groups `children` (never empty) inside an optional layout.
    Container {
        layout: Option<ComponentRef>,
        children: Vec<RouteNode>,
    },
}

/// A node of the route tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RouteRecord", into = "RouteRecord")]
pub struct RouteNode {
    /// Path, absolute (`/device`) or relative to the parent (`list`).
    pub path: String,
    /// Name, unique across the whole catalog.
    pub name: String,
    pub redirect: Option<String>,
    pub meta: RouteMeta,
    pub body: RouteBody,
}

impl RouteNode {
    /// Create a leaf route rendering `component`.
    pub fn leaf(
        path: impl Into<String>,
        name: impl Into<String>,
        component: Option<ComponentRef>,
        meta: RouteMeta,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            redirect: None,
            meta,
            body: RouteBody::Leaf { component },
        }
    }

    /// Create a container route. An empty `children` list yields a leaf.
    pub fn container(
        path: impl Into<String>,
        name: impl Into<String>,
        layout: Option<ComponentRef>,
        meta: RouteMeta,
        children: Vec<RouteNode>,
    ) -> Self {
        let mut node = Self::leaf(path, name, layout, meta);
        node.set_children(children);
        node
    }

    /// Redirect this route to `redirect`.
    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    pub fn is_container(&self) -> bool {
        matches!(self.body, RouteBody::Container { .. })
    }

    /// Child routes (empty for leaves).
    pub fn children(&self) -> &[RouteNode] {
        match &self.body {
            RouteBody::Leaf { .. } => &[],
            RouteBody::Container { children, .. } => children,
        }
    }

    /// View component or container layout.
    pub fn component(&self) -> Option<&ComponentRef> {
        match &self.body {
            RouteBody::Leaf { component } => component.as_ref(),
            RouteBody::Container { layout, .. } => layout.as_ref(),
        }
    }

    /// Replace the children, turning the node into a leaf when empty.
    pub fn set_children(&mut self, children: Vec<RouteNode>) {
        let component = self.component().cloned();
        self.body = if children.is_empty() {
            RouteBody::Leaf { component }
        } else {
            RouteBody::Container {
                layout: component,
                children,
            }
        };
    }

    /// Drop the children, keeping the component as the leaf view.
    pub fn into_leaf(mut self) -> (Self, Vec<RouteNode>) {
        let children = match std::mem::replace(&mut self.body, RouteBody::Leaf { component: None }) {
            RouteBody::Leaf { component } => {
                self.body = RouteBody::Leaf { component };
                Vec::new()
            }
            RouteBody::Container { layout, children } => {
                self.body = RouteBody::Leaf { component: layout };
                children
            }
        };
        (self, children)
    }

    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(RouteNode::count).sum::<usize>()
    }
}

/// Resolve `path` against `base` the way the router does: absolute paths
/// stand alone, relative paths are appended to the parent.
pub fn join_path(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        return if base.is_empty() { "/".to_string() } else { base.to_string() };
    }
    format!("{base}/{path}")
}

/// Wire representation of a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    pub path: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default)]
    pub meta: RouteMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RouteRecord>>,
}

impl From<RouteRecord> for RouteNode {
    fn from(record: RouteRecord) -> Self {
        let children: Vec<RouteNode> = record
            .children
            .unwrap_or_default()
            .into_iter()
            .map(RouteNode::from)
            .collect();
        let mut node = RouteNode {
            path: record.path,
            name: record.name,
            redirect: record.redirect,
            meta: record.meta,
            body: RouteBody::Leaf {
                component: record.component,
            },
        };
        node.set_children(children);
        node
    }
}

impl From<RouteNode> for RouteRecord {
    fn from(node: RouteNode) -> Self {
        let (component, children) = match node.body {
            RouteBody::Leaf { component } => (component, None),
            RouteBody::Container { layout, children } => (
                layout,
                Some(children.into_iter().map(RouteRecord::from).collect()),
            ),
        };
        RouteRecord {
            path: node.path,
            name: node.name,
            component,
            redirect: node.redirect,
            meta: node.meta,
            children,
        }
    }
}
