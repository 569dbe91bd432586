//! Menu projector - derives the navigation menu from a filtered route tree.
//!
//! The menu mirrors the route tree with display-only fields. Routes that
//! were relocated by flattening are regrouped under their original parent
//! so the menu keeps the nesting the catalog declared.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::route::{RouteNode, join_path};

/// A navigation menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    /// Absolute path of the route.
    pub path: String,
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
    /// Pinned entry (the home page).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub affix: bool,
}

impl MenuNode {
    /// Number of entries in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(MenuNode::count).sum::<usize>()
    }
}

/// Project `tree` into menu entries, pinning the entry at `home_path`.
///
/// Siblings are ordered by `order_no` ascending; entries without one come
/// last and ties keep declaration order. Routes marked `hide_menu` are left
/// out together with their children.
pub fn to_menu(tree: &[RouteNode], home_path: &str) -> Vec<MenuNode> {
    let mut menu = project_level(tree.to_vec(), "");
    let pinned = patch_affix(&mut menu, home_path);
    debug!(
        entries = menu.iter().map(MenuNode::count).sum::<usize>(),
        home = %home_path,
        pinned,
        "projected menu"
    );
    menu
}

fn project_level(nodes: Vec<RouteNode>, base: &str) -> Vec<MenuNode> {
    let mut nodes = regroup(nodes);
    nodes.sort_by_key(|n| (n.meta.order_no.is_none(), n.meta.order_no));

    nodes
        .into_iter()
        .filter(|node| !node.meta.hide_menu)
        .map(|node| {
            let path = join_path(base, &node.path);
            let (node, children) = node.into_leaf();
            let children = if node.meta.hide_children_in_menu {
                Vec::new()
            } else {
                project_level(children, &path)
            };
            MenuNode {
                path,
                name: node.name,
                title: node.meta.title,
                icon: node.meta.icon,
                children,
                affix: false,
            }
        })
        .collect()
}

/// Nest relocated siblings back under the sibling they were moved out of.
///
/// A route is only attached to a parent declared before it, which is where
/// flattening puts them; anything else stays at this level.
fn regroup(nodes: Vec<RouteNode>) -> Vec<RouteNode> {
    if nodes.iter().all(|n| n.meta.menu_parent.is_none()) {
        return nodes;
    }

    let position: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.name.clone(), i))
        .collect();

    let mut pending: HashMap<String, Vec<RouteNode>> = HashMap::new();
    let mut top = Vec::new();
    for (index, mut node) in nodes.into_iter().enumerate().rev() {
        if let Some(mut children) = pending.remove(&node.name) {
            children.reverse();
            node.set_children(children);
        }
        let parent = node
            .meta
            .menu_parent
            .as_ref()
            .filter(|p| position.get(*p).is_some_and(|&at| at < index))
            .cloned();
        match parent {
            Some(parent) => pending.entry(parent).or_default().push(node),
            None => top.push(node),
        }
    }
    top.reverse();
    top
}

/// Pin the first entry (pre-order) at `home_path`. Returns whether one matched.
fn patch_affix(menu: &mut [MenuNode], home_path: &str) -> bool {
    for entry in menu {
        if entry.path == home_path {
            entry.affix = true;
            return true;
        }
        if patch_affix(&mut entry.children, home_path) {
            return true;
        }
    }
    false
}
