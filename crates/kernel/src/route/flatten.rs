//! Route flattening for routers with bounded nesting.
//!
//! Nodes below `max_depth` are relocated next to their ancestor at
//! `max_depth`, as children of the level above it. Relocated paths are made
//! absolute so direct navigation still resolves, and both sides are marked
//! (`has_children` on the former container, `menu_parent` on each relocated
//! node) so the menu can be regrouped later.

use tracing::debug;

use super::node::{RouteNode, join_path};
use crate::error::{MAX_NESTING, RouteError, RouteResult};

/// Flatten `tree` so that no route sits deeper than `max_depth` (roots are
/// level 1). Flattening an already flat tree returns it unchanged.
pub fn flatten(tree: &[RouteNode], max_depth: usize) -> RouteResult<Vec<RouteNode>> {
    if max_depth == 0 {
        return Err(RouteError::configuration(
            "router nesting depth must be at least 1",
        ));
    }
    let flat = flatten_level(tree, "", 1, max_depth)?;
    debug!(
        max_depth,
        before = tree.iter().map(RouteNode::count).sum::<usize>(),
        roots = flat.len(),
        "flattened route tree"
    );
    Ok(flat)
}

fn flatten_level(
    nodes: &[RouteNode],
    base: &str,
    level: usize,
    max_depth: usize,
) -> RouteResult<Vec<RouteNode>> {
    if level > MAX_NESTING {
        return Err(RouteError::too_deep(base));
    }

    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let full_path = join_path(base, &node.path);
        if level < max_depth {
            let mut node = node.clone();
            if node.is_container() {
                let children = flatten_level(node.children(), &full_path, level + 1, max_depth)?;
                node.set_children(children);
            }
            out.push(node);
        } else if node.is_container() {
            let (mut leaf, children) = node.clone().into_leaf();
            leaf.meta.has_children = true;
            let parent = leaf.name.clone();
            out.push(leaf);
            for child in children {
                relocate(child, &full_path, &parent, level + 1, &mut out)?;
            }
        } else {
            out.push(node.clone());
        }
    }
    Ok(out)
}

fn relocate(
    node: RouteNode,
    parent_path: &str,
    parent_name: &str,
    depth: usize,
    out: &mut Vec<RouteNode>,
) -> RouteResult<()> {
    if depth > MAX_NESTING {
        return Err(RouteError::too_deep(parent_name));
    }

    let (mut leaf, children) = node.into_leaf();
    leaf.path = join_path(parent_path, &leaf.path);
    leaf.meta.menu_parent = Some(parent_name.to_string());
    leaf.meta.has_children = !children.is_empty();

    let path = leaf.path.clone();
    let name = leaf.name.clone();
    out.push(leaf);
    for child in children {
        relocate(child, &path, &name, depth + 1, out)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::route::RouteMeta;

    fn leaf(path: &str, name: &str) -> RouteNode {
        RouteNode::leaf(path, name, None, RouteMeta::titled(name))
    }

    fn group(path: &str, name: &str, children: Vec<RouteNode>) -> RouteNode {
        RouteNode::container(path, name, None, RouteMeta::titled(name), children)
    }

    fn three_levels() -> Vec<RouteNode> {
        vec![
            leaf("/home", "Home"),
            group(
                "/settings",
                "Settings",
                vec![
                    leaf("general", "General"),
                    group(
                        "security",
                        "Security",
                        vec![leaf("password", "Password"), leaf("/audit", "Audit")],
                    ),
                ],
            ),
        ]
    }

    #[test]
    fn shallow_tree_is_unchanged() {
        let tree = vec![leaf("/home", "Home"), group("/a", "A", vec![leaf("b", "B")])];
        assert_eq!(flatten(&tree, 2).unwrap(), tree);
    }

    #[test]
    fn deep_nodes_move_up_with_joined_paths() {
        let flat = flatten(&three_levels(), 2).unwrap();
        let settings = &flat[1];
        let names: Vec<_> = settings.children().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["General", "Security", "Password", "Audit"]);

        let children = settings.children();
        assert!(children.iter().all(|c| !c.is_container()));
        assert!(children[1].meta.has_children);
        assert_eq!(children[1].path, "security");
        assert_eq!(children[2].path, "/settings/security/password");
        assert_eq!(children[2].meta.menu_parent.as_deref(), Some("Security"));
        assert_eq!(children[3].path, "/audit");
        assert!(children[0].meta.menu_parent.is_none());
    }

    #[test]
    fn flatten_is_idempotent() {
        for depth in 1..=4 {
            let once = flatten(&three_levels(), depth).unwrap();
            let twice = flatten(&once, depth).unwrap();
            assert_eq!(once, twice, "depth {depth}");
        }
    }

    #[test]
    fn depth_one_lifts_everything_to_roots() {
        let flat = flatten(&three_levels(), 1).unwrap();
        assert!(flat.iter().all(|n| !n.is_container()));
        assert_eq!(flat.len(), 6);
        assert_eq!(flat[2].path, "/settings/general");
        assert_eq!(flat[2].meta.menu_parent.as_deref(), Some("Settings"));
    }

    #[test]
    fn redirect_only_node_is_preserved() {
        let tree = vec![RouteNode::leaf("/", "Root", None, RouteMeta::default()).with_redirect("/home")];
        assert_eq!(flatten(&tree, 2).unwrap(), tree);
    }

    #[test]
    fn zero_depth_is_a_configuration_error() {
        assert!(matches!(
            flatten(&three_levels(), 0),
            Err(RouteError::Configuration(_))
        ));
    }

    #[test]
    fn nesting_at_the_limit_flattens() {
        let mut node = leaf("end", "N0");
        for i in 1..MAX_NESTING {
            node = group(&format!("p{i}"), &format!("N{i}"), vec![node]);
        }
        let tree = vec![node];

        let flat = flatten(&tree, 2).unwrap();
        assert_eq!(flat[0].children().len(), MAX_NESTING - 1);
        assert_eq!(flatten(&tree, MAX_NESTING).unwrap(), tree);
    }

    #[test]
    fn runaway_nesting_hits_guard() {
        let mut node = leaf("end", "N0");
        for i in 1..=MAX_NESTING + 5 {
            node = group(&format!("p{i}"), &format!("N{i}"), vec![node]);
        }
        assert!(flatten(&[node.clone()], 2).is_err());
        assert!(flatten(&[node], usize::MAX).is_err());
    }
}
