//! Authority-based route filtering.

use std::collections::HashSet;

use crate::authority::Authority;
use crate::route::RouteNode;

/// Keep only the routes `authority` may see.
///
/// - A route without an authority rule is visible to every principal,
///   including one with no authority at all.
/// - A container is kept only if it is visible itself and at least one child
///   survives; a hidden container takes its whole subtree with it.
/// - Siblings produced by flattening are treated as the subtree they came
///   from: a relocated route goes when its original parent goes, and a former
///   container goes when none of its relocated descendants survive.
///
/// The input is not modified.
pub fn filter_by_authority(tree: &[RouteNode], authority: Option<Authority>) -> Vec<RouteNode> {
    let mut kept = Vec::with_capacity(tree.len());
    let mut dropped: HashSet<&str> = HashSet::new();

    for node in tree {
        let orphaned = node
            .meta
            .menu_parent
            .as_deref()
            .is_some_and(|parent| dropped.contains(parent));
        if orphaned || !node.meta.visible_to(authority) {
            dropped.insert(&node.name);
            continue;
        }

        if node.is_container() {
            let children = filter_by_authority(node.children(), authority);
            if children.is_empty() {
                dropped.insert(&node.name);
                continue;
            }
            let mut node = node.clone();
            node.set_children(children);
            kept.push(node);
        } else {
            kept.push(node.clone());
        }
    }

    prune_empty_groups(kept)
}

/// Drop former containers none of whose relocated descendants survived.
///
/// Relocated routes always follow their original parent, so walking
/// backwards sees every descendant before the group it belongs to.
fn prune_empty_groups(nodes: Vec<RouteNode>) -> Vec<RouteNode> {
    if !nodes.iter().any(|n| n.meta.has_children) {
        return nodes;
    }

    let mut referenced: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes.into_iter().rev() {
        if node.meta.has_children && !referenced.contains(&node.name) {
            continue;
        }
        if let Some(parent) = &node.meta.menu_parent {
            referenced.insert(parent.clone());
        }
        out.push(node);
    }
    out.reverse();
    out
}
