//! Hierarchy traversal over a [`NodeAccessor`]

use super::{Node, NodeAccessor};
use crate::value_objects::{NodeAggregateIdentifier, NodeTypeName};
use std::collections::HashSet;

/// Node type of the container above all sites
pub const DEFAULT_TOP_LEVEL_CONTAINER_NODE_TYPE: &str = "Neos.Neos:Sites";

/// Parents of every node, nearest first, up to the top-level container
///
/// The container itself is not included. Ancestors of each input are listed
/// in turn, so shared ancestors appear once per input.
pub fn find_ancestors(
    accessor: &dyn NodeAccessor,
    nodes: &[Node],
    top_level_container: &NodeTypeName,
) -> Vec<Node> {
    let mut ancestors = Vec::new();
    for node in nodes {
        let mut current = accessor.find_parent_node(node);
        while let Some(parent) = current {
            if &parent.node_type_name == top_level_container {
                break;
            }
            current = accessor.find_parent_node(&parent);
            ancestors.push(parent);
        }
    }
    ancestors
}

/// Children of each node's parent, excluding the nodes themselves
///
/// Results are unique by aggregate identifier and keep first-seen order.
/// Nodes without a parent contribute nothing.
pub fn find_siblings(accessor: &dyn NodeAccessor, nodes: &[Node]) -> Vec<Node> {
    let mut seen: HashSet<NodeAggregateIdentifier> = nodes
        .iter()
        .map(|node| node.node_aggregate_identifier.clone())
        .collect();

    let mut siblings = Vec::new();
    for node in nodes {
        let Some(parent) = accessor.find_parent_node(node) else {
            continue;
        };
        for child in accessor.find_child_nodes(&parent) {
            if seen.insert(child.node_aggregate_identifier.clone()) {
                siblings.push(child);
            }
        }
    }
    siblings
}
