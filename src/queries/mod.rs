//! Content queries
//!
//! Queries provide read-only access to projected content. They operate on a
//! subgraph, the view of one content stream at one dimension space point,
//! rather than on node aggregates.

mod traversal;

pub use traversal::{find_ancestors, find_siblings, DEFAULT_TOP_LEVEL_CONTAINER_NODE_TYPE};

use crate::dimension::{DimensionSpacePoint, OriginDimensionSpacePoint};
use crate::value_objects::{
    ContentStreamIdentifier, NodeAggregateClassification, NodeAggregateIdentifier, NodeName,
    NodeTypeName, PropertyName,
};
use serde::{Deserialize, Serialize};

/// Addresses one subgraph of the content graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSubgraphIdentity {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub dimension_space_point: DimensionSpacePoint,
}

impl ContentSubgraphIdentity {
    pub fn new(
        content_stream_identifier: ContentStreamIdentifier,
        dimension_space_point: DimensionSpacePoint,
    ) -> Self {
        Self {
            content_stream_identifier,
            dimension_space_point,
        }
    }
}

/// A node as visible in one subgraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub subgraph_identity: ContentSubgraphIdentity,
    pub node_aggregate_identifier: NodeAggregateIdentifier,
    pub node_type_name: NodeTypeName,
    pub node_name: Option<NodeName>,
    /// Where the visible variant was authored
    pub origin_dimension_space_point: OriginDimensionSpacePoint,
    pub classification: NodeAggregateClassification,
}

/// A named reference as visible in one subgraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub name: PropertyName,
    pub node: Node,
}

/// Hierarchy navigation within the subgraph a node belongs to
pub trait NodeAccessor: Send + Sync {
    /// The node visible for an aggregate in a subgraph
    fn find_node(
        &self,
        subgraph_identity: &ContentSubgraphIdentity,
        node_aggregate_identifier: &NodeAggregateIdentifier,
    ) -> Option<Node>;

    fn find_parent_node(&self, node: &Node) -> Option<Node>;

    /// Children in insertion order
    fn find_child_nodes(&self, parent: &Node) -> Vec<Node>;
}
