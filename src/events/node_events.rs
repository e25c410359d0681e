//! Node aggregate events
//!
//! All node events can be published to other content streams: the copy differs
//! from the original only in its content stream identifier.

use super::{DomainEvent, EmbedsNodeAggregateIdentifier, PublishableToOtherContentStreams};
use crate::dimension::{
    DimensionSpacePointSet, OriginDimensionSpacePoint,
    OriginDimensionSpacePointSet,
};
use crate::value_objects::{
    ContentStreamIdentifier, NodeAggregateClassification, NodeAggregateIdentifier,
    NodeAggregateIdentifiers, NodeName, NodeTypeName, ReferenceName, UserIdentifier,
};
use serde::{Deserialize, Serialize};

/// A root node aggregate spanning the whole allowed subspace was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootNodeAggregateWithNodeWasCreated {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub node_aggregate_identifier: NodeAggregateIdentifier,
    pub node_type_name: NodeTypeName,
    pub covered_dimension_space_points: DimensionSpacePointSet,
    pub node_aggregate_classification: NodeAggregateClassification,
    pub initiating_user_identifier: UserIdentifier,
}

/// A regular or tethered node aggregate was created below a parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAggregateWithNodeWasCreated {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub node_aggregate_identifier: NodeAggregateIdentifier,
    pub node_type_name: NodeTypeName,
    pub origin_dimension_space_point: OriginDimensionSpacePoint,
    pub covered_dimension_space_points: DimensionSpacePointSet,
    pub parent_node_aggregate_identifier: NodeAggregateIdentifier,
    pub node_name: Option<NodeName>,
    pub node_aggregate_classification: NodeAggregateClassification,
    pub initiating_user_identifier: UserIdentifier,
}

/// Some or all variants of a node aggregate were removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAggregateWasRemoved {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub node_aggregate_identifier: NodeAggregateIdentifier,
    pub affected_occupied_dimension_space_points: OriginDimensionSpacePointSet,
    pub affected_covered_dimension_space_points: DimensionSpacePointSet,
    pub initiating_user_identifier: UserIdentifier,
    /// Anchors a tombstone on the read side
    pub removal_attachment_point: Option<NodeAggregateIdentifier>,
}

/// A named reference from source to destination node aggregates was set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReferencesWereSet {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub source_node_aggregate_identifier: NodeAggregateIdentifier,
    pub source_origin_dimension_space_point: OriginDimensionSpacePoint,
    /// Order is significant, duplicates are kept
    pub destination_node_aggregate_identifiers: NodeAggregateIdentifiers,
    pub reference_name: ReferenceName,
    pub initiating_user_identifier: UserIdentifier,
}

impl DomainEvent for RootNodeAggregateWithNodeWasCreated {
    fn content_stream_identifier(&self) -> &ContentStreamIdentifier {
        &self.content_stream_identifier
    }

    fn event_type(&self) -> &'static str {
        "RootNodeAggregateWithNodeWasCreated"
    }
}

impl DomainEvent for NodeAggregateWithNodeWasCreated {
    fn content_stream_identifier(&self) -> &ContentStreamIdentifier {
        &self.content_stream_identifier
    }

    fn event_type(&self) -> &'static str {
        "NodeAggregateWithNodeWasCreated"
    }
}

impl DomainEvent for NodeAggregateWasRemoved {
    fn content_stream_identifier(&self) -> &ContentStreamIdentifier {
        &self.content_stream_identifier
    }

    fn event_type(&self) -> &'static str {
        "NodeAggregateWasRemoved"
    }
}

impl DomainEvent for NodeReferencesWereSet {
    fn content_stream_identifier(&self) -> &ContentStreamIdentifier {
        &self.content_stream_identifier
    }

    fn event_type(&self) -> &'static str {
        "NodeReferencesWereSet"
    }
}

impl PublishableToOtherContentStreams for RootNodeAggregateWithNodeWasCreated {
    fn create_copy_for_content_stream(&self, target: ContentStreamIdentifier) -> Self {
        Self {
            content_stream_identifier: target,
            node_aggregate_identifier: self.node_aggregate_identifier.clone(),
            node_type_name: self.node_type_name.clone(),
            covered_dimension_space_points: self.covered_dimension_space_points.clone(),
            node_aggregate_classification: self.node_aggregate_classification,
            initiating_user_identifier: self.initiating_user_identifier.clone(),
        }
    }
}

impl PublishableToOtherContentStreams for NodeAggregateWithNodeWasCreated {
    fn create_copy_for_content_stream(&self, target: ContentStreamIdentifier) -> Self {
        Self {
            content_stream_identifier: target,
            node_aggregate_identifier: self.node_aggregate_identifier.clone(),
            node_type_name: self.node_type_name.clone(),
            origin_dimension_space_point: self.origin_dimension_space_point.clone(),
            covered_dimension_space_points: self.covered_dimension_space_points.clone(),
            parent_node_aggregate_identifier: self.parent_node_aggregate_identifier.clone(),
            node_name: self.node_name.clone(),
            node_aggregate_classification: self.node_aggregate_classification,
            initiating_user_identifier: self.initiating_user_identifier.clone(),
        }
    }
}

impl PublishableToOtherContentStreams for NodeAggregateWasRemoved {
    fn create_copy_for_content_stream(&self, target: ContentStreamIdentifier) -> Self {
        Self {
            content_stream_identifier: target,
            node_aggregate_identifier: self.node_aggregate_identifier.clone(),
            affected_occupied_dimension_space_points: self
                .affected_occupied_dimension_space_points
                .clone(),
            affected_covered_dimension_space_points: self
                .affected_covered_dimension_space_points
                .clone(),
            initiating_user_identifier: self.initiating_user_identifier.clone(),
            removal_attachment_point: self.removal_attachment_point.clone(),
        }
    }
}

impl PublishableToOtherContentStreams for NodeReferencesWereSet {
    fn create_copy_for_content_stream(&self, target: ContentStreamIdentifier) -> Self {
        Self {
            content_stream_identifier: target,
            source_node_aggregate_identifier: self.source_node_aggregate_identifier.clone(),
            source_origin_dimension_space_point: self.source_origin_dimension_space_point.clone(),
            destination_node_aggregate_identifiers: self
                .destination_node_aggregate_identifiers
                .clone(),
            reference_name: self.reference_name.clone(),
            initiating_user_identifier: self.initiating_user_identifier.clone(),
        }
    }
}

impl EmbedsNodeAggregateIdentifier for RootNodeAggregateWithNodeWasCreated {
    fn node_aggregate_identifier(&self) -> &NodeAggregateIdentifier {
        &self.node_aggregate_identifier
    }
}

impl EmbedsNodeAggregateIdentifier for NodeAggregateWithNodeWasCreated {
    fn node_aggregate_identifier(&self) -> &NodeAggregateIdentifier {
        &self.node_aggregate_identifier
    }
}

impl EmbedsNodeAggregateIdentifier for NodeAggregateWasRemoved {
    fn node_aggregate_identifier(&self) -> &NodeAggregateIdentifier {
        &self.node_aggregate_identifier
    }
}

// The source is the aggregate whose cached rendering changes.
impl EmbedsNodeAggregateIdentifier for NodeReferencesWereSet {
    fn node_aggregate_identifier(&self) -> &NodeAggregateIdentifier {
        &self.source_node_aggregate_identifier
    }
}
