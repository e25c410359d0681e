//! Content repository commands
//!
//! Commands represent intent to modify the content graph. They are processed by
//! command handlers which validate preconditions and emit corresponding events.

use crate::dimension::{DimensionSpacePoint, NodeVariantSelectionStrategy, OriginDimensionSpacePoint};
use crate::value_objects::{
    ContentStreamIdentifier, NodeAggregateIdentifier, NodeAggregateIdentifiers, NodeName,
    NodeTypeName, ReferenceName, UserIdentifier,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Create an empty content stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentStream {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub initiating_user_identifier: UserIdentifier,
}

/// Branch a new content stream off an existing one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkContentStream {
    /// The stream to create
    pub content_stream_identifier: ContentStreamIdentifier,
    pub source_content_stream_identifier: ContentStreamIdentifier,
    pub initiating_user_identifier: UserIdentifier,
}

/// Create a root node aggregate covering the whole allowed subspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRootNodeAggregateWithNode {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub node_aggregate_identifier: NodeAggregateIdentifier,
    pub node_type_name: NodeTypeName,
    pub initiating_user_identifier: UserIdentifier,
}

/// Create a regular node aggregate below a parent, including its tethered children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeAggregateWithNode {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub node_aggregate_identifier: NodeAggregateIdentifier,
    pub node_type_name: NodeTypeName,
    pub origin_dimension_space_point: OriginDimensionSpacePoint,
    pub parent_node_aggregate_identifier: NodeAggregateIdentifier,
    pub node_name: Option<NodeName>,
    pub initiating_user_identifier: UserIdentifier,
    /// Identifiers for tethered descendants keyed by node path, e.g. `main/footer`;
    /// missing entries are generated
    #[serde(default)]
    pub tethered_descendant_node_aggregate_identifiers: BTreeMap<String, NodeAggregateIdentifier>,
}

/// Remove variants of a node aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveNodeAggregate {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub node_aggregate_identifier: NodeAggregateIdentifier,
    pub covered_dimension_space_point: DimensionSpacePoint,
    pub node_variant_selection_strategy: NodeVariantSelectionStrategy,
    pub initiating_user_identifier: UserIdentifier,
    /// Anchors a tombstone on the read side
    pub removal_attachment_point: Option<NodeAggregateIdentifier>,
}

/// Replace the named references of a node variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetNodeReferences {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub source_node_aggregate_identifier: NodeAggregateIdentifier,
    pub source_origin_dimension_space_point: OriginDimensionSpacePoint,
    pub destination_node_aggregate_identifiers: NodeAggregateIdentifiers,
    pub reference_name: ReferenceName,
    pub initiating_user_identifier: UserIdentifier,
}

/// Commands accepted by the content repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ContentRepositoryCommand {
    CreateContentStream(CreateContentStream),
    ForkContentStream(ForkContentStream),
    CreateRootNodeAggregateWithNode(CreateRootNodeAggregateWithNode),
    CreateNodeAggregateWithNode(CreateNodeAggregateWithNode),
    RemoveNodeAggregate(RemoveNodeAggregate),
    SetNodeReferences(SetNodeReferences),
}

impl ContentRepositoryCommand {
    /// The stream this command targets
    pub fn content_stream_identifier(&self) -> &ContentStreamIdentifier {
        match self {
            Self::CreateContentStream(c) => &c.content_stream_identifier,
            Self::ForkContentStream(c) => &c.content_stream_identifier,
            Self::CreateRootNodeAggregateWithNode(c) => &c.content_stream_identifier,
            Self::CreateNodeAggregateWithNode(c) => &c.content_stream_identifier,
            Self::RemoveNodeAggregate(c) => &c.content_stream_identifier,
            Self::SetNodeReferences(c) => &c.content_stream_identifier,
        }
    }

    pub fn initiating_user_identifier(&self) -> &UserIdentifier {
        match self {
            Self::CreateContentStream(c) => &c.initiating_user_identifier,
            Self::ForkContentStream(c) => &c.initiating_user_identifier,
            Self::CreateRootNodeAggregateWithNode(c) => &c.initiating_user_identifier,
            Self::CreateNodeAggregateWithNode(c) => &c.initiating_user_identifier,
            Self::RemoveNodeAggregate(c) => &c.initiating_user_identifier,
            Self::SetNodeReferences(c) => &c.initiating_user_identifier,
        }
    }

    /// Name recorded in event metadata
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::CreateContentStream(_) => "CreateContentStream",
            Self::ForkContentStream(_) => "ForkContentStream",
            Self::CreateRootNodeAggregateWithNode(_) => "CreateRootNodeAggregateWithNode",
            Self::CreateNodeAggregateWithNode(_) => "CreateNodeAggregateWithNode",
            Self::RemoveNodeAggregate(_) => "RemoveNodeAggregate",
            Self::SetNodeReferences(_) => "SetNodeReferences",
        }
    }
}

macro_rules! impl_from_command {
    ($($command:ident),* $(,)?) => {
        $(
            impl From<$command> for ContentRepositoryCommand {
                fn from(command: $command) -> Self {
                    Self::$command(command)
                }
            }
        )*
    };
}

impl_from_command!(
    CreateContentStream,
    ForkContentStream,
    CreateRootNodeAggregateWithNode,
    CreateNodeAggregateWithNode,
    RemoveNodeAggregate,
    SetNodeReferences,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_command_deserialization() {
        let json = r#"{
            "contentStreamIdentifier": "cs-1",
            "nodeAggregateIdentifier": "n1",
            "coveredDimensionSpacePoint": {"language": "en"},
            "nodeVariantSelectionStrategy": "allSpecializations",
            "initiatingUserIdentifier": "editor",
            "removalAttachmentPoint": null
        }"#;

        let command: RemoveNodeAggregate = serde_json::from_str(json).unwrap();
        assert_eq!(
            command.node_variant_selection_strategy,
            NodeVariantSelectionStrategy::AllSpecializations
        );
        assert_eq!(command.covered_dimension_space_point.coordinate("language"), Some("en"));
    }

    #[test]
    fn test_command_envelope_accessors() {
        let command: ContentRepositoryCommand = CreateRootNodeAggregateWithNode {
            content_stream_identifier: ContentStreamIdentifier::from_string("cs-1").unwrap(),
            node_aggregate_identifier: NodeAggregateIdentifier::from_string("root").unwrap(),
            node_type_name: NodeTypeName::new("Neos.Neos:Sites"),
            initiating_user_identifier: UserIdentifier::system_user(),
        }
        .into();

        assert_eq!(command.command_type(), "CreateRootNodeAggregateWithNode");
        assert_eq!(command.content_stream_identifier().as_str(), "cs-1");

        let serialized = serde_json::to_string(&command).unwrap();
        let deserialized: ContentRepositoryCommand = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, command);
    }

    #[test]
    fn test_malformed_identifier_is_rejected() {
        let json = r#"{
            "contentStreamIdentifier": "cs-1",
            "nodeAggregateIdentifier": "Not Valid!",
            "nodeTypeName": "Acme:Page",
            "initiatingUserIdentifier": "editor"
        }"#;
        assert!(serde_json::from_str::<CreateRootNodeAggregateWithNode>(json).is_err());
    }
}
