//! Domain events enum for the content domain

use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use crate::events::{
    ContentStreamWasCreated, ContentStreamWasForked, DomainEvent, EmbedsNodeAggregateIdentifier,
    NodeAggregateWasRemoved, NodeAggregateWithNodeWasCreated, NodeReferencesWereSet,
    PublishableToOtherContentStreams, RootNodeAggregateWithNodeWasCreated,
};
use crate::value_objects::{ContentStreamIdentifier, NodeAggregateIdentifier};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Enum wrapper for content domain events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ContentRepositoryEvent {
    /// An empty content stream was created
    ContentStreamWasCreated(ContentStreamWasCreated),
    /// A content stream was forked off another
    ContentStreamWasForked(ContentStreamWasForked),
    /// A root node aggregate was created
    RootNodeAggregateWithNodeWasCreated(RootNodeAggregateWithNodeWasCreated),
    /// A regular or tethered node aggregate was created
    NodeAggregateWithNodeWasCreated(NodeAggregateWithNodeWasCreated),
    /// Variants of a node aggregate were removed
    NodeAggregateWasRemoved(NodeAggregateWasRemoved),
    /// References of a node were set
    NodeReferencesWereSet(NodeReferencesWereSet),
}

impl ContentRepositoryEvent {
    /// The node aggregate this event is about, if any
    pub fn node_aggregate_identifier(&self) -> Option<&NodeAggregateIdentifier> {
        match self {
            Self::ContentStreamWasCreated(_) | Self::ContentStreamWasForked(_) => None,
            Self::RootNodeAggregateWithNodeWasCreated(e) => Some(e.node_aggregate_identifier()),
            Self::NodeAggregateWithNodeWasCreated(e) => Some(e.node_aggregate_identifier()),
            Self::NodeAggregateWasRemoved(e) => Some(e.node_aggregate_identifier()),
            Self::NodeReferencesWereSet(e) => Some(e.node_aggregate_identifier()),
        }
    }

    /// Copy a node event onto another content stream
    ///
    /// Content stream lifecycle events belong to their stream and return `None`.
    pub fn copy_for_content_stream(&self, target: &ContentStreamIdentifier) -> Option<Self> {
        let target = target.clone();
        match self {
            Self::ContentStreamWasCreated(_) | Self::ContentStreamWasForked(_) => None,
            Self::RootNodeAggregateWithNodeWasCreated(e) => Some(
                Self::RootNodeAggregateWithNodeWasCreated(e.create_copy_for_content_stream(target)),
            ),
            Self::NodeAggregateWithNodeWasCreated(e) => Some(
                Self::NodeAggregateWithNodeWasCreated(e.create_copy_for_content_stream(target)),
            ),
            Self::NodeAggregateWasRemoved(e) => Some(Self::NodeAggregateWasRemoved(
                e.create_copy_for_content_stream(target),
            )),
            Self::NodeReferencesWereSet(e) => Some(Self::NodeReferencesWereSet(
                e.create_copy_for_content_stream(target),
            )),
        }
    }

    /// Plain field mapping of the event payload
    pub fn to_field_map(&self) -> ContentRepositoryResult<Map<String, Value>> {
        let value = match self {
            Self::ContentStreamWasCreated(e) => serde_json::to_value(e),
            Self::ContentStreamWasForked(e) => serde_json::to_value(e),
            Self::RootNodeAggregateWithNodeWasCreated(e) => serde_json::to_value(e),
            Self::NodeAggregateWithNodeWasCreated(e) => serde_json::to_value(e),
            Self::NodeAggregateWasRemoved(e) => serde_json::to_value(e),
            Self::NodeReferencesWereSet(e) => serde_json::to_value(e),
        }
        .map_err(|e| self.payload_error(e.to_string()))?;

        match value {
            Value::Object(fields) => Ok(fields),
            _ => Err(self.payload_error("payload is not an object".to_string())),
        }
    }

    /// Rebuild an event from its type tag and field mapping
    pub fn from_field_map(
        event_type: &str,
        fields: Map<String, Value>,
    ) -> ContentRepositoryResult<Self> {
        fn parse<T: DeserializeOwned>(
            event_type: &str,
            fields: Map<String, Value>,
        ) -> ContentRepositoryResult<T> {
            serde_json::from_value(Value::Object(fields)).map_err(|e| {
                ContentRepositoryError::InvalidEventPayload {
                    event_type: event_type.to_string(),
                    reason: e.to_string(),
                }
            })
        }

        match event_type {
            "ContentStreamWasCreated" => parse(event_type, fields).map(Self::ContentStreamWasCreated),
            "ContentStreamWasForked" => parse(event_type, fields).map(Self::ContentStreamWasForked),
            "RootNodeAggregateWithNodeWasCreated" => {
                parse(event_type, fields).map(Self::RootNodeAggregateWithNodeWasCreated)
            }
            "NodeAggregateWithNodeWasCreated" => {
                parse(event_type, fields).map(Self::NodeAggregateWithNodeWasCreated)
            }
            "NodeAggregateWasRemoved" => parse(event_type, fields).map(Self::NodeAggregateWasRemoved),
            "NodeReferencesWereSet" => parse(event_type, fields).map(Self::NodeReferencesWereSet),
            other => Err(ContentRepositoryError::InvalidEventPayload {
                event_type: other.to_string(),
                reason: "unknown event type".to_string(),
            }),
        }
    }

    fn payload_error(&self, reason: String) -> ContentRepositoryError {
        ContentRepositoryError::InvalidEventPayload {
            event_type: self.event_type().to_string(),
            reason,
        }
    }
}

impl DomainEvent for ContentRepositoryEvent {
    fn content_stream_identifier(&self) -> &ContentStreamIdentifier {
        match self {
            Self::ContentStreamWasCreated(e) => e.content_stream_identifier(),
            Self::ContentStreamWasForked(e) => e.content_stream_identifier(),
            Self::RootNodeAggregateWithNodeWasCreated(e) => e.content_stream_identifier(),
            Self::NodeAggregateWithNodeWasCreated(e) => e.content_stream_identifier(),
            Self::NodeAggregateWasRemoved(e) => e.content_stream_identifier(),
            Self::NodeReferencesWereSet(e) => e.content_stream_identifier(),
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            Self::ContentStreamWasCreated(e) => e.event_type(),
            Self::ContentStreamWasForked(e) => e.event_type(),
            Self::RootNodeAggregateWithNodeWasCreated(e) => e.event_type(),
            Self::NodeAggregateWithNodeWasCreated(e) => e.event_type(),
            Self::NodeAggregateWasRemoved(e) => e.event_type(),
            Self::NodeReferencesWereSet(e) => e.event_type(),
        }
    }
}
