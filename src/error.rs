//! Content repository errors
//!
//! Every failure is a command rejection. Nothing is appended when a command
//! fails, so callers can always retry from a clean slate.

use crate::dimension::DimensionSpacePoint;
use crate::value_objects::{ContentStreamIdentifier, NodeAggregateIdentifier, NodeTypeName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for content repository operations
pub type ContentRepositoryResult<T> = Result<T, ContentRepositoryError>;

/// Coarse classification of a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Something the command refers to does not exist
    NotFound,
    /// The command would create something that already exists
    Conflict,
    /// The projection holds inconsistent data
    Integrity,
    /// A domain rule forbids the operation
    Policy,
    /// The append raced with another writer
    Concurrency,
    /// Malformed input or configuration
    Invalid,
}

/// Errors that can occur while handling content repository commands
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ContentRepositoryError {
    /// Content stream not found
    #[error("Content stream \"{0}\" does not exist yet")]
    ContentStreamDoesNotExistYet(ContentStreamIdentifier),

    /// Content stream exists already
    #[error("Content stream \"{0}\" already exists")]
    ContentStreamAlreadyExists(ContentStreamIdentifier),

    /// No projected node aggregate with this identifier
    #[error("Node aggregate \"{node_aggregate_identifier}\" does currently not exist in content stream \"{content_stream_identifier}\"")]
    NodeAggregateCurrentlyDoesNotExist {
        content_stream_identifier: ContentStreamIdentifier,
        node_aggregate_identifier: NodeAggregateIdentifier,
    },

    /// A node aggregate with this identifier exists already
    #[error("Node aggregate \"{node_aggregate_identifier}\" does currently exist in content stream \"{content_stream_identifier}\"")]
    NodeAggregateCurrentlyExists {
        content_stream_identifier: ContentStreamIdentifier,
        node_aggregate_identifier: NodeAggregateIdentifier,
    },

    /// The projection returned more than one aggregate for one identifier
    #[error("Node aggregate \"{node_aggregate_identifier}\" is ambiguous: {count} projected aggregates found")]
    NodeAggregateIsAmbiguous {
        node_aggregate_identifier: NodeAggregateIdentifier,
        count: usize,
    },

    /// Coordinate is not part of the allowed dimension subspace
    #[error("Dimension space point {0} was not found in the allowed dimension subspace")]
    DimensionSpacePointNotFound(DimensionSpacePoint),

    /// Aggregate does not cover the requested coordinate
    #[error("Node aggregate \"{node_aggregate_identifier}\" does currently not cover dimension space point {dimension_space_point}")]
    NodeAggregateDoesCurrentlyNotCoverDimensionSpacePoint {
        node_aggregate_identifier: NodeAggregateIdentifier,
        dimension_space_point: DimensionSpacePoint,
    },

    /// Aggregate has no variant authored at the requested coordinate
    #[error("Node aggregate \"{node_aggregate_identifier}\" does currently not occupy dimension space point {dimension_space_point}")]
    NodeAggregateDoesCurrentlyNotOccupyDimensionSpacePoint {
        node_aggregate_identifier: NodeAggregateIdentifier,
        dimension_space_point: DimensionSpacePoint,
    },

    /// Tethered aggregates live and die with their parent
    #[error("The node aggregate \"{0}\" is tethered, and thus cannot be removed")]
    TetheredNodeAggregateCannotBeRemoved(NodeAggregateIdentifier),

    /// A pre-assigned identifier names a tethered path the node type does not declare
    #[error("Node type \"{node_type_name}\" declares no tethered descendant at path \"{path}\"")]
    TetheredNodePathNotDeclared {
        node_type_name: NodeTypeName,
        path: String,
    },

    /// Node type not registered
    #[error("Node type \"{0}\" not found")]
    NodeTypeNotFound(NodeTypeName),

    /// Abstract node types cannot be instantiated
    #[error("Node type \"{0}\" is abstract")]
    NodeTypeIsAbstract(NodeTypeName),

    /// Root creation requires a root node type
    #[error("Node type \"{0}\" is not of type root")]
    NodeTypeIsNotOfTypeRoot(NodeTypeName),

    /// Regular creation must not use a root node type
    #[error("Node type \"{0}\" is of type root")]
    NodeTypeIsOfTypeRoot(NodeTypeName),

    /// Expected-version check failed on append
    #[error("Concurrency conflict on stream \"{stream_name}\": expected {expected}, actual version {actual}")]
    ConcurrencyConflict {
        stream_name: String,
        expected: String,
        actual: u64,
    },

    /// Identifier failed validation
    #[error("Invalid identifier \"{value}\": {reason}")]
    InvalidIdentifier { value: String, reason: String },

    /// Event payload could not be mapped to or from fields
    #[error("Invalid event payload for \"{event_type}\": {reason}")]
    InvalidEventPayload { event_type: String, reason: String },

    /// Configuration could not be built
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ContentRepositoryError {
    /// Classify the rejection
    pub fn kind(&self) -> ErrorKind {
        use ContentRepositoryError::*;
        match self {
            ContentStreamDoesNotExistYet(_)
            | NodeAggregateCurrentlyDoesNotExist { .. }
            | DimensionSpacePointNotFound(_)
            | NodeAggregateDoesCurrentlyNotCoverDimensionSpacePoint { .. }
            | NodeAggregateDoesCurrentlyNotOccupyDimensionSpacePoint { .. }
            | NodeTypeNotFound(_) => ErrorKind::NotFound,
            ContentStreamAlreadyExists(_) | NodeAggregateCurrentlyExists { .. } => {
                ErrorKind::Conflict
            }
            NodeAggregateIsAmbiguous { .. } => ErrorKind::Integrity,
            TetheredNodeAggregateCannotBeRemoved(_)
            | NodeTypeIsAbstract(_)
            | NodeTypeIsNotOfTypeRoot(_)
            | NodeTypeIsOfTypeRoot(_) => ErrorKind::Policy,
            ConcurrencyConflict { .. } => ErrorKind::Concurrency,
            TetheredNodePathNotDeclared { .. }
            | InvalidIdentifier { .. }
            | InvalidEventPayload { .. }
            | InvalidConfiguration(_) => ErrorKind::Invalid,
        }
    }

    /// Only version conflicts can succeed when resubmitted unchanged
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Concurrency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let stream = ContentStreamIdentifier::from_string("cs-1").unwrap();
        let node = NodeAggregateIdentifier::from_string("n1").unwrap();

        assert_eq!(
            ContentRepositoryError::ContentStreamDoesNotExistYet(stream.clone()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ContentRepositoryError::NodeAggregateCurrentlyExists {
                content_stream_identifier: stream,
                node_aggregate_identifier: node.clone(),
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ContentRepositoryError::TetheredNodeAggregateCannotBeRemoved(node).kind(),
            ErrorKind::Policy
        );
    }

    #[test]
    fn test_only_concurrency_conflicts_are_retryable() {
        let conflict = ContentRepositoryError::ConcurrencyConflict {
            stream_name: "ContentStream:cs-1".to_string(),
            expected: "exactly 3".to_string(),
            actual: 4,
        };
        assert!(conflict.is_retryable());
        assert!(!ContentRepositoryError::NodeTypeNotFound(NodeTypeName::new("Acme:Page"))
            .is_retryable());
    }

    #[test]
    fn test_error_display() {
        let node = NodeAggregateIdentifier::from_string("tethered-main").unwrap();
        let display = ContentRepositoryError::TetheredNodeAggregateCannotBeRemoved(node).to_string();
        assert!(display.contains("tethered-main"));
        assert!(display.contains("cannot be removed"));
    }
}
