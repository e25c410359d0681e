//! Content domain for the Composable Information Machine
//!
//! An event-sourced content graph: node aggregates vary across a dimension
//! space, commands are validated against the projected graph, and accepted
//! commands are appended to per-content-stream event streams.

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod content_repository;
pub mod dimension;
pub mod domain_events;
pub mod error;
pub mod event_store;
pub mod events;
pub mod handlers;
pub mod projections;
pub mod queries;
pub mod value_objects;

// Re-export main types
pub use aggregate::*;
pub use domain_events::*;
pub use events::*;

// Re-export commands
pub use commands::{
    ContentRepositoryCommand, CreateContentStream, CreateNodeAggregateWithNode,
    CreateRootNodeAggregateWithNode, ForkContentStream, RemoveNodeAggregate, SetNodeReferences,
};

// Re-export the dimension space model
pub use dimension::{
    ContentDimension, DimensionSpacePoint, DimensionSpacePointSet, DimensionSpaceProvider,
    InterDimensionalVariationGraph, NodeVariantSelectionStrategy, OriginDimensionSpacePoint,
    OriginDimensionSpacePointSet,
};

// Re-export errors
pub use error::{ContentRepositoryError, ContentRepositoryResult, ErrorKind};

// Re-export the event log
pub use event_store::{
    EventEnvelope, EventMetadata, EventStore, ExpectedVersion, InMemoryEventStore, StoredEvent,
    StreamName,
};

// Re-export command handlers
pub use handlers::{
    ContentGraph, ContentStreamFinder, EventPublisher, EventsToPublish, InMemoryNodeTypeManager,
    NodeAggregateCommandHandler, NodeTypeManager, ReadSideMemoryCache, ReadSideMemoryCacheManager,
};

// Re-export projections and queries
pub use projections::{ContentRepositoryProjection, InMemoryContentGraph};
pub use queries::{
    find_ancestors, find_siblings, ContentSubgraphIdentity, Node, NodeAccessor, Reference,
};

// Re-export value objects
pub use value_objects::{
    ContentStreamIdentifier, NodeAggregateClassification, NodeAggregateIdentifier,
    NodeAggregateIdentifiers, NodeName, NodeType, NodeTypeName, PropertyName, ReferenceName,
    UserIdentifier,
};

pub use config::ContentRepositoryConfig;
pub use content_repository::{CommandResult, ContentRepository};
