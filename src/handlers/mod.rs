//! Content command handlers
//!
//! Command handlers validate preconditions against the projected state and the
//! dimension space model, then derive events. They never touch the event log
//! themselves; the derived events are returned as [`EventsToPublish`] and
//! handed to the [`EventPublisher`].

mod cache;
mod constraint_checks;
mod content_stream;
mod event_publisher;
mod node_creation;
mod node_referencing;
mod node_removal;
mod root_node_creation;

pub use cache::{ReadSideMemoryCache, ReadSideMemoryCacheManager};
pub use event_publisher::{EventPublisher, EventsToPublish};

use crate::aggregate::NodeAggregate;
use crate::commands::ContentRepositoryCommand;
use crate::dimension::DimensionSpaceProvider;
use crate::error::ContentRepositoryResult;
use crate::value_objects::{
    ContentStreamIdentifier, NodeAggregateIdentifier, NodeType, NodeTypeName,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tells whether content streams exist and how far they have been projected
pub trait ContentStreamFinder: Send + Sync {
    fn has_content_stream(&self, content_stream_identifier: &ContentStreamIdentifier) -> bool;

    /// Number of events of the stream seen by the read side
    fn content_stream_version(
        &self,
        content_stream_identifier: &ContentStreamIdentifier,
    ) -> Option<u64>;
}

/// Lookup of projected node aggregates
pub trait ContentGraph: Send + Sync {
    /// Every projected aggregate carrying this identifier
    ///
    /// More than one result means the projection is inconsistent.
    fn find_node_aggregates_by_identifier(
        &self,
        content_stream_identifier: &ContentStreamIdentifier,
        node_aggregate_identifier: &NodeAggregateIdentifier,
    ) -> Vec<NodeAggregate>;
}

/// Registry of node types
pub trait NodeTypeManager: Send + Sync {
    fn get_node_type(&self, node_type_name: &NodeTypeName) -> Option<NodeType>;
}

/// In-memory node type registry
#[derive(Debug, Clone, Default)]
pub struct InMemoryNodeTypeManager {
    node_types: HashMap<NodeTypeName, NodeType>,
}

impl InMemoryNodeTypeManager {
    pub fn new(node_types: impl IntoIterator<Item = NodeType>) -> Self {
        Self {
            node_types: node_types
                .into_iter()
                .map(|node_type| (node_type.name.clone(), node_type))
                .collect(),
        }
    }

    pub fn has_node_type(&self, node_type_name: &NodeTypeName) -> bool {
        self.node_types.contains_key(node_type_name)
    }
}

impl NodeTypeManager for InMemoryNodeTypeManager {
    fn get_node_type(&self, node_type_name: &NodeTypeName) -> Option<NodeType> {
        self.node_types.get(node_type_name).cloned()
    }
}

/// Handles every content repository command
///
/// Capabilities are injected at construction so that each can be backed by a
/// different store.
pub struct NodeAggregateCommandHandler {
    content_stream_finder: Arc<dyn ContentStreamFinder>,
    content_graph: Arc<dyn ContentGraph>,
    node_type_manager: Arc<dyn NodeTypeManager>,
    dimension_space: Arc<dyn DimensionSpaceProvider>,
    cache_manager: Arc<dyn ReadSideMemoryCacheManager>,
}

impl NodeAggregateCommandHandler {
    /// Create a new command handler
    pub fn new(
        content_stream_finder: Arc<dyn ContentStreamFinder>,
        content_graph: Arc<dyn ContentGraph>,
        node_type_manager: Arc<dyn NodeTypeManager>,
        dimension_space: Arc<dyn DimensionSpaceProvider>,
        cache_manager: Arc<dyn ReadSideMemoryCacheManager>,
    ) -> Self {
        Self {
            content_stream_finder,
            content_graph,
            node_type_manager,
            dimension_space,
            cache_manager,
        }
    }

    /// Run the guard chain for a command and derive its events
    pub fn handle(&self, command: &ContentRepositoryCommand) -> ContentRepositoryResult<EventsToPublish> {
        debug!(
            command_type = command.command_type(),
            content_stream = %command.content_stream_identifier(),
            "Handling content repository command"
        );

        let result = match command {
            ContentRepositoryCommand::CreateContentStream(c) => self.handle_create_content_stream(c),
            ContentRepositoryCommand::ForkContentStream(c) => self.handle_fork_content_stream(c),
            ContentRepositoryCommand::CreateRootNodeAggregateWithNode(c) => {
                self.handle_create_root_node_aggregate_with_node(c)
            }
            ContentRepositoryCommand::CreateNodeAggregateWithNode(c) => {
                self.handle_create_node_aggregate_with_node(c)
            }
            ContentRepositoryCommand::RemoveNodeAggregate(c) => self.handle_remove_node_aggregate(c),
            ContentRepositoryCommand::SetNodeReferences(c) => self.handle_set_node_references(c),
        };

        if let Err(error) = &result {
            warn!(
                command_type = command.command_type(),
                content_stream = %command.content_stream_identifier(),
                error_kind = ?error.kind(),
                error = %error,
                "Command rejected"
            );
        }

        result
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Hand-assembled capabilities for handler tests

    use super::*;
    use crate::dimension::{ContentDimension, InterDimensionalVariationGraph};
    use crate::queries::{ContentSubgraphIdentity, Node, NodeAccessor};
    use crate::value_objects::NodeName;
    use parking_lot::RwLock;

    #[derive(Default)]
    pub struct StubContentGraph {
        pub streams: RwLock<HashMap<ContentStreamIdentifier, u64>>,
        pub aggregates: RwLock<Vec<(ContentStreamIdentifier, NodeAggregate)>>,
    }

    impl StubContentGraph {
        pub fn with_stream(self, stream: &ContentStreamIdentifier) -> Self {
            self.streams.write().insert(stream.clone(), 1);
            self
        }

        pub fn with_aggregate(self, stream: &ContentStreamIdentifier, aggregate: NodeAggregate) -> Self {
            self.aggregates.write().push((stream.clone(), aggregate));
            self
        }
    }

    impl ContentStreamFinder for StubContentGraph {
        fn has_content_stream(&self, id: &ContentStreamIdentifier) -> bool {
            self.streams.read().contains_key(id)
        }

        fn content_stream_version(&self, id: &ContentStreamIdentifier) -> Option<u64> {
            self.streams.read().get(id).copied()
        }
    }

    impl ContentGraph for StubContentGraph {
        fn find_node_aggregates_by_identifier(
            &self,
            stream: &ContentStreamIdentifier,
            id: &NodeAggregateIdentifier,
        ) -> Vec<NodeAggregate> {
            self.aggregates
                .read()
                .iter()
                .filter(|(s, a)| s == stream && a.identifier() == id)
                .map(|(_, a)| a.clone())
                .collect()
        }
    }

    impl NodeAccessor for StubContentGraph {
        fn find_node(
            &self,
            subgraph: &ContentSubgraphIdentity,
            id: &NodeAggregateIdentifier,
        ) -> Option<Node> {
            let aggregate = self
                .find_node_aggregates_by_identifier(&subgraph.content_stream_identifier, id)
                .pop()?;
            let origin = aggregate
                .occupation_by_covered(&subgraph.dimension_space_point)?
                .clone();
            Some(Node {
                subgraph_identity: subgraph.clone(),
                node_aggregate_identifier: id.clone(),
                node_type_name: aggregate.node_type_name().clone(),
                node_name: aggregate.node_name().cloned(),
                origin_dimension_space_point: origin,
                classification: aggregate.classification(),
            })
        }

        fn find_parent_node(&self, _node: &Node) -> Option<Node> {
            None
        }

        fn find_child_nodes(&self, _parent: &Node) -> Vec<Node> {
            Vec::new()
        }
    }

    #[derive(Default)]
    pub struct CountingCacheManager {
        pub disabled: RwLock<usize>,
        pub enabled: RwLock<usize>,
    }

    impl ReadSideMemoryCacheManager for CountingCacheManager {
        fn disable_cache(&self) {
            *self.disabled.write() += 1;
        }

        fn enable_cache(&self) {
            *self.enabled.write() += 1;
        }

        fn is_enabled(&self) -> bool {
            false
        }
    }

    pub fn stream(id: &str) -> ContentStreamIdentifier {
        ContentStreamIdentifier::from_string(id).unwrap()
    }

    pub fn node(id: &str) -> NodeAggregateIdentifier {
        NodeAggregateIdentifier::from_string(id).unwrap()
    }

    pub fn language(value: &str) -> crate::dimension::DimensionSpacePoint {
        crate::dimension::DimensionSpacePoint::from_pairs([("language", value)])
    }

    /// Languages en and de, plus gsw specializing de
    pub fn variation_graph() -> InterDimensionalVariationGraph {
        let mut generalizations = indexmap::IndexMap::new();
        generalizations.insert("en".to_string(), None);
        generalizations.insert("de".to_string(), None);
        generalizations.insert("gsw".to_string(), Some("de".to_string()));
        InterDimensionalVariationGraph::from_dimensions(&[
            ContentDimension::new("language", generalizations).unwrap()
        ])
    }

    pub fn node_types() -> InMemoryNodeTypeManager {
        InMemoryNodeTypeManager::new([
            NodeType::root(NodeTypeName::new("Neos.Neos:Sites")),
            NodeType::root(NodeTypeName::new("Acme:AbstractRoot")).with_abstract(true),
            NodeType::new(NodeTypeName::new("Acme:Text")),
            NodeType::new(NodeTypeName::new("Acme:ContentCollection")),
            NodeType::new(NodeTypeName::new("Acme:Page")).with_tethered_child(
                NodeName::from_string("main").unwrap(),
                NodeTypeName::new("Acme:ContentCollection"),
            ),
            NodeType::new(NodeTypeName::new("Acme:AbstractPage")).with_abstract(true),
        ])
    }

    pub fn handler(
        graph: StubContentGraph,
        cache: Arc<CountingCacheManager>,
    ) -> NodeAggregateCommandHandler {
        let graph = Arc::new(graph);
        NodeAggregateCommandHandler::new(
            graph.clone(),
            graph,
            Arc::new(node_types()),
            Arc::new(variation_graph()),
            cache,
        )
    }
}
