//! Content repository facade
//!
//! Wires the command handler, the event publisher and the content graph
//! projection together: a command is validated, its events are appended, and
//! the projection catches up before the call returns.

use crate::commands::ContentRepositoryCommand;
use crate::config::ContentRepositoryConfig;
use crate::domain_events::ContentRepositoryEvent;
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use crate::event_store::{EventStore, ExpectedVersion, InMemoryEventStore, StoredEvent, StreamName};
use crate::handlers::{
    ContentStreamFinder, EventPublisher, EventsToPublish, NodeAggregateCommandHandler,
    ReadSideMemoryCache, ReadSideMemoryCacheManager,
};
use crate::projections::{ContentRepositoryProjection, InMemoryContentGraph};
use crate::queries::{self, ContentSubgraphIdentity, Node, NodeAccessor, Reference};
use crate::value_objects::{
    ContentStreamIdentifier, NodeAggregateIdentifier, NodeTypeName, UserIdentifier,
};
use std::sync::Arc;
use tracing::{debug, error};

/// Outcome of a handled command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Events appended for the command, in order
    pub events: Vec<ContentRepositoryEvent>,
    /// Version of the target stream after the append
    pub version: u64,
}

/// Command and query entry point
pub struct ContentRepository {
    event_store: Arc<dyn EventStore>,
    content_graph: Arc<InMemoryContentGraph>,
    cache: Arc<ReadSideMemoryCache>,
    command_handler: NodeAggregateCommandHandler,
    event_publisher: EventPublisher,
    top_level_container_node_type: NodeTypeName,
}

impl ContentRepository {
    /// Repository backed by an in-memory event store
    pub fn from_config(config: &ContentRepositoryConfig) -> ContentRepositoryResult<Self> {
        Self::with_event_store(config, Arc::new(InMemoryEventStore::new()))
    }

    pub fn with_event_store(
        config: &ContentRepositoryConfig,
        event_store: Arc<dyn EventStore>,
    ) -> ContentRepositoryResult<Self> {
        let content_graph = Arc::new(InMemoryContentGraph::new());
        let cache = Arc::new(ReadSideMemoryCache::new(content_graph.clone()));

        let command_handler = NodeAggregateCommandHandler::new(
            content_graph.clone(),
            cache.clone(),
            Arc::new(config.node_type_manager()?),
            Arc::new(config.variation_graph()?),
            cache.clone(),
        );
        let event_publisher = EventPublisher::new(event_store.clone(), cache.clone());

        Ok(Self {
            event_store,
            content_graph,
            cache,
            command_handler,
            event_publisher,
            top_level_container_node_type: config.top_level_container_node_type(),
        })
    }

    /// Validate, append and project a command
    ///
    /// A rejected command appends nothing. Once the append succeeded the
    /// command counts as handled, even if the projection lags behind.
    pub async fn handle(
        &self,
        command: impl Into<ContentRepositoryCommand>,
    ) -> ContentRepositoryResult<CommandResult> {
        let command = command.into();
        let events_to_publish = self.command_handler.handle(&command)?;
        let stream_name = events_to_publish.stream_name.clone();
        let events = events_to_publish.events.clone();

        let version = self
            .event_publisher
            .publish(&command, events_to_publish)
            .await?;
        self.catch_up(&stream_name).await;

        Ok(CommandResult { events, version })
    }

    /// Append copies of node events onto another content stream
    ///
    /// Lifecycle events in `events` are skipped. The batch is rejected without
    /// appending anything unless every copy applies to the target's projected
    /// state.
    pub async fn publish_copies(
        &self,
        target: &ContentStreamIdentifier,
        events: &[ContentRepositoryEvent],
        initiating_user_identifier: &UserIdentifier,
    ) -> ContentRepositoryResult<CommandResult> {
        if !self.content_graph.has_content_stream(target) {
            return Err(ContentRepositoryError::ContentStreamDoesNotExistYet(
                target.clone(),
            ));
        }

        let copies: Vec<_> = events
            .iter()
            .filter_map(|event| event.copy_for_content_stream(target))
            .collect();
        debug!(
            content_stream = %target,
            offered = events.len(),
            copied = copies.len(),
            "Publishing event copies"
        );
        self.content_graph.require_applicable(target, &copies)?;

        let events_to_publish = EventsToPublish::new(target, copies.clone(), ExpectedVersion::Any);
        let stream_name = events_to_publish.stream_name.clone();
        let version = self
            .event_publisher
            .publish_as("PublishCopiedEvents", initiating_user_identifier, events_to_publish)
            .await?;
        self.catch_up(&stream_name).await;

        Ok(CommandResult {
            events: copies,
            version,
        })
    }

    /// Project appended events; the cache stays off while the projection lags
    async fn catch_up(&self, stream_name: &StreamName) {
        match self
            .content_graph
            .catch_up(self.event_store.as_ref(), stream_name)
            .await
        {
            Ok(applied) => {
                debug!(stream = %stream_name, applied, "Projection caught up");
                self.cache.enable_cache();
            }
            Err(e) => error!(
                stream = %stream_name,
                error = %e,
                "Projection could not catch up after append"
            ),
        }
    }

    /// Every stored event of a content stream
    pub async fn load_events(
        &self,
        content_stream_identifier: &ContentStreamIdentifier,
    ) -> ContentRepositoryResult<Vec<StoredEvent>> {
        self.event_store
            .load(&StreamName::for_content_stream(content_stream_identifier))
            .await
    }

    /// Rebuild the projection of the given streams from the log
    ///
    /// Source streams must be listed before their forks.
    pub async fn replay(
        &self,
        content_stream_identifiers: &[ContentStreamIdentifier],
    ) -> ContentRepositoryResult<()> {
        self.cache.disable_cache();
        self.content_graph.reset().await;
        for content_stream_identifier in content_stream_identifiers {
            let stream_name = StreamName::for_content_stream(content_stream_identifier);
            let applied = self
                .content_graph
                .catch_up(self.event_store.as_ref(), &stream_name)
                .await?;
            debug!(stream = %stream_name, applied, "Projection replayed");
        }
        self.cache.enable_cache();
        Ok(())
    }

    pub fn content_graph(&self) -> &InMemoryContentGraph {
        &self.content_graph
    }

    pub fn read_side_cache(&self) -> &ReadSideMemoryCache {
        &self.cache
    }

    pub fn find_node(
        &self,
        subgraph_identity: &ContentSubgraphIdentity,
        node_aggregate_identifier: &NodeAggregateIdentifier,
    ) -> Option<Node> {
        self.cache
            .find_node(subgraph_identity, node_aggregate_identifier)
    }

    pub fn find_references(&self, node: &Node) -> Vec<Reference> {
        self.content_graph.find_references(node)
    }

    /// Ancestors below the configured top-level container
    pub fn find_ancestors(&self, nodes: &[Node]) -> Vec<Node> {
        queries::find_ancestors(
            self.cache.as_ref(),
            nodes,
            &self.top_level_container_node_type,
        )
    }

    pub fn find_siblings(&self, nodes: &[Node]) -> Vec<Node> {
        queries::find_siblings(self.cache.as_ref(), nodes)
    }
}
