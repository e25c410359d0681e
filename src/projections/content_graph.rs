//! Content graph projection
//!
//! Keeps, per content stream, every node aggregate together with its parent
//! link and named references. Serves the handlers' read capabilities and the
//! subgraph navigation used by queries.

use super::ContentRepositoryProjection;
use crate::aggregate::NodeAggregate;
use crate::dimension::{DimensionSpacePoint, OriginDimensionSpacePoint};
use crate::domain_events::ContentRepositoryEvent;
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use crate::event_store::{StoredEvent, StreamName};
use crate::events::{
    ContentStreamWasForked, DomainEvent, NodeAggregateWasRemoved, NodeAggregateWithNodeWasCreated,
    NodeReferencesWereSet, RootNodeAggregateWithNodeWasCreated,
};
use crate::handlers::{ContentGraph, ContentStreamFinder};
use crate::queries::{ContentSubgraphIdentity, Node, NodeAccessor, Reference};
use crate::value_objects::{
    ContentStreamIdentifier, NodeAggregateIdentifier, NodeAggregateIdentifiers, ReferenceName,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Clone)]
struct ProjectedNodeAggregate {
    aggregate: NodeAggregate,
    parent: Option<NodeAggregateIdentifier>,
    references: BTreeMap<(OriginDimensionSpacePoint, ReferenceName), NodeAggregateIdentifiers>,
}

#[derive(Debug, Clone, Default)]
struct ContentStreamState {
    version: u64,
    /// Insertion order doubles as child order
    node_aggregates: IndexMap<NodeAggregateIdentifier, ProjectedNodeAggregate>,
}

#[derive(Debug, Default)]
struct ProjectionState {
    content_streams: HashMap<ContentStreamIdentifier, ContentStreamState>,
    checkpoints: HashMap<StreamName, u64>,
    /// Versions of stored events that could not be applied
    skipped_events: HashMap<StreamName, Vec<u64>>,
}

/// In-memory content graph
#[derive(Debug, Default)]
pub struct InMemoryContentGraph {
    state: RwLock<ProjectionState>,
}

impl InMemoryContentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every aggregate of a content stream in creation order
    pub fn node_aggregates(&self, content_stream_identifier: &ContentStreamIdentifier) -> Vec<NodeAggregate> {
        self.state
            .read()
            .content_streams
            .get(content_stream_identifier)
            .map(|stream| {
                stream
                    .node_aggregates
                    .values()
                    .map(|projected| projected.aggregate.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Outgoing references of the node's variant, in recorded order
    ///
    /// Destinations not visible in the node's subgraph are skipped.
    pub fn find_references(&self, node: &Node) -> Vec<Reference> {
        let state = self.state.read();
        let Some(stream) = state
            .content_streams
            .get(&node.subgraph_identity.content_stream_identifier)
        else {
            return Vec::new();
        };
        let Some(source) = stream.node_aggregates.get(&node.node_aggregate_identifier) else {
            return Vec::new();
        };

        source
            .references
            .iter()
            .filter(|((origin, _), _)| origin == &node.origin_dimension_space_point)
            .flat_map(|((_, name), destinations)| {
                destinations.iter().filter_map(|destination| {
                    stream
                        .node_aggregates
                        .get(destination)
                        .and_then(|d| node_in_subgraph(&d.aggregate, &node.subgraph_identity))
                        .map(|node| Reference {
                            name: name.clone(),
                            node,
                        })
                })
            })
            .collect()
    }

    /// Versions of the stream's events that were checkpointed without being applied
    pub fn skipped_events(&self, stream_name: &StreamName) -> Vec<u64> {
        self.state
            .read()
            .skipped_events
            .get(stream_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Check that `events` would apply on top of the stream's projected state
    ///
    /// Works on a copy of the stream; the projection itself is left untouched.
    pub fn require_applicable(
        &self,
        content_stream_identifier: &ContentStreamIdentifier,
        events: &[ContentRepositoryEvent],
    ) -> ContentRepositoryResult<()> {
        let stream = self
            .state
            .read()
            .content_streams
            .get(content_stream_identifier)
            .cloned()
            .ok_or_else(|| {
                ContentRepositoryError::ContentStreamDoesNotExistYet(content_stream_identifier.clone())
            })?;

        let mut scratch = ProjectionState::default();
        scratch
            .content_streams
            .insert(content_stream_identifier.clone(), stream);
        for event in events {
            Self::apply_event(&mut scratch, event)?;
        }
        Ok(())
    }

    fn apply_event(state: &mut ProjectionState, event: &ContentRepositoryEvent) -> ContentRepositoryResult<()> {
        match event {
            ContentRepositoryEvent::ContentStreamWasCreated(created) => {
                state
                    .content_streams
                    .entry(created.content_stream_identifier.clone())
                    .or_default();
                Ok(())
            }
            ContentRepositoryEvent::ContentStreamWasForked(forked) => Self::fork(state, forked),
            ContentRepositoryEvent::RootNodeAggregateWithNodeWasCreated(created) => {
                Self::create_root(state, created)
            }
            ContentRepositoryEvent::NodeAggregateWithNodeWasCreated(created) => {
                Self::create_node(state, created)
            }
            ContentRepositoryEvent::NodeAggregateWasRemoved(removed) => Self::remove(state, removed),
            ContentRepositoryEvent::NodeReferencesWereSet(set) => Self::set_references(state, set),
        }
    }

    fn fork(state: &mut ProjectionState, forked: &ContentStreamWasForked) -> ContentRepositoryResult<()> {
        let source = state
            .content_streams
            .get(&forked.source_content_stream_identifier)
            .ok_or_else(|| {
                ContentRepositoryError::ContentStreamDoesNotExistYet(
                    forked.source_content_stream_identifier.clone(),
                )
            })?;
        let node_aggregates = source.node_aggregates.clone();
        state.content_streams.insert(
            forked.new_content_stream_identifier.clone(),
            ContentStreamState {
                version: 0,
                node_aggregates,
            },
        );
        Ok(())
    }

    fn create_root(
        state: &mut ProjectionState,
        created: &RootNodeAggregateWithNodeWasCreated,
    ) -> ContentRepositoryResult<()> {
        let stream = stream_mut(state, &created.content_stream_identifier)?;
        require_vacant(stream, &created.content_stream_identifier, &created.node_aggregate_identifier)?;

        let mut aggregate = NodeAggregate::new(
            created.node_aggregate_identifier.clone(),
            created.node_type_name.clone(),
            created.node_aggregate_classification,
        );
        aggregate.add_variant(
            DimensionSpacePoint::empty().into(),
            created.covered_dimension_space_points.iter().cloned(),
        );
        stream.node_aggregates.insert(
            created.node_aggregate_identifier.clone(),
            ProjectedNodeAggregate {
                aggregate,
                parent: None,
                references: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn create_node(
        state: &mut ProjectionState,
        created: &NodeAggregateWithNodeWasCreated,
    ) -> ContentRepositoryResult<()> {
        let stream = stream_mut(state, &created.content_stream_identifier)?;
        require_vacant(stream, &created.content_stream_identifier, &created.node_aggregate_identifier)?;
        if !stream
            .node_aggregates
            .contains_key(&created.parent_node_aggregate_identifier)
        {
            return Err(ContentRepositoryError::NodeAggregateCurrentlyDoesNotExist {
                content_stream_identifier: created.content_stream_identifier.clone(),
                node_aggregate_identifier: created.parent_node_aggregate_identifier.clone(),
            });
        }

        let mut aggregate = NodeAggregate::new(
            created.node_aggregate_identifier.clone(),
            created.node_type_name.clone(),
            created.node_aggregate_classification,
        )
        .with_node_name(created.node_name.clone());
        aggregate.add_variant(
            created.origin_dimension_space_point.clone(),
            created.covered_dimension_space_points.iter().cloned(),
        );
        stream.node_aggregates.insert(
            created.node_aggregate_identifier.clone(),
            ProjectedNodeAggregate {
                aggregate,
                parent: Some(created.parent_node_aggregate_identifier.clone()),
                references: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Removing coverage from an aggregate removes it from its descendants too
    fn remove(state: &mut ProjectionState, removed: &NodeAggregateWasRemoved) -> ContentRepositoryResult<()> {
        let stream = stream_mut(state, &removed.content_stream_identifier)?;
        let projected = stream
            .node_aggregates
            .get_mut(&removed.node_aggregate_identifier)
            .ok_or_else(|| ContentRepositoryError::NodeAggregateCurrentlyDoesNotExist {
                content_stream_identifier: removed.content_stream_identifier.clone(),
                node_aggregate_identifier: removed.node_aggregate_identifier.clone(),
            })?;

        let mut emptied = Vec::new();
        if !projected
            .aggregate
            .remove_coverage(&removed.affected_covered_dimension_space_points)
        {
            emptied.push(removed.node_aggregate_identifier.clone());
        }
        let aggregate = &projected.aggregate;
        projected
            .references
            .retain(|(origin, _), _| aggregate.occupies_dimension_space_point(origin));

        let mut parents = vec![removed.node_aggregate_identifier.clone()];
        while let Some(parent) = parents.pop() {
            for (identifier, child) in stream.node_aggregates.iter_mut() {
                if child.parent.as_ref() != Some(&parent) {
                    continue;
                }
                if !child
                    .aggregate
                    .remove_coverage(&removed.affected_covered_dimension_space_points)
                {
                    emptied.push(identifier.clone());
                }
                let aggregate = &child.aggregate;
                child
                    .references
                    .retain(|(origin, _), _| aggregate.occupies_dimension_space_point(origin));
                parents.push(identifier.clone());
            }
        }

        for identifier in &emptied {
            stream.node_aggregates.shift_remove(identifier);
        }
        debug!(
            content_stream = %removed.content_stream_identifier,
            node_aggregate = %removed.node_aggregate_identifier,
            removed_aggregates = emptied.len(),
            "Projected node aggregate removal"
        );
        Ok(())
    }

    fn set_references(state: &mut ProjectionState, set: &NodeReferencesWereSet) -> ContentRepositoryResult<()> {
        let stream = stream_mut(state, &set.content_stream_identifier)?;
        let source = stream
            .node_aggregates
            .get_mut(&set.source_node_aggregate_identifier)
            .ok_or_else(|| ContentRepositoryError::NodeAggregateCurrentlyDoesNotExist {
                content_stream_identifier: set.content_stream_identifier.clone(),
                node_aggregate_identifier: set.source_node_aggregate_identifier.clone(),
            })?;

        let key = (
            set.source_origin_dimension_space_point.clone(),
            set.reference_name.clone(),
        );
        if set.destination_node_aggregate_identifiers.is_empty() {
            source.references.remove(&key);
        } else {
            source
                .references
                .insert(key, set.destination_node_aggregate_identifiers.clone());
        }
        Ok(())
    }
}

fn stream_mut<'a>(
    state: &'a mut ProjectionState,
    content_stream_identifier: &ContentStreamIdentifier,
) -> ContentRepositoryResult<&'a mut ContentStreamState> {
    state
        .content_streams
        .get_mut(content_stream_identifier)
        .ok_or_else(|| {
            ContentRepositoryError::ContentStreamDoesNotExistYet(content_stream_identifier.clone())
        })
}

fn require_vacant(
    stream: &ContentStreamState,
    content_stream_identifier: &ContentStreamIdentifier,
    node_aggregate_identifier: &NodeAggregateIdentifier,
) -> ContentRepositoryResult<()> {
    if stream.node_aggregates.contains_key(node_aggregate_identifier) {
        return Err(ContentRepositoryError::NodeAggregateCurrentlyExists {
            content_stream_identifier: content_stream_identifier.clone(),
            node_aggregate_identifier: node_aggregate_identifier.clone(),
        });
    }
    Ok(())
}

fn node_in_subgraph(aggregate: &NodeAggregate, subgraph_identity: &ContentSubgraphIdentity) -> Option<Node> {
    let origin = aggregate.occupation_by_covered(&subgraph_identity.dimension_space_point)?;
    Some(Node {
        subgraph_identity: subgraph_identity.clone(),
        node_aggregate_identifier: aggregate.identifier().clone(),
        node_type_name: aggregate.node_type_name().clone(),
        node_name: aggregate.node_name().cloned(),
        origin_dimension_space_point: origin.clone(),
        classification: aggregate.classification(),
    })
}

#[async_trait]
impl ContentRepositoryProjection for InMemoryContentGraph {
    async fn apply(&self, event: &StoredEvent) -> ContentRepositoryResult<()> {
        let mut state = self.state.write();
        let checkpoint = state
            .checkpoints
            .get(&event.stream_name)
            .copied()
            .unwrap_or(0);
        if event.version <= checkpoint {
            return Ok(());
        }

        let result = Self::apply_event(&mut state, &event.event);
        if result.is_err() {
            state
                .skipped_events
                .entry(event.stream_name.clone())
                .or_default()
                .push(event.version);
        }

        state
            .checkpoints
            .insert(event.stream_name.clone(), event.version);
        let content_stream_identifier = event.event.content_stream_identifier();
        if let Some(stream) = state.content_streams.get_mut(content_stream_identifier) {
            stream.version = event.version;
        }
        result
    }

    async fn reset(&self) {
        *self.state.write() = ProjectionState::default();
    }

    fn checkpoint(&self, stream_name: &StreamName) -> u64 {
        self.state
            .read()
            .checkpoints
            .get(stream_name)
            .copied()
            .unwrap_or(0)
    }
}

impl ContentStreamFinder for InMemoryContentGraph {
    fn has_content_stream(&self, content_stream_identifier: &ContentStreamIdentifier) -> bool {
        self.state
            .read()
            .content_streams
            .contains_key(content_stream_identifier)
    }

    fn content_stream_version(&self, content_stream_identifier: &ContentStreamIdentifier) -> Option<u64> {
        self.state
            .read()
            .content_streams
            .get(content_stream_identifier)
            .map(|stream| stream.version)
    }
}

impl ContentGraph for InMemoryContentGraph {
    fn find_node_aggregates_by_identifier(
        &self,
        content_stream_identifier: &ContentStreamIdentifier,
        node_aggregate_identifier: &NodeAggregateIdentifier,
    ) -> Vec<NodeAggregate> {
        self.state
            .read()
            .content_streams
            .get(content_stream_identifier)
            .and_then(|stream| stream.node_aggregates.get(node_aggregate_identifier))
            .map(|projected| vec![projected.aggregate.clone()])
            .unwrap_or_default()
    }
}

impl NodeAccessor for InMemoryContentGraph {
    fn find_node(
        &self,
        subgraph_identity: &ContentSubgraphIdentity,
        node_aggregate_identifier: &NodeAggregateIdentifier,
    ) -> Option<Node> {
        let state = self.state.read();
        let stream = state
            .content_streams
            .get(&subgraph_identity.content_stream_identifier)?;
        let projected = stream.node_aggregates.get(node_aggregate_identifier)?;
        node_in_subgraph(&projected.aggregate, subgraph_identity)
    }

    fn find_parent_node(&self, node: &Node) -> Option<Node> {
        let state = self.state.read();
        let stream = state
            .content_streams
            .get(&node.subgraph_identity.content_stream_identifier)?;
        let parent_identifier = stream
            .node_aggregates
            .get(&node.node_aggregate_identifier)?
            .parent
            .as_ref()?;
        let parent = stream.node_aggregates.get(parent_identifier)?;
        node_in_subgraph(&parent.aggregate, &node.subgraph_identity)
    }

    fn find_child_nodes(&self, parent: &Node) -> Vec<Node> {
        let state = self.state.read();
        let Some(stream) = state
            .content_streams
            .get(&parent.subgraph_identity.content_stream_identifier)
        else {
            return Vec::new();
        };
        stream
            .node_aggregates
            .values()
            .filter(|child| child.parent.as_ref() == Some(&parent.node_aggregate_identifier))
            .filter_map(|child| node_in_subgraph(&child.aggregate, &parent.subgraph_identity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{DimensionSpacePointSet, OriginDimensionSpacePointSet};
    use crate::event_store::{EventEnvelope, EventMetadata, EventStore, ExpectedVersion, InMemoryEventStore};
    use crate::events::{ContentStreamWasCreated, NodeAggregateWasRemoved};
    use crate::value_objects::{NodeAggregateClassification, NodeTypeName, PropertyName, UserIdentifier};

    fn stream(id: &str) -> ContentStreamIdentifier {
        ContentStreamIdentifier::from_string(id).unwrap()
    }

    fn node(id: &str) -> NodeAggregateIdentifier {
        NodeAggregateIdentifier::from_string(id).unwrap()
    }

    fn language(value: &str) -> DimensionSpacePoint {
        DimensionSpacePoint::from_pairs([("language", value)])
    }

    fn covered(
        graph: &InMemoryContentGraph,
        stream: &ContentStreamIdentifier,
        id: &NodeAggregateIdentifier,
    ) -> DimensionSpacePointSet {
        graph
            .find_node_aggregates_by_identifier(stream, id)
            .first()
            .map(|aggregate| aggregate.covered_dimension_space_points().clone())
            .unwrap_or_default()
    }

    fn all_languages() -> DimensionSpacePointSet {
        DimensionSpacePointSet::new([language("en"), language("de"), language("gsw")])
    }

    /// Stores events on one stream with consecutive versions
    struct Recorder {
        stream: ContentStreamIdentifier,
        version: u64,
    }

    impl Recorder {
        fn new(id: &str) -> Self {
            Self {
                stream: stream(id),
                version: 0,
            }
        }

        fn record(&mut self, event: ContentRepositoryEvent) -> StoredEvent {
            self.version += 1;
            StoredEvent {
                event_id: uuid::Uuid::new_v4(),
                stream_name: StreamName::for_content_stream(&self.stream),
                version: self.version,
                event,
                metadata: EventMetadata {
                    command_type: "Test".to_string(),
                    initiating_user_identifier: UserIdentifier::system_user(),
                    correlation_id: uuid::Uuid::new_v4(),
                    recorded_at: chrono::Utc::now(),
                },
            }
        }

        fn created_stream(&mut self) -> StoredEvent {
            let stream = self.stream.clone();
            self.record(ContentRepositoryEvent::ContentStreamWasCreated(ContentStreamWasCreated {
                content_stream_identifier: stream,
                initiating_user_identifier: UserIdentifier::system_user(),
            }))
        }

        fn created_root(&mut self) -> StoredEvent {
            let stream = self.stream.clone();
            self.record(ContentRepositoryEvent::RootNodeAggregateWithNodeWasCreated(
                RootNodeAggregateWithNodeWasCreated {
                    content_stream_identifier: stream,
                    node_aggregate_identifier: node("sites"),
                    node_type_name: NodeTypeName::new("Neos.Neos:Sites"),
                    covered_dimension_space_points: all_languages(),
                    node_aggregate_classification: NodeAggregateClassification::Root,
                    initiating_user_identifier: UserIdentifier::system_user(),
                },
            ))
        }

        fn created_node(&mut self, id: &str, parent: &str, origin: &str, covered: DimensionSpacePointSet) -> StoredEvent {
            let stream = self.stream.clone();
            self.record(ContentRepositoryEvent::NodeAggregateWithNodeWasCreated(
                NodeAggregateWithNodeWasCreated {
                    content_stream_identifier: stream,
                    node_aggregate_identifier: node(id),
                    node_type_name: NodeTypeName::new("Acme:Text"),
                    origin_dimension_space_point: language(origin).into(),
                    covered_dimension_space_points: covered,
                    parent_node_aggregate_identifier: node(parent),
                    node_name: None,
                    node_aggregate_classification: NodeAggregateClassification::Regular,
                    initiating_user_identifier: UserIdentifier::system_user(),
                },
            ))
        }
    }

    async fn seeded() -> (InMemoryContentGraph, Recorder) {
        let graph = InMemoryContentGraph::new();
        let mut recorder = Recorder::new("cs-1");
        graph.apply(&recorder.created_stream()).await.unwrap();
        graph.apply(&recorder.created_root()).await.unwrap();
        graph
            .apply(&recorder.created_node("page", "sites", "de", DimensionSpacePointSet::new([language("de"), language("gsw")])))
            .await
            .unwrap();
        graph
            .apply(&recorder.created_node("text", "page", "de", DimensionSpacePointSet::new([language("de"), language("gsw")])))
            .await
            .unwrap();
        graph
            .apply(&recorder.created_node("english", "sites", "en", DimensionSpacePointSet::new([language("en")])))
            .await
            .unwrap();
        (graph, recorder)
    }

    #[tokio::test]
    async fn test_projection_tracks_versions() {
        let (graph, _) = seeded().await;
        assert!(graph.has_content_stream(&stream("cs-1")));
        assert_eq!(graph.content_stream_version(&stream("cs-1")), Some(5));
        assert_eq!(graph.checkpoint(&StreamName::for_content_stream(&stream("cs-1"))), 5);
        assert_eq!(graph.node_aggregates(&stream("cs-1")).len(), 4);
        assert_eq!(covered(&graph, &stream("cs-1"), &node("sites")), all_languages());
    }

    #[tokio::test]
    async fn test_replayed_events_are_skipped() {
        let graph = InMemoryContentGraph::new();
        let mut recorder = Recorder::new("cs-1");
        let created = recorder.created_stream();
        let root = recorder.created_root();

        graph.apply(&created).await.unwrap();
        graph.apply(&root).await.unwrap();
        graph.apply(&root).await.unwrap();
        assert_eq!(graph.content_stream_version(&stream("cs-1")), Some(2));
    }

    #[tokio::test]
    async fn test_removal_cascades_to_descendants() {
        let (graph, mut recorder) = seeded().await;
        let removal = recorder.record(ContentRepositoryEvent::NodeAggregateWasRemoved(NodeAggregateWasRemoved {
            content_stream_identifier: stream("cs-1"),
            node_aggregate_identifier: node("page"),
            affected_occupied_dimension_space_points: OriginDimensionSpacePointSet::default(),
            affected_covered_dimension_space_points: DimensionSpacePointSet::new([language("gsw")]),
            initiating_user_identifier: UserIdentifier::system_user(),
            removal_attachment_point: None,
        }));
        graph.apply(&removal).await.unwrap();

        assert_eq!(
            covered(&graph, &stream("cs-1"), &node("text")),
            DimensionSpacePointSet::new([language("de")])
        );

        let full_removal = recorder.record(ContentRepositoryEvent::NodeAggregateWasRemoved(NodeAggregateWasRemoved {
            content_stream_identifier: stream("cs-1"),
            node_aggregate_identifier: node("page"),
            affected_occupied_dimension_space_points: OriginDimensionSpacePointSet::new([language("de").into()]),
            affected_covered_dimension_space_points: DimensionSpacePointSet::new([language("de")]),
            initiating_user_identifier: UserIdentifier::system_user(),
            removal_attachment_point: None,
        }));
        graph.apply(&full_removal).await.unwrap();

        assert!(graph.find_node_aggregates_by_identifier(&stream("cs-1"), &node("page")).is_empty());
        assert!(graph.find_node_aggregates_by_identifier(&stream("cs-1"), &node("text")).is_empty());
        assert_eq!(graph.node_aggregates(&stream("cs-1")).len(), 2);
    }

    #[tokio::test]
    async fn test_subgraph_navigation() {
        let (graph, _) = seeded().await;
        let gsw = ContentSubgraphIdentity::new(stream("cs-1"), language("gsw"));

        let text = graph.find_node(&gsw, &node("text")).unwrap();
        assert_eq!(text.origin_dimension_space_point, language("de").into());

        let page = graph.find_parent_node(&text).unwrap();
        assert_eq!(page.node_aggregate_identifier, node("page"));

        let root = graph.find_parent_node(&page).unwrap();
        let children: Vec<_> = graph
            .find_child_nodes(&root)
            .into_iter()
            .map(|n| n.node_aggregate_identifier)
            .collect();
        // english is not visible in gsw
        assert_eq!(children, vec![node("page")]);
        assert!(graph.find_node(&gsw, &node("english")).is_none());
    }

    #[tokio::test]
    async fn test_references_follow_the_source_variant() {
        let (graph, mut recorder) = seeded().await;
        let set = recorder.record(ContentRepositoryEvent::NodeReferencesWereSet(NodeReferencesWereSet {
            content_stream_identifier: stream("cs-1"),
            source_node_aggregate_identifier: node("text"),
            source_origin_dimension_space_point: language("de").into(),
            destination_node_aggregate_identifiers: NodeAggregateIdentifiers::from_strings(&["page", "english", "page"]).unwrap(),
            reference_name: PropertyName::new("related"),
            initiating_user_identifier: UserIdentifier::system_user(),
        }));
        graph.apply(&set).await.unwrap();

        let de = ContentSubgraphIdentity::new(stream("cs-1"), language("de"));
        let text = graph.find_node(&de, &node("text")).unwrap();
        let references: Vec<_> = graph
            .find_references(&text)
            .into_iter()
            .map(|r| r.node.node_aggregate_identifier)
            .collect();
        assert_eq!(references, vec![node("page"), node("page")]);
    }

    #[tokio::test]
    async fn test_fork_copies_source_state() {
        let (graph, _) = seeded().await;
        let mut fork = Recorder::new("user-ws");
        let forked = fork.record(ContentRepositoryEvent::ContentStreamWasForked(ContentStreamWasForked {
            new_content_stream_identifier: stream("user-ws"),
            source_content_stream_identifier: stream("cs-1"),
            version_of_source_content_stream: 5,
            initiating_user_identifier: UserIdentifier::system_user(),
        }));
        graph.apply(&forked).await.unwrap();

        assert_eq!(graph.content_stream_version(&stream("user-ws")), Some(1));
        assert_eq!(graph.node_aggregates(&stream("user-ws")).len(), 4);
    }

    #[tokio::test]
    async fn test_unappliable_events_are_checkpointed_and_recorded() {
        let graph = InMemoryContentGraph::new();
        let mut recorder = Recorder::new("cs-1");
        let stream_name = StreamName::for_content_stream(&stream("cs-1"));

        let error = graph.apply(&recorder.created_root()).await.unwrap_err();
        assert!(matches!(error, ContentRepositoryError::ContentStreamDoesNotExistYet(_)));
        assert_eq!(graph.checkpoint(&stream_name), 1);
        assert_eq!(graph.skipped_events(&stream_name), vec![1]);

        graph.reset().await;
        assert!(!graph.has_content_stream(&stream("cs-1")));
        assert!(graph.skipped_events(&stream_name).is_empty());
    }

    #[tokio::test]
    async fn test_catch_up_passes_over_unappliable_events() {
        let store = InMemoryEventStore::new();
        let graph = InMemoryContentGraph::new();
        let mut recorder = Recorder::new("cs-1");
        let stream_name = StreamName::for_content_stream(&stream("cs-1"));

        let created = recorder.created_stream();
        let ghost_removal = recorder.record(ContentRepositoryEvent::NodeAggregateWasRemoved(NodeAggregateWasRemoved {
            content_stream_identifier: stream("cs-1"),
            node_aggregate_identifier: node("ghost"),
            affected_occupied_dimension_space_points: OriginDimensionSpacePointSet::default(),
            affected_covered_dimension_space_points: all_languages(),
            initiating_user_identifier: UserIdentifier::system_user(),
            removal_attachment_point: None,
        }));
        let root = recorder.created_root();
        let envelopes = [created, ghost_removal, root]
            .into_iter()
            .map(|stored| EventEnvelope {
                event: stored.event,
                metadata: stored.metadata,
            })
            .collect();
        store.append(&stream_name, envelopes, ExpectedVersion::NoStream).await.unwrap();

        let applied = graph.catch_up(&store, &stream_name).await.unwrap();

        assert_eq!(applied, 2);
        assert_eq!(graph.checkpoint(&stream_name), 3);
        assert_eq!(graph.skipped_events(&stream_name), vec![2]);
        assert_eq!(graph.node_aggregates(&stream("cs-1")).len(), 1);
    }

    #[tokio::test]
    async fn test_creation_requires_vacant_identifier_and_known_parent() {
        let (graph, mut recorder) = seeded().await;

        let duplicate = recorder.created_node("page", "sites", "en", DimensionSpacePointSet::new([language("en")]));
        assert!(matches!(
            graph.apply(&duplicate).await,
            Err(ContentRepositoryError::NodeAggregateCurrentlyExists { .. })
        ));

        let orphan = recorder.created_node("orphan", "missing", "en", DimensionSpacePointSet::new([language("en")]));
        assert!(matches!(
            graph.apply(&orphan).await,
            Err(ContentRepositoryError::NodeAggregateCurrentlyDoesNotExist { .. })
        ));

        assert_eq!(graph.node_aggregates(&stream("cs-1")).len(), 4);
        assert_eq!(
            covered(&graph, &stream("cs-1"), &node("page")),
            DimensionSpacePointSet::new([language("de"), language("gsw")])
        );
    }

    #[tokio::test]
    async fn test_require_applicable_leaves_projection_untouched() {
        let (graph, mut recorder) = seeded().await;
        let draft = recorder
            .created_node("draft", "english", "en", DimensionSpacePointSet::new([language("en")]))
            .event;
        let draft_removal = ContentRepositoryEvent::NodeAggregateWasRemoved(NodeAggregateWasRemoved {
            content_stream_identifier: stream("cs-1"),
            node_aggregate_identifier: node("draft"),
            affected_occupied_dimension_space_points: OriginDimensionSpacePointSet::new([language("en").into()]),
            affected_covered_dimension_space_points: DimensionSpacePointSet::new([language("en")]),
            initiating_user_identifier: UserIdentifier::system_user(),
            removal_attachment_point: None,
        });

        graph
            .require_applicable(&stream("cs-1"), &[draft, draft_removal.clone()])
            .unwrap();
        assert_eq!(graph.node_aggregates(&stream("cs-1")).len(), 4);

        assert!(matches!(
            graph.require_applicable(&stream("cs-1"), &[draft_removal.clone()]),
            Err(ContentRepositoryError::NodeAggregateCurrentlyDoesNotExist { .. })
        ));
        assert!(matches!(
            graph.require_applicable(&stream("elsewhere"), &[]),
            Err(ContentRepositoryError::ContentStreamDoesNotExistYet(_))
        ));
    }

    #[tokio::test]
    async fn test_cascade_drops_references_of_released_descendant_origins() {
        let (graph, mut recorder) = seeded().await;
        {
            let mut state = graph.state.write();
            let text = state
                .content_streams
                .get_mut(&stream("cs-1"))
                .and_then(|stream| stream.node_aggregates.get_mut(&node("text")))
                .unwrap();
            text.aggregate.add_variant(language("en").into(), [language("en")]);
        }
        for origin in ["de", "en"] {
            let set = recorder.record(ContentRepositoryEvent::NodeReferencesWereSet(NodeReferencesWereSet {
                content_stream_identifier: stream("cs-1"),
                source_node_aggregate_identifier: node("text"),
                source_origin_dimension_space_point: language(origin).into(),
                destination_node_aggregate_identifiers: NodeAggregateIdentifiers::from_strings(&["sites"]).unwrap(),
                reference_name: PropertyName::new("related"),
                initiating_user_identifier: UserIdentifier::system_user(),
            }));
            graph.apply(&set).await.unwrap();
        }

        let removal = recorder.record(ContentRepositoryEvent::NodeAggregateWasRemoved(NodeAggregateWasRemoved {
            content_stream_identifier: stream("cs-1"),
            node_aggregate_identifier: node("page"),
            affected_occupied_dimension_space_points: OriginDimensionSpacePointSet::new([language("de").into()]),
            affected_covered_dimension_space_points: DimensionSpacePointSet::new([language("de"), language("gsw")]),
            initiating_user_identifier: UserIdentifier::system_user(),
            removal_attachment_point: None,
        }));
        graph.apply(&removal).await.unwrap();

        let en = ContentSubgraphIdentity::new(stream("cs-1"), language("en"));
        let text = graph.find_node(&en, &node("text")).unwrap();
        assert_eq!(graph.find_references(&text).len(), 1);

        let state = graph.state.read();
        let origins: Vec<_> = state.content_streams[&stream("cs-1")].node_aggregates[&node("text")]
            .references
            .keys()
            .map(|(origin, _)| origin.clone())
            .collect();
        assert_eq!(origins, vec![OriginDimensionSpacePoint::from(language("en"))]);
    }
}
