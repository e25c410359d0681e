//! Process-local read cache over the content graph
//!
//! Mutating commands disable (and thereby clear) the cache before their guards
//! run, so guards never observe aggregates cached before an earlier append.
//! Queries read through the same cache, which is re-enabled once the
//! projection has caught up.

use super::ContentGraph;
use crate::aggregate::NodeAggregate;
use crate::queries::{ContentSubgraphIdentity, Node, NodeAccessor};
use crate::value_objects::{ContentStreamIdentifier, NodeAggregateIdentifier};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Controls the read-side memory cache
pub trait ReadSideMemoryCacheManager: Send + Sync {
    /// Drop all cached entries and stop caching
    fn disable_cache(&self);

    /// Start caching lookups again
    fn enable_cache(&self);

    fn is_enabled(&self) -> bool;
}

type AggregateKey = (ContentStreamIdentifier, NodeAggregateIdentifier);

/// Content stream, dimension space point hash, node aggregate
type NodeKey = (ContentStreamIdentifier, String, NodeAggregateIdentifier);

fn node_key(
    subgraph_identity: &ContentSubgraphIdentity,
    node_aggregate_identifier: &NodeAggregateIdentifier,
) -> NodeKey {
    (
        subgraph_identity.content_stream_identifier.clone(),
        subgraph_identity.dimension_space_point.content_hash(),
        node_aggregate_identifier.clone(),
    )
}

#[derive(Default)]
struct CacheEntries {
    /// Bumped on every disable; loads started before a bump are not stored
    generation: u64,
    node_aggregates: HashMap<AggregateKey, Vec<NodeAggregate>>,
    nodes: HashMap<NodeKey, Option<Node>>,
    parents: HashMap<NodeKey, Option<Node>>,
    children: HashMap<NodeKey, Vec<Node>>,
}

impl CacheEntries {
    fn len(&self) -> usize {
        self.node_aggregates.len() + self.nodes.len() + self.parents.len() + self.children.len()
    }

    fn clear(&mut self) {
        self.node_aggregates.clear();
        self.nodes.clear();
        self.parents.clear();
        self.children.clear();
    }
}

/// Caching decorator for a content graph
///
/// Memoizes aggregate lookups for the command handlers and subgraph
/// navigation for queries.
pub struct ReadSideMemoryCache {
    content_graph: Arc<dyn ContentGraph>,
    node_accessor: Arc<dyn NodeAccessor>,
    enabled: AtomicBool,
    entries: Mutex<CacheEntries>,
}

impl ReadSideMemoryCache {
    /// Wrap a content graph; caching starts enabled
    pub fn new<G>(inner: Arc<G>) -> Self
    where
        G: ContentGraph + NodeAccessor + 'static,
    {
        Self {
            content_graph: inner.clone(),
            node_accessor: inner,
            enabled: AtomicBool::new(true),
            entries: Mutex::new(CacheEntries::default()),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.entries.lock().len()
    }

    fn memoize<K, V>(
        &self,
        select: fn(&mut CacheEntries) -> &mut HashMap<K, V>,
        key: K,
        load: impl FnOnce() -> V,
    ) -> V
    where
        K: Eq + Hash,
        V: Clone,
    {
        if !self.is_enabled() {
            return load();
        }

        let generation = {
            let mut entries = self.entries.lock();
            if let Some(cached) = select(&mut *entries).get(&key) {
                return cached.clone();
            }
            entries.generation
        };

        let loaded = load();
        let mut entries = self.entries.lock();
        if self.is_enabled() && entries.generation == generation {
            select(&mut *entries).insert(key, loaded.clone());
        }
        loaded
    }
}

impl ReadSideMemoryCacheManager for ReadSideMemoryCache {
    fn disable_cache(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        let mut entries = self.entries.lock();
        entries.generation += 1;
        entries.clear();
        trace!(generation = entries.generation, "Read side memory cache disabled");
    }

    fn enable_cache(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl ContentGraph for ReadSideMemoryCache {
    fn find_node_aggregates_by_identifier(
        &self,
        content_stream_identifier: &ContentStreamIdentifier,
        node_aggregate_identifier: &NodeAggregateIdentifier,
    ) -> Vec<NodeAggregate> {
        self.memoize(
            |entries| &mut entries.node_aggregates,
            (
                content_stream_identifier.clone(),
                node_aggregate_identifier.clone(),
            ),
            || {
                self.content_graph.find_node_aggregates_by_identifier(
                    content_stream_identifier,
                    node_aggregate_identifier,
                )
            },
        )
    }
}

impl NodeAccessor for ReadSideMemoryCache {
    fn find_node(
        &self,
        subgraph_identity: &ContentSubgraphIdentity,
        node_aggregate_identifier: &NodeAggregateIdentifier,
    ) -> Option<Node> {
        self.memoize(
            |entries| &mut entries.nodes,
            node_key(subgraph_identity, node_aggregate_identifier),
            || {
                self.node_accessor
                    .find_node(subgraph_identity, node_aggregate_identifier)
            },
        )
    }

    fn find_parent_node(&self, node: &Node) -> Option<Node> {
        self.memoize(
            |entries| &mut entries.parents,
            node_key(&node.subgraph_identity, &node.node_aggregate_identifier),
            || self.node_accessor.find_parent_node(node),
        )
    }

    fn find_child_nodes(&self, parent: &Node) -> Vec<Node> {
        self.memoize(
            |entries| &mut entries.children,
            node_key(&parent.subgraph_identity, &parent.node_aggregate_identifier),
            || self.node_accessor.find_child_nodes(parent),
        )
    }
}
