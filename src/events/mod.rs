//! Content domain events
//!
//! Events are the only source of truth. The projected node aggregates are
//! derived from them and never mutated by command handlers.

mod content_stream_events;
mod node_events;

pub use content_stream_events::*;
pub use node_events::*;

use crate::value_objects::{ContentStreamIdentifier, NodeAggregateIdentifier};

/// Common behavior of all content domain events
pub trait DomainEvent {
    /// The stream this event belongs to
    fn content_stream_identifier(&self) -> &ContentStreamIdentifier;

    /// Stable name used as type tag when serialized
    fn event_type(&self) -> &'static str;
}

/// Events that may be replayed onto another content stream
pub trait PublishableToOtherContentStreams: Sized {
    /// Copy of this event with only the content stream identifier replaced
    fn create_copy_for_content_stream(&self, target: ContentStreamIdentifier) -> Self;
}

/// Events that concern exactly one node aggregate
pub trait EmbedsNodeAggregateIdentifier {
    fn node_aggregate_identifier(&self) -> &NodeAggregateIdentifier;
}
