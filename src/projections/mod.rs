//! Content projections
//!
//! Projections fold stored events into read models. Each keeps a checkpoint
//! per event stream so catching up only applies events it has not seen.

pub mod content_graph;

pub use content_graph::*;

use crate::error::ContentRepositoryResult;
use crate::event_store::{EventStore, StoredEvent, StreamName};
use crate::events::DomainEvent;
use async_trait::async_trait;
use tracing::error;

/// Trait for content projections
#[async_trait]
pub trait ContentRepositoryProjection: Send + Sync {
    /// Apply one stored event; events at or below the checkpoint are skipped
    ///
    /// An event that cannot be applied is still checkpointed and leaves the
    /// projected state untouched, so it never blocks the events after it.
    async fn apply(&self, event: &StoredEvent) -> ContentRepositoryResult<()>;

    /// Drop all projected state and checkpoints
    async fn reset(&self);

    /// Version of the last applied event of the stream, 0 if none
    fn checkpoint(&self, stream_name: &StreamName) -> u64;

    /// Apply every event of the stream past the checkpoint; returns how many were applied
    ///
    /// Events the projection cannot apply are logged and passed over.
    async fn catch_up(
        &self,
        event_store: &dyn EventStore,
        stream_name: &StreamName,
    ) -> ContentRepositoryResult<usize> {
        let checkpoint = self.checkpoint(stream_name);
        let mut applied = 0;
        for event in event_store.load(stream_name).await? {
            if event.version <= checkpoint {
                continue;
            }
            match self.apply(&event).await {
                Ok(()) => applied += 1,
                Err(e) => error!(
                    stream = %stream_name,
                    version = event.version,
                    event_type = event.event.event_type(),
                    error = %e,
                    "Projection skipped an event it cannot apply"
                ),
            }
        }
        Ok(applied)
    }
}
