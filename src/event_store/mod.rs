//! Append-only event log
//!
//! Every content stream is stored in its own event stream whose name is
//! derived from the content stream identifier, so all events of one content
//! stream are totally ordered.

use crate::domain_events::ContentRepositoryEvent;
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use crate::value_objects::{ContentStreamIdentifier, UserIdentifier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Name of one event stream in the log
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamName(String);

impl StreamName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The event stream holding all events of a content stream
    pub fn for_content_stream(content_stream_identifier: &ContentStreamIdentifier) -> Self {
        Self(format!("ContentStream:{content_stream_identifier}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optimistic concurrency expectation for an append
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedVersion {
    /// Accept regardless of the current version
    Any,
    /// The stream must not contain any events yet
    NoStream,
    /// The stream must contain exactly this many events
    Exact(u64),
}

impl ExpectedVersion {
    fn is_satisfied_by(&self, current: u64) -> bool {
        match self {
            Self::Any => true,
            Self::NoStream => current == 0,
            Self::Exact(expected) => *expected == current,
        }
    }
}

impl fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any version"),
            Self::NoStream => f.write_str("no stream"),
            Self::Exact(version) => write!(f, "exactly {version}"),
        }
    }
}

/// Metadata attached to each event, derived from the command that caused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub command_type: String,
    pub initiating_user_identifier: UserIdentifier,
    pub correlation_id: Uuid,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// An event on its way into the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: ContentRepositoryEvent,
    pub metadata: EventMetadata,
}

/// An event as persisted in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub stream_name: StreamName,
    /// 1-based position within its stream
    pub version: u64,
    pub event: ContentRepositoryEvent,
    pub metadata: EventMetadata,
}

/// Append-with-expected-version contract of the event log
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append events; returns the stream's version after the append
    async fn append(
        &self,
        stream_name: &StreamName,
        events: Vec<EventEnvelope>,
        expected_version: ExpectedVersion,
    ) -> ContentRepositoryResult<u64>;

    /// All events of a stream in append order
    async fn load(&self, stream_name: &StreamName) -> ContentRepositoryResult<Vec<StoredEvent>>;

    /// Number of events in the stream, 0 for a stream never written to
    async fn version(&self, stream_name: &StreamName) -> ContentRepositoryResult<u64>;
}

/// In-memory event store for tests and embedded use
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<StreamName, Vec<StoredEvent>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        stream_name: &StreamName,
        events: Vec<EventEnvelope>,
        expected_version: ExpectedVersion,
    ) -> ContentRepositoryResult<u64> {
        let mut streams = self.streams.write().await;
        let stream = streams.entry(stream_name.clone()).or_default();
        let current = stream.len() as u64;

        if !expected_version.is_satisfied_by(current) {
            return Err(ContentRepositoryError::ConcurrencyConflict {
                stream_name: stream_name.to_string(),
                expected: expected_version.to_string(),
                actual: current,
            });
        }

        for envelope in events {
            let version = stream.len() as u64 + 1;
            stream.push(StoredEvent {
                event_id: Uuid::new_v4(),
                stream_name: stream_name.clone(),
                version,
                event: envelope.event,
                metadata: envelope.metadata,
            });
        }

        Ok(stream.len() as u64)
    }

    async fn load(&self, stream_name: &StreamName) -> ContentRepositoryResult<Vec<StoredEvent>> {
        let streams = self.streams.read().await;
        Ok(streams.get(stream_name).cloned().unwrap_or_default())
    }

    async fn version(&self, stream_name: &StreamName) -> ContentRepositoryResult<u64> {
        let streams = self.streams.read().await;
        Ok(streams.get(stream_name).map_or(0, |events| events.len() as u64))
    }
}
