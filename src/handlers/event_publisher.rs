//! Appends handler output to the event log

use super::ReadSideMemoryCacheManager;
use crate::commands::ContentRepositoryCommand;
use crate::domain_events::ContentRepositoryEvent;
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use crate::event_store::{EventEnvelope, EventMetadata, EventStore, ExpectedVersion, StreamName};
use crate::value_objects::{ContentStreamIdentifier, UserIdentifier};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Events derived by a handler, bound for one stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsToPublish {
    pub stream_name: StreamName,
    pub events: Vec<ContentRepositoryEvent>,
    pub expected_version: ExpectedVersion,
}

impl EventsToPublish {
    /// Events for the stream of `content_stream_identifier`
    pub fn new(
        content_stream_identifier: &ContentStreamIdentifier,
        events: Vec<ContentRepositoryEvent>,
        expected_version: ExpectedVersion,
    ) -> Self {
        Self {
            stream_name: StreamName::for_content_stream(content_stream_identifier),
            events,
            expected_version,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Publishes derived events with an optimistic version check
pub struct EventPublisher {
    event_store: Arc<dyn EventStore>,
    cache_manager: Arc<dyn ReadSideMemoryCacheManager>,
}

impl EventPublisher {
    pub fn new(
        event_store: Arc<dyn EventStore>,
        cache_manager: Arc<dyn ReadSideMemoryCacheManager>,
    ) -> Self {
        Self {
            event_store,
            cache_manager,
        }
    }

    /// Append the events of a handled command; returns the stream version after the append
    pub async fn publish(
        &self,
        command: &ContentRepositoryCommand,
        events_to_publish: EventsToPublish,
    ) -> ContentRepositoryResult<u64> {
        self.publish_as(
            command.command_type(),
            command.initiating_user_identifier(),
            events_to_publish,
        )
        .await
    }

    /// Append events on behalf of a named operation
    ///
    /// Used where events are not derived from a single command, such as when
    /// copies of events are published onto another content stream.
    pub async fn publish_as(
        &self,
        command_type: &str,
        initiating_user_identifier: &UserIdentifier,
        events_to_publish: EventsToPublish,
    ) -> ContentRepositoryResult<u64> {
        self.cache_manager.disable_cache();

        let EventsToPublish {
            stream_name,
            events,
            expected_version,
        } = events_to_publish;
        let event_count = events.len();
        let correlation_id = Uuid::new_v4();
        let recorded_at = chrono::Utc::now();

        let envelopes = events
            .into_iter()
            .map(|event| EventEnvelope {
                event,
                metadata: EventMetadata {
                    command_type: command_type.to_string(),
                    initiating_user_identifier: initiating_user_identifier.clone(),
                    correlation_id,
                    recorded_at,
                },
            })
            .collect();

        match self
            .event_store
            .append(&stream_name, envelopes, expected_version)
            .await
        {
            Ok(version) => {
                info!(
                    stream = %stream_name,
                    command_type,
                    event_count,
                    version,
                    %correlation_id,
                    "Published events"
                );
                Ok(version)
            }
            Err(e @ ContentRepositoryError::ConcurrencyConflict { .. }) => {
                error!(
                    stream = %stream_name,
                    command_type,
                    expected = %expected_version,
                    error = %e,
                    "Append rejected by version check"
                );
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
