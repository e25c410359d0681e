//! Content stream lifecycle commands

use super::{EventsToPublish, NodeAggregateCommandHandler};
use crate::commands::{CreateContentStream, ForkContentStream};
use crate::domain_events::ContentRepositoryEvent;
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use crate::event_store::ExpectedVersion;
use crate::events::{ContentStreamWasCreated, ContentStreamWasForked};

impl NodeAggregateCommandHandler {
    pub(super) fn handle_create_content_stream(
        &self,
        command: &CreateContentStream,
    ) -> ContentRepositoryResult<EventsToPublish> {
        self.require_content_stream_to_not_exist(&command.content_stream_identifier)?;

        Ok(EventsToPublish::new(
            &command.content_stream_identifier,
            vec![ContentRepositoryEvent::ContentStreamWasCreated(
                ContentStreamWasCreated {
                    content_stream_identifier: command.content_stream_identifier.clone(),
                    initiating_user_identifier: command.initiating_user_identifier.clone(),
                },
            )],
            ExpectedVersion::NoStream,
        ))
    }

    pub(super) fn handle_fork_content_stream(
        &self,
        command: &ForkContentStream,
    ) -> ContentRepositoryResult<EventsToPublish> {
        self.require_content_stream_to_exist(&command.source_content_stream_identifier)?;
        self.require_content_stream_to_not_exist(&command.content_stream_identifier)?;

        let version_of_source_content_stream = self
            .content_stream_finder
            .content_stream_version(&command.source_content_stream_identifier)
            .ok_or_else(|| {
                ContentRepositoryError::ContentStreamDoesNotExistYet(
                    command.source_content_stream_identifier.clone(),
                )
            })?;

        Ok(EventsToPublish::new(
            &command.content_stream_identifier,
            vec![ContentRepositoryEvent::ContentStreamWasForked(
                ContentStreamWasForked {
                    new_content_stream_identifier: command.content_stream_identifier.clone(),
                    source_content_stream_identifier: command
                        .source_content_stream_identifier
                        .clone(),
                    version_of_source_content_stream,
                    initiating_user_identifier: command.initiating_user_identifier.clone(),
                },
            )],
            ExpectedVersion::NoStream,
        ))
    }
}
