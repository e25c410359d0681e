//! Content stream lifecycle events

use super::DomainEvent;
use crate::value_objects::{ContentStreamIdentifier, UserIdentifier};
use serde::{Deserialize, Serialize};

/// An empty content stream was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStreamWasCreated {
    pub content_stream_identifier: ContentStreamIdentifier,
    pub initiating_user_identifier: UserIdentifier,
}

/// A content stream was branched off another one at a known version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStreamWasForked {
    pub new_content_stream_identifier: ContentStreamIdentifier,
    pub source_content_stream_identifier: ContentStreamIdentifier,
    pub version_of_source_content_stream: u64,
    pub initiating_user_identifier: UserIdentifier,
}

impl DomainEvent for ContentStreamWasCreated {
    fn content_stream_identifier(&self) -> &ContentStreamIdentifier {
        &self.content_stream_identifier
    }

    fn event_type(&self) -> &'static str {
        "ContentStreamWasCreated"
    }
}

impl DomainEvent for ContentStreamWasForked {
    fn content_stream_identifier(&self) -> &ContentStreamIdentifier {
        &self.new_content_stream_identifier
    }

    fn event_type(&self) -> &'static str {
        "ContentStreamWasForked"
    }
}
