//! Named references between node aggregates

use super::{EventsToPublish, NodeAggregateCommandHandler};
use crate::commands::SetNodeReferences;
use crate::domain_events::ContentRepositoryEvent;
use crate::error::ContentRepositoryResult;
use crate::event_store::ExpectedVersion;
use crate::events::NodeReferencesWereSet;

impl NodeAggregateCommandHandler {
    /// Destinations are recorded as given, including order and duplicates
    pub(super) fn handle_set_node_references(
        &self,
        command: &SetNodeReferences,
    ) -> ContentRepositoryResult<EventsToPublish> {
        self.cache_manager.disable_cache();

        self.require_content_stream_to_exist(&command.content_stream_identifier)?;
        let source = self.require_projected_node_aggregate(
            &command.content_stream_identifier,
            &command.source_node_aggregate_identifier,
        )?;
        let origin = &command.source_origin_dimension_space_point;
        self.require_dimension_space_point_to_exist(origin.as_dimension_space_point())?;
        self.require_node_aggregate_to_occupy_dimension_space_point(&source, origin)?;

        for destination_identifier in &command.destination_node_aggregate_identifiers {
            let destination = self.require_projected_node_aggregate(
                &command.content_stream_identifier,
                destination_identifier,
            )?;
            self.require_node_aggregate_to_cover_dimension_space_point(
                &destination,
                origin.as_dimension_space_point(),
            )?;
        }

        let event = NodeReferencesWereSet {
            content_stream_identifier: command.content_stream_identifier.clone(),
            source_node_aggregate_identifier: command.source_node_aggregate_identifier.clone(),
            source_origin_dimension_space_point: origin.clone(),
            destination_node_aggregate_identifiers: command
                .destination_node_aggregate_identifiers
                .clone(),
            reference_name: command.reference_name.clone(),
            initiating_user_identifier: command.initiating_user_identifier.clone(),
        };

        Ok(EventsToPublish::new(
            &command.content_stream_identifier,
            vec![ContentRepositoryEvent::NodeReferencesWereSet(event)],
            ExpectedVersion::Any,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::aggregate::NodeAggregate;
    use crate::commands::{ContentRepositoryCommand, SetNodeReferences};
    use crate::domain_events::ContentRepositoryEvent;
    use crate::error::ContentRepositoryError;
    use crate::handlers::test_support::*;
    use crate::handlers::NodeAggregateCommandHandler;
    use crate::value_objects::{
        NodeAggregateClassification, NodeAggregateIdentifiers, NodeTypeName, PropertyName,
        UserIdentifier,
    };
    use std::sync::Arc;

    fn text(id: &str, origin: &str) -> NodeAggregate {
        NodeAggregate::new(
            node(id),
            NodeTypeName::new("Acme:Text"),
            NodeAggregateClassification::Regular,
        )
        .with_variant(language(origin).into(), [language(origin)])
    }

    fn setup() -> NodeAggregateCommandHandler {
        handler(
            StubContentGraph::default()
                .with_stream(&stream("cs-1"))
                .with_aggregate(&stream("cs-1"), text("source", "en"))
                .with_aggregate(&stream("cs-1"), text("a", "en"))
                .with_aggregate(&stream("cs-1"), text("c", "en"))
                .with_aggregate(&stream("cs-1"), text("german", "de")),
            Arc::new(CountingCacheManager::default()),
        )
    }

    fn set_references(origin: &str, destinations: &[&str]) -> ContentRepositoryCommand {
        SetNodeReferences {
            content_stream_identifier: stream("cs-1"),
            source_node_aggregate_identifier: node("source"),
            source_origin_dimension_space_point: language(origin).into(),
            destination_node_aggregate_identifiers: NodeAggregateIdentifiers::from_strings(
                destinations,
            )
            .unwrap(),
            reference_name: PropertyName::new("related"),
            initiating_user_identifier: UserIdentifier::system_user(),
        }
        .into()
    }

    #[test]
    fn test_destinations_keep_order_and_duplicates() {
        let events = setup().handle(&set_references("en", &["c", "a", "c"])).unwrap();
        match events.events.as_slice() {
            [ContentRepositoryEvent::NodeReferencesWereSet(set)] => {
                let ids: Vec<_> = set
                    .destination_node_aggregate_identifiers
                    .iter()
                    .map(|id| id.as_str())
                    .collect();
                assert_eq!(ids, ["c", "a", "c"]);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_empty_destination_list_clears_references() {
        let events = setup().handle(&set_references("en", &[])).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_source_must_occupy_origin() {
        assert!(matches!(
            setup().handle(&set_references("de", &["a"])),
            Err(ContentRepositoryError::NodeAggregateDoesCurrentlyNotOccupyDimensionSpacePoint { .. })
        ));
    }

    #[test]
    fn test_destination_guards() {
        assert!(matches!(
            setup().handle(&set_references("en", &["a", "missing"])),
            Err(ContentRepositoryError::NodeAggregateCurrentlyDoesNotExist { .. })
        ));
        assert!(matches!(
            setup().handle(&set_references("en", &["german"])),
            Err(ContentRepositoryError::NodeAggregateDoesCurrentlyNotCoverDimensionSpacePoint { .. })
        ));
    }
}
