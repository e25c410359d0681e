//! Root node aggregate creation

use super::{EventsToPublish, NodeAggregateCommandHandler};
use crate::commands::CreateRootNodeAggregateWithNode;
use crate::domain_events::ContentRepositoryEvent;
use crate::error::ContentRepositoryResult;
use crate::event_store::ExpectedVersion;
use crate::events::RootNodeAggregateWithNodeWasCreated;
use crate::value_objects::NodeAggregateClassification;

impl NodeAggregateCommandHandler {
    /// A root aggregate covers every point of the allowed subspace
    pub(super) fn handle_create_root_node_aggregate_with_node(
        &self,
        command: &CreateRootNodeAggregateWithNode,
    ) -> ContentRepositoryResult<EventsToPublish> {
        self.cache_manager.disable_cache();

        self.require_content_stream_to_exist(&command.content_stream_identifier)?;
        self.require_projected_node_aggregate_to_not_exist(
            &command.content_stream_identifier,
            &command.node_aggregate_identifier,
        )?;
        let node_type = self.require_node_type(&command.node_type_name)?;
        self.require_node_type_to_not_be_abstract(&node_type)?;
        self.require_node_type_to_be_of_type_root(&node_type)?;

        let event = RootNodeAggregateWithNodeWasCreated {
            content_stream_identifier: command.content_stream_identifier.clone(),
            node_aggregate_identifier: command.node_aggregate_identifier.clone(),
            node_type_name: command.node_type_name.clone(),
            covered_dimension_space_points: self
                .dimension_space
                .allowed_dimension_subspace()
                .clone(),
            node_aggregate_classification: NodeAggregateClassification::Root,
            initiating_user_identifier: command.initiating_user_identifier.clone(),
        };

        Ok(EventsToPublish::new(
            &command.content_stream_identifier,
            vec![ContentRepositoryEvent::RootNodeAggregateWithNodeWasCreated(
                event,
            )],
            ExpectedVersion::Any,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::aggregate::NodeAggregate;
    use crate::commands::{ContentRepositoryCommand, CreateRootNodeAggregateWithNode};
    use crate::dimension::DimensionSpacePointSet;
    use crate::domain_events::ContentRepositoryEvent;
    use crate::error::ContentRepositoryError;
    use crate::event_store::ExpectedVersion;
    use crate::handlers::test_support::*;
    use crate::value_objects::{NodeAggregateClassification, NodeTypeName, UserIdentifier};
    use std::sync::Arc;

    fn command(node_type: &str) -> ContentRepositoryCommand {
        CreateRootNodeAggregateWithNode {
            content_stream_identifier: stream("cs-1"),
            node_aggregate_identifier: node("sites"),
            node_type_name: NodeTypeName::new(node_type),
            initiating_user_identifier: UserIdentifier::system_user(),
        }
        .into()
    }

    #[test]
    fn test_root_covers_the_whole_allowed_subspace() {
        let cache = Arc::new(CountingCacheManager::default());
        let handler = handler(StubContentGraph::default().with_stream(&stream("cs-1")), cache.clone());

        let events = handler.handle(&command("Neos.Neos:Sites")).unwrap();

        assert_eq!(events.expected_version, ExpectedVersion::Any);
        assert_eq!(*cache.disabled.read(), 1);
        match &events.events[..] {
            [ContentRepositoryEvent::RootNodeAggregateWithNodeWasCreated(created)] => {
                assert_eq!(
                    created.covered_dimension_space_points,
                    DimensionSpacePointSet::new([language("en"), language("de"), language("gsw")])
                );
                assert_eq!(
                    created.node_aggregate_classification,
                    NodeAggregateClassification::Root
                );
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_root_creation_guards() {
        let handler = handler(
            StubContentGraph::default().with_stream(&stream("cs-1")),
            Arc::new(CountingCacheManager::default()),
        );

        assert!(matches!(
            handler.handle(&command("Acme:AbstractRoot")),
            Err(ContentRepositoryError::NodeTypeIsAbstract(_))
        ));
        assert!(matches!(
            handler.handle(&command("Acme:Text")),
            Err(ContentRepositoryError::NodeTypeIsNotOfTypeRoot(_))
        ));
        assert!(matches!(
            handler.handle(&command("Acme:Nope")),
            Err(ContentRepositoryError::NodeTypeNotFound(_))
        ));
    }

    #[test]
    fn test_existing_identifier_conflicts_before_node_type_checks() {
        let existing = NodeAggregate::new(
            node("sites"),
            NodeTypeName::new("Neos.Neos:Sites"),
            NodeAggregateClassification::Root,
        );
        let handler = handler(
            StubContentGraph::default()
                .with_stream(&stream("cs-1"))
                .with_aggregate(&stream("cs-1"), existing),
            Arc::new(CountingCacheManager::default()),
        );

        assert!(matches!(
            handler.handle(&command("Acme:Nope")),
            Err(ContentRepositoryError::NodeAggregateCurrentlyExists { .. })
        ));
    }

    #[test]
    fn test_missing_content_stream() {
        let handler = handler(
            StubContentGraph::default(),
            Arc::new(CountingCacheManager::default()),
        );
        assert!(matches!(
            handler.handle(&command("Neos.Neos:Sites")),
            Err(ContentRepositoryError::ContentStreamDoesNotExistYet(_))
        ));
    }
}
