//! Node aggregate removal

use super::{EventsToPublish, NodeAggregateCommandHandler};
use crate::commands::RemoveNodeAggregate;
use crate::domain_events::ContentRepositoryEvent;
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use crate::event_store::ExpectedVersion;
use crate::events::NodeAggregateWasRemoved;

impl NodeAggregateCommandHandler {
    pub(super) fn handle_remove_node_aggregate(
        &self,
        command: &RemoveNodeAggregate,
    ) -> ContentRepositoryResult<EventsToPublish> {
        self.cache_manager.disable_cache();

        self.require_content_stream_to_exist(&command.content_stream_identifier)?;
        let node_aggregate = self.require_projected_node_aggregate(
            &command.content_stream_identifier,
            &command.node_aggregate_identifier,
        )?;
        self.require_dimension_space_point_to_exist(&command.covered_dimension_space_point)?;
        self.require_node_aggregate_not_to_be_tethered(&node_aggregate)?;
        self.require_node_aggregate_to_cover_dimension_space_point(
            &node_aggregate,
            &command.covered_dimension_space_point,
        )?;
        if let Some(attachment_point) = &command.removal_attachment_point {
            self.require_projected_node_aggregate(
                &command.content_stream_identifier,
                attachment_point,
            )?;
        }

        let occupied_point = node_aggregate
            .occupation_by_covered(&command.covered_dimension_space_point)
            .ok_or_else(|| {
                ContentRepositoryError::NodeAggregateDoesCurrentlyNotCoverDimensionSpacePoint {
                    node_aggregate_identifier: node_aggregate.identifier().clone(),
                    dimension_space_point: command.covered_dimension_space_point.clone(),
                }
            })?;

        let variation_graph = self.dimension_space.variation_graph();
        let strategy = command.node_variant_selection_strategy;

        let event = NodeAggregateWasRemoved {
            content_stream_identifier: command.content_stream_identifier.clone(),
            node_aggregate_identifier: command.node_aggregate_identifier.clone(),
            affected_occupied_dimension_space_points: strategy
                .resolve_affected_origin_dimension_space_points(
                    occupied_point,
                    &node_aggregate,
                    variation_graph,
                ),
            affected_covered_dimension_space_points: strategy
                .resolve_affected_dimension_space_points(
                    &command.covered_dimension_space_point,
                    &node_aggregate,
                    variation_graph,
                ),
            initiating_user_identifier: command.initiating_user_identifier.clone(),
            removal_attachment_point: command.removal_attachment_point.clone(),
        };

        Ok(EventsToPublish::new(
            &command.content_stream_identifier,
            vec![ContentRepositoryEvent::NodeAggregateWasRemoved(event)],
            ExpectedVersion::Any,
        ))
    }
}
