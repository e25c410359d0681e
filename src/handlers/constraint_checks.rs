//! Precondition guards shared by the command handlers
//!
//! Each guard either returns the value it verified or rejects the command.
//! Guards never build events, so a failing guard leaves nothing behind.

use super::NodeAggregateCommandHandler;
use crate::aggregate::NodeAggregate;
use crate::dimension::{DimensionSpacePoint, OriginDimensionSpacePoint};
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use crate::value_objects::{
    ContentStreamIdentifier, NodeAggregateIdentifier, NodeType, NodeTypeName,
};

impl NodeAggregateCommandHandler {
    pub(super) fn require_content_stream_to_exist(
        &self,
        content_stream_identifier: &ContentStreamIdentifier,
    ) -> ContentRepositoryResult<()> {
        if !self
            .content_stream_finder
            .has_content_stream(content_stream_identifier)
        {
            return Err(ContentRepositoryError::ContentStreamDoesNotExistYet(
                content_stream_identifier.clone(),
            ));
        }
        Ok(())
    }

    pub(super) fn require_content_stream_to_not_exist(
        &self,
        content_stream_identifier: &ContentStreamIdentifier,
    ) -> ContentRepositoryResult<()> {
        if self
            .content_stream_finder
            .has_content_stream(content_stream_identifier)
        {
            return Err(ContentRepositoryError::ContentStreamAlreadyExists(
                content_stream_identifier.clone(),
            ));
        }
        Ok(())
    }

    /// The single projected aggregate with this identifier
    pub(super) fn require_projected_node_aggregate(
        &self,
        content_stream_identifier: &ContentStreamIdentifier,
        node_aggregate_identifier: &NodeAggregateIdentifier,
    ) -> ContentRepositoryResult<NodeAggregate> {
        let mut found = self
            .content_graph
            .find_node_aggregates_by_identifier(content_stream_identifier, node_aggregate_identifier);

        match found.len() {
            0 => Err(ContentRepositoryError::NodeAggregateCurrentlyDoesNotExist {
                content_stream_identifier: content_stream_identifier.clone(),
                node_aggregate_identifier: node_aggregate_identifier.clone(),
            }),
            1 => Ok(found.remove(0)),
            count => Err(ContentRepositoryError::NodeAggregateIsAmbiguous {
                node_aggregate_identifier: node_aggregate_identifier.clone(),
                count,
            }),
        }
    }

    pub(super) fn require_projected_node_aggregate_to_not_exist(
        &self,
        content_stream_identifier: &ContentStreamIdentifier,
        node_aggregate_identifier: &NodeAggregateIdentifier,
    ) -> ContentRepositoryResult<()> {
        if !self
            .content_graph
            .find_node_aggregates_by_identifier(content_stream_identifier, node_aggregate_identifier)
            .is_empty()
        {
            return Err(ContentRepositoryError::NodeAggregateCurrentlyExists {
                content_stream_identifier: content_stream_identifier.clone(),
                node_aggregate_identifier: node_aggregate_identifier.clone(),
            });
        }
        Ok(())
    }

    pub(super) fn require_dimension_space_point_to_exist(
        &self,
        dimension_space_point: &DimensionSpacePoint,
    ) -> ContentRepositoryResult<()> {
        if !self
            .dimension_space
            .allowed_dimension_subspace()
            .contains(dimension_space_point)
        {
            return Err(ContentRepositoryError::DimensionSpacePointNotFound(
                dimension_space_point.clone(),
            ));
        }
        Ok(())
    }

    pub(super) fn require_node_aggregate_to_cover_dimension_space_point(
        &self,
        node_aggregate: &NodeAggregate,
        dimension_space_point: &DimensionSpacePoint,
    ) -> ContentRepositoryResult<()> {
        if !node_aggregate.covers_dimension_space_point(dimension_space_point) {
            return Err(
                ContentRepositoryError::NodeAggregateDoesCurrentlyNotCoverDimensionSpacePoint {
                    node_aggregate_identifier: node_aggregate.identifier().clone(),
                    dimension_space_point: dimension_space_point.clone(),
                },
            );
        }
        Ok(())
    }

    pub(super) fn require_node_aggregate_to_occupy_dimension_space_point(
        &self,
        node_aggregate: &NodeAggregate,
        origin: &OriginDimensionSpacePoint,
    ) -> ContentRepositoryResult<()> {
        if !node_aggregate.occupies_dimension_space_point(origin) {
            return Err(
                ContentRepositoryError::NodeAggregateDoesCurrentlyNotOccupyDimensionSpacePoint {
                    node_aggregate_identifier: node_aggregate.identifier().clone(),
                    dimension_space_point: origin.to_dimension_space_point(),
                },
            );
        }
        Ok(())
    }

    pub(super) fn require_node_aggregate_not_to_be_tethered(
        &self,
        node_aggregate: &NodeAggregate,
    ) -> ContentRepositoryResult<()> {
        if node_aggregate.is_tethered() {
            return Err(ContentRepositoryError::TetheredNodeAggregateCannotBeRemoved(
                node_aggregate.identifier().clone(),
            ));
        }
        Ok(())
    }

    pub(super) fn require_node_type(
        &self,
        node_type_name: &NodeTypeName,
    ) -> ContentRepositoryResult<NodeType> {
        self.node_type_manager
            .get_node_type(node_type_name)
            .ok_or_else(|| ContentRepositoryError::NodeTypeNotFound(node_type_name.clone()))
    }

    pub(super) fn require_node_type_to_not_be_abstract(
        &self,
        node_type: &NodeType,
    ) -> ContentRepositoryResult<()> {
        if node_type.is_abstract {
            return Err(ContentRepositoryError::NodeTypeIsAbstract(
                node_type.name.clone(),
            ));
        }
        Ok(())
    }

    pub(super) fn require_node_type_to_be_of_type_root(
        &self,
        node_type: &NodeType,
    ) -> ContentRepositoryResult<()> {
        if !node_type.is_root {
            return Err(ContentRepositoryError::NodeTypeIsNotOfTypeRoot(
                node_type.name.clone(),
            ));
        }
        Ok(())
    }

    pub(super) fn require_node_type_to_not_be_of_type_root(
        &self,
        node_type: &NodeType,
    ) -> ContentRepositoryResult<()> {
        if node_type.is_root {
            return Err(ContentRepositoryError::NodeTypeIsOfTypeRoot(
                node_type.name.clone(),
            ));
        }
        Ok(())
    }
}
