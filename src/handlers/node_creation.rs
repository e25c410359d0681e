//! Regular node aggregate creation, including tethered descendants

use super::{EventsToPublish, NodeAggregateCommandHandler};
use crate::commands::CreateNodeAggregateWithNode;
use crate::dimension::DimensionSpacePointSet;
use crate::domain_events::ContentRepositoryEvent;
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use crate::event_store::ExpectedVersion;
use crate::events::NodeAggregateWithNodeWasCreated;
use crate::value_objects::{
    NodeAggregateClassification, NodeAggregateIdentifier, NodeType, NodeTypeName,
};
use std::collections::{BTreeSet, HashSet};
use tracing::trace;

/// Events of one creation command while its tethered descendants are derived
struct CreationBatch<'a> {
    command: &'a CreateNodeAggregateWithNode,
    covered_dimension_space_points: DimensionSpacePointSet,
    /// Node types from the created aggregate down to the current parent
    type_chain: Vec<NodeTypeName>,
    /// Every identifier the batch creates, the new aggregate included
    identifiers: HashSet<NodeAggregateIdentifier>,
    /// Tethered paths declared by the node type schema
    declared_paths: BTreeSet<String>,
    events: Vec<ContentRepositoryEvent>,
}

impl NodeAggregateCommandHandler {
    pub(super) fn handle_create_node_aggregate_with_node(
        &self,
        command: &CreateNodeAggregateWithNode,
    ) -> ContentRepositoryResult<EventsToPublish> {
        self.cache_manager.disable_cache();

        let stream = &command.content_stream_identifier;
        self.require_content_stream_to_exist(stream)?;
        let node_type = self.require_node_type(&command.node_type_name)?;
        self.require_node_type_to_not_be_abstract(&node_type)?;
        self.require_node_type_to_not_be_of_type_root(&node_type)?;
        self.require_projected_node_aggregate_to_not_exist(
            stream,
            &command.node_aggregate_identifier,
        )?;
        let origin = &command.origin_dimension_space_point;
        self.require_dimension_space_point_to_exist(origin.as_dimension_space_point())?;
        let parent = self.require_projected_node_aggregate(
            stream,
            &command.parent_node_aggregate_identifier,
        )?;
        self.require_node_aggregate_to_cover_dimension_space_point(
            &parent,
            origin.as_dimension_space_point(),
        )?;

        let covered_dimension_space_points = self
            .dimension_space
            .variation_graph()
            .specialization_set(origin.as_dimension_space_point())
            .intersect(parent.covered_dimension_space_points());

        let mut batch = CreationBatch {
            command,
            covered_dimension_space_points,
            type_chain: vec![node_type.name.clone()],
            identifiers: HashSet::from([command.node_aggregate_identifier.clone()]),
            declared_paths: BTreeSet::new(),
            events: Vec::new(),
        };
        batch.events.push(ContentRepositoryEvent::NodeAggregateWithNodeWasCreated(
            NodeAggregateWithNodeWasCreated {
                content_stream_identifier: stream.clone(),
                node_aggregate_identifier: command.node_aggregate_identifier.clone(),
                node_type_name: command.node_type_name.clone(),
                origin_dimension_space_point: origin.clone(),
                covered_dimension_space_points: batch.covered_dimension_space_points.clone(),
                parent_node_aggregate_identifier: command.parent_node_aggregate_identifier.clone(),
                node_name: command.node_name.clone(),
                node_aggregate_classification: NodeAggregateClassification::Regular,
                initiating_user_identifier: command.initiating_user_identifier.clone(),
            },
        ));

        self.create_tethered_descendants(
            &mut batch,
            &node_type,
            &command.node_aggregate_identifier,
            "",
        )?;

        if let Some(path) = command
            .tethered_descendant_node_aggregate_identifiers
            .keys()
            .find(|path| !batch.declared_paths.contains(*path))
        {
            return Err(ContentRepositoryError::TetheredNodePathNotDeclared {
                node_type_name: node_type.name.clone(),
                path: path.clone(),
            });
        }

        Ok(EventsToPublish::new(stream, batch.events, ExpectedVersion::Any))
    }

    /// Depth-first over the tethered children declared by `node_type`
    ///
    /// Meeting a node type of the batch's type chain again means the schema
    /// is cyclic.
    fn create_tethered_descendants(
        &self,
        batch: &mut CreationBatch<'_>,
        node_type: &NodeType,
        parent_identifier: &NodeAggregateIdentifier,
        parent_path: &str,
    ) -> ContentRepositoryResult<()> {
        let command = batch.command;
        for (child_name, child_type_name) in &node_type.tethered_child_nodes {
            if batch.type_chain.contains(child_type_name) {
                return Err(ContentRepositoryError::InvalidConfiguration(format!(
                    "tethered child \"{child_name}\" of \"{}\" nests node type \"{child_type_name}\" inside itself",
                    node_type.name
                )));
            }
            let child_type = self.require_node_type(child_type_name)?;

            let path = if parent_path.is_empty() {
                child_name.to_string()
            } else {
                format!("{parent_path}/{child_name}")
            };
            let identifier = command
                .tethered_descendant_node_aggregate_identifiers
                .get(&path)
                .cloned()
                .unwrap_or_else(NodeAggregateIdentifier::create);
            self.require_projected_node_aggregate_to_not_exist(
                &command.content_stream_identifier,
                &identifier,
            )?;
            if !batch.identifiers.insert(identifier.clone()) {
                return Err(ContentRepositoryError::NodeAggregateCurrentlyExists {
                    content_stream_identifier: command.content_stream_identifier.clone(),
                    node_aggregate_identifier: identifier,
                });
            }
            trace!(path = %path, node_aggregate = %identifier, "Creating tethered node aggregate");

            batch.events.push(ContentRepositoryEvent::NodeAggregateWithNodeWasCreated(
                NodeAggregateWithNodeWasCreated {
                    content_stream_identifier: command.content_stream_identifier.clone(),
                    node_aggregate_identifier: identifier.clone(),
                    node_type_name: child_type_name.clone(),
                    origin_dimension_space_point: command.origin_dimension_space_point.clone(),
                    covered_dimension_space_points: batch.covered_dimension_space_points.clone(),
                    parent_node_aggregate_identifier: parent_identifier.clone(),
                    node_name: Some(child_name.clone()),
                    node_aggregate_classification: NodeAggregateClassification::Tethered,
                    initiating_user_identifier: command.initiating_user_identifier.clone(),
                },
            ));

            batch.declared_paths.insert(path.clone());
            batch.type_chain.push(child_type_name.clone());
            self.create_tethered_descendants(batch, &child_type, &identifier, &path)?;
            batch.type_chain.pop();
        }
        Ok(())
    }
}
