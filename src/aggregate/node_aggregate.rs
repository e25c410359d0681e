//! Projected view of one node aggregate

use crate::dimension::{
    DimensionSpacePoint, DimensionSpacePointSet, OriginDimensionSpacePoint,
    OriginDimensionSpacePointSet,
};
use crate::value_objects::{
    NodeAggregateClassification, NodeAggregateIdentifier, NodeName, NodeTypeName,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node aggregate as seen by the read side
///
/// Handlers only ever read this; it is rebuilt from events by the projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAggregate {
    identifier: NodeAggregateIdentifier,
    node_type_name: NodeTypeName,
    classification: NodeAggregateClassification,
    node_name: Option<NodeName>,
    occupied_dimension_space_points: OriginDimensionSpacePointSet,
    covered_dimension_space_points: DimensionSpacePointSet,
    occupation_by_covered: BTreeMap<DimensionSpacePoint, OriginDimensionSpacePoint>,
}

impl NodeAggregate {
    /// An aggregate with no variants yet
    pub fn new(
        identifier: NodeAggregateIdentifier,
        node_type_name: NodeTypeName,
        classification: NodeAggregateClassification,
    ) -> Self {
        Self {
            identifier,
            node_type_name,
            classification,
            node_name: None,
            occupied_dimension_space_points: OriginDimensionSpacePointSet::default(),
            covered_dimension_space_points: DimensionSpacePointSet::default(),
            occupation_by_covered: BTreeMap::new(),
        }
    }

    pub fn with_node_name(mut self, node_name: Option<NodeName>) -> Self {
        self.node_name = node_name;
        self
    }

    /// Add a variant authored at `origin`, visible at `covered`
    pub fn with_variant(
        mut self,
        origin: OriginDimensionSpacePoint,
        covered: impl IntoIterator<Item = DimensionSpacePoint>,
    ) -> Self {
        self.add_variant(origin, covered);
        self
    }

    pub(crate) fn add_variant(
        &mut self,
        origin: OriginDimensionSpacePoint,
        covered: impl IntoIterator<Item = DimensionSpacePoint>,
    ) {
        for point in covered {
            self.occupation_by_covered.insert(point, origin.clone());
        }
        self.occupied_dimension_space_points = self
            .occupied_dimension_space_points
            .iter()
            .cloned()
            .chain(std::iter::once(origin))
            .collect();
        self.refresh_coverage();
    }

    /// Drop the given coverage; an origin stays occupied while it covers anything
    ///
    /// Returns whether anything is left.
    pub(crate) fn remove_coverage(&mut self, affected_covered: &DimensionSpacePointSet) -> bool {
        self.occupation_by_covered
            .retain(|covered, _| !affected_covered.contains(covered));
        self.occupied_dimension_space_points = self
            .occupied_dimension_space_points
            .iter()
            .filter(|origin| self.occupation_by_covered.values().any(|o| o == *origin))
            .cloned()
            .collect();
        self.refresh_coverage();
        !self.covered_dimension_space_points.is_empty()
    }

    fn refresh_coverage(&mut self) {
        self.covered_dimension_space_points =
            self.occupation_by_covered.keys().cloned().collect();
    }

    pub fn identifier(&self) -> &NodeAggregateIdentifier {
        &self.identifier
    }

    pub fn node_type_name(&self) -> &NodeTypeName {
        &self.node_type_name
    }

    pub fn classification(&self) -> NodeAggregateClassification {
        self.classification
    }

    pub fn node_name(&self) -> Option<&NodeName> {
        self.node_name.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.classification.is_root()
    }

    pub fn is_tethered(&self) -> bool {
        self.classification.is_tethered()
    }

    pub fn occupied_dimension_space_points(&self) -> &OriginDimensionSpacePointSet {
        &self.occupied_dimension_space_points
    }

    pub fn covered_dimension_space_points(&self) -> &DimensionSpacePointSet {
        &self.covered_dimension_space_points
    }

    pub fn occupies_dimension_space_point(&self, origin: &OriginDimensionSpacePoint) -> bool {
        self.occupied_dimension_space_points.contains(origin)
    }

    pub fn covers_dimension_space_point(&self, point: &DimensionSpacePoint) -> bool {
        self.covered_dimension_space_points.contains(point)
    }

    /// The origin whose variant is visible at `covered`
    pub fn occupation_by_covered(
        &self,
        covered: &DimensionSpacePoint,
    ) -> Option<&OriginDimensionSpacePoint> {
        self.occupation_by_covered.get(covered)
    }

    /// Every point at which the variant authored at `origin` is visible
    pub fn coverage_by_occupant(&self, origin: &OriginDimensionSpacePoint) -> DimensionSpacePointSet {
        self.occupation_by_covered
            .iter()
            .filter(|(_, occupant)| *occupant == origin)
            .map(|(covered, _)| covered.clone())
            .collect()
    }
}
