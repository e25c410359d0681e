//! Node variant selection strategies
//!
//! Given one coordinate named in a command, a strategy decides which other
//! coordinates of the aggregate are affected as well.

use super::point::{
    DimensionSpacePoint, DimensionSpacePointSet, OriginDimensionSpacePoint,
    OriginDimensionSpacePointSet,
};
use super::variation_graph::InterDimensionalVariationGraph;
use crate::aggregate::NodeAggregate;
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of variant selection strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeVariantSelectionStrategy {
    /// Only the given coordinate
    OnlyGivenVariant,
    /// The given coordinate and everything it generalizes
    AllSpecializations,
    /// Every coordinate the aggregate occupies or covers
    AllVariants,
}

impl NodeVariantSelectionStrategy {
    /// Origin points affected when acting on the variant authored at `occupied_point`
    pub fn resolve_affected_origin_dimension_space_points(
        &self,
        occupied_point: &OriginDimensionSpacePoint,
        node_aggregate: &NodeAggregate,
        variation_graph: &InterDimensionalVariationGraph,
    ) -> OriginDimensionSpacePointSet {
        match self {
            Self::OnlyGivenVariant => OriginDimensionSpacePointSet::new([occupied_point.clone()]),
            Self::AllSpecializations => variation_graph
                .specialization_set(occupied_point.as_dimension_space_point())
                .iter()
                .map(|point| OriginDimensionSpacePoint::from(point.clone()))
                .filter(|origin| node_aggregate.occupies_dimension_space_point(origin))
                .collect(),
            Self::AllVariants => node_aggregate.occupied_dimension_space_points().clone(),
        }
    }

    /// Covered points affected when acting at `covered_point`
    pub fn resolve_affected_dimension_space_points(
        &self,
        covered_point: &DimensionSpacePoint,
        node_aggregate: &NodeAggregate,
        variation_graph: &InterDimensionalVariationGraph,
    ) -> DimensionSpacePointSet {
        match self {
            Self::OnlyGivenVariant => DimensionSpacePointSet::new([covered_point.clone()]),
            Self::AllSpecializations => variation_graph
                .specialization_set(covered_point)
                .intersect(node_aggregate.covered_dimension_space_points()),
            Self::AllVariants => node_aggregate.covered_dimension_space_points().clone(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnlyGivenVariant => "onlyGivenVariant",
            Self::AllSpecializations => "allSpecializations",
            Self::AllVariants => "allVariants",
        }
    }
}

impl FromStr for NodeVariantSelectionStrategy {
    type Err = ContentRepositoryError;

    fn from_str(s: &str) -> ContentRepositoryResult<Self> {
        match s {
            "onlyGivenVariant" => Ok(Self::OnlyGivenVariant),
            "allSpecializations" => Ok(Self::AllSpecializations),
            "allVariants" => Ok(Self::AllVariants),
            other => Err(ContentRepositoryError::InvalidIdentifier {
                value: other.to_string(),
                reason: "unknown node variant selection strategy".to_string(),
            }),
        }
    }
}

impl fmt::Display for NodeVariantSelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
