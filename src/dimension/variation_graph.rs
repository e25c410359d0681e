//! Inter-dimensional variation graph
//!
//! Points are connected by specialization edges. An edge runs from a point to
//! every point that differs on exactly one axis, where the target's value is a
//! direct specialization of the source's value. Reachability along these edges
//! is exactly the "generalizes" relation across all axes.

use super::point::{DimensionSpacePoint, DimensionSpacePointSet};
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use std::collections::HashMap;

/// One axis of the variation space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDimension {
    identifier: String,
    /// value -> its direct generalization, in declaration order
    generalizations: IndexMap<String, Option<String>>,
}

impl ContentDimension {
    pub fn new(
        identifier: impl Into<String>,
        generalizations: IndexMap<String, Option<String>>,
    ) -> ContentRepositoryResult<Self> {
        let identifier = identifier.into();
        if generalizations.is_empty() {
            return Err(ContentRepositoryError::InvalidConfiguration(format!(
                "content dimension \"{identifier}\" declares no values"
            )));
        }
        for (value, parent) in &generalizations {
            if let Some(parent) = parent {
                if !generalizations.contains_key(parent) {
                    return Err(ContentRepositoryError::InvalidConfiguration(format!(
                        "value \"{value}\" of content dimension \"{identifier}\" specializes unknown value \"{parent}\""
                    )));
                }
            }
        }
        Ok(Self {
            identifier,
            generalizations,
        })
    }

    /// A flat dimension whose values do not specialize each other
    pub fn flat<I, V>(identifier: impl Into<String>, values: I) -> ContentRepositoryResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::new(
            identifier,
            values.into_iter().map(|value| (value.into(), None)).collect(),
        )
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.generalizations.keys().map(String::as_str)
    }

    pub fn generalization_of(&self, value: &str) -> Option<&str> {
        self.generalizations.get(value).and_then(|p| p.as_deref())
    }
}

/// The allowed dimension subspace plus specialization relations between its points
#[derive(Debug, Clone)]
pub struct InterDimensionalVariationGraph {
    allowed_subspace: DimensionSpacePointSet,
    graph: DiGraph<DimensionSpacePoint, ()>,
    indices: HashMap<DimensionSpacePoint, NodeIndex>,
}

impl InterDimensionalVariationGraph {
    /// Build the graph over the cartesian product of all dimension values
    pub fn from_dimensions(dimensions: &[ContentDimension]) -> Self {
        let mut points = vec![DimensionSpacePoint::empty()];
        for dimension in dimensions {
            points = points
                .iter()
                .flat_map(|point| {
                    dimension
                        .values()
                        .map(move |value| point.vary(dimension.identifier(), value))
                })
                .collect();
        }

        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        for point in &points {
            indices.insert(point.clone(), graph.add_node(point.clone()));
        }

        for point in &points {
            for dimension in dimensions {
                let Some(value) = point.coordinate(dimension.identifier()) else {
                    continue;
                };
                if let Some(parent) = dimension.generalization_of(value) {
                    let generalization = point.vary(dimension.identifier(), parent);
                    if let (Some(&from), Some(&to)) =
                        (indices.get(&generalization), indices.get(point))
                    {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }

        Self {
            allowed_subspace: points.into_iter().collect(),
            graph,
            indices,
        }
    }

    pub fn allowed_subspace(&self) -> &DimensionSpacePointSet {
        &self.allowed_subspace
    }

    /// The point itself plus every point it generalizes
    pub fn specialization_set(&self, point: &DimensionSpacePoint) -> DimensionSpacePointSet {
        let Some(&start) = self.indices.get(point) else {
            return DimensionSpacePointSet::new([point.clone()]);
        };
        let mut reached = Vec::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(index) = dfs.next(&self.graph) {
            reached.push(self.graph[index].clone());
        }
        reached.into_iter().collect()
    }

    /// The point itself plus every point that generalizes it
    pub fn generalization_set(&self, point: &DimensionSpacePoint) -> DimensionSpacePointSet {
        let Some(&start) = self.indices.get(point) else {
            return DimensionSpacePointSet::new([point.clone()]);
        };
        let reversed = Reversed(&self.graph);
        let mut reached = Vec::new();
        let mut dfs = Dfs::new(reversed, start);
        while let Some(index) = dfs.next(reversed) {
            reached.push(self.graph[index].clone());
        }
        reached.into_iter().collect()
    }

    /// Whether `specialization` is strictly more specific than `generalization`
    pub fn is_specialization(
        &self,
        specialization: &DimensionSpacePoint,
        generalization: &DimensionSpacePoint,
    ) -> bool {
        specialization != generalization
            && self
                .specialization_set(generalization)
                .contains(specialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn language_dimension() -> ContentDimension {
        let mut generalizations = IndexMap::new();
        generalizations.insert("en".to_string(), None);
        generalizations.insert("de".to_string(), None);
        generalizations.insert("gsw".to_string(), Some("de".to_string()));
        ContentDimension::new("language", generalizations).unwrap()
    }

    fn point(pairs: &[(&str, &str)]) -> DimensionSpacePoint {
        DimensionSpacePoint::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_allowed_subspace_is_cartesian_product() {
        let market = ContentDimension::flat("market", ["ch", "eu"]).unwrap();
        let graph = InterDimensionalVariationGraph::from_dimensions(&[language_dimension(), market]);

        assert_eq!(graph.allowed_subspace().len(), 6);
        assert!(graph
            .allowed_subspace()
            .contains(&point(&[("language", "gsw"), ("market", "eu")])));
    }

    #[test]
    fn test_no_dimensions_yield_the_empty_point() {
        let graph = InterDimensionalVariationGraph::from_dimensions(&[]);
        assert_eq!(
            graph.allowed_subspace(),
            &DimensionSpacePointSet::new([DimensionSpacePoint::empty()])
        );
    }

    #[test]
    fn test_specialization_set() {
        let graph = InterDimensionalVariationGraph::from_dimensions(&[language_dimension()]);

        assert_eq!(
            graph.specialization_set(&point(&[("language", "de")])),
            DimensionSpacePointSet::new([point(&[("language", "de")]), point(&[("language", "gsw")])])
        );
        assert_eq!(
            graph.specialization_set(&point(&[("language", "en")])),
            DimensionSpacePointSet::new([point(&[("language", "en")])])
        );
        assert_eq!(
            graph.generalization_set(&point(&[("language", "gsw")])),
            DimensionSpacePointSet::new([point(&[("language", "de")]), point(&[("language", "gsw")])])
        );
    }

    #[test]
    fn test_specialization_across_axes() {
        let mut markets = IndexMap::new();
        markets.insert("eu".to_string(), None);
        markets.insert("ch".to_string(), Some("eu".to_string()));
        let market = ContentDimension::new("market", markets).unwrap();
        let graph = InterDimensionalVariationGraph::from_dimensions(&[language_dimension(), market]);

        let most_general = point(&[("language", "de"), ("market", "eu")]);
        let most_specific = point(&[("language", "gsw"), ("market", "ch")]);

        assert_eq!(graph.specialization_set(&most_general).len(), 4);
        assert!(graph.is_specialization(&most_specific, &most_general));
        assert!(!graph.is_specialization(&most_general, &most_specific));
        assert!(!graph.is_specialization(&most_general, &most_general));
    }

    #[test]
    fn test_unknown_generalization_is_rejected() {
        let mut generalizations = IndexMap::new();
        generalizations.insert("gsw".to_string(), Some("de".to_string()));
        assert!(ContentDimension::new("language", generalizations).is_err());
        assert!(ContentDimension::flat("language", Vec::<String>::new()).is_err());
    }
}
