//! Dimension space model
//!
//! Content varies along independent axes (language, market, ...). A point in
//! that space addresses one variant; the variation graph relates points by
//! specialization so that content authored at a general point is visible at
//! its specializations until they are authored themselves.

mod point;
mod selection_strategy;
mod variation_graph;

pub use point::{
    DimensionSpacePoint, DimensionSpacePointSet, OriginDimensionSpacePoint,
    OriginDimensionSpacePointSet,
};
pub use selection_strategy::NodeVariantSelectionStrategy;
pub use variation_graph::{ContentDimension, InterDimensionalVariationGraph};

/// Provides the allowed subspace and the variation graph to command handlers
pub trait DimensionSpaceProvider: Send + Sync {
    /// Every point content may be authored at or covered by
    fn allowed_dimension_subspace(&self) -> &DimensionSpacePointSet;

    /// Specialization relations between points of the allowed subspace
    fn variation_graph(&self) -> &InterDimensionalVariationGraph;
}

impl DimensionSpaceProvider for InterDimensionalVariationGraph {
    fn allowed_dimension_subspace(&self) -> &DimensionSpacePointSet {
        self.allowed_subspace()
    }

    fn variation_graph(&self) -> &InterDimensionalVariationGraph {
        self
    }
}
