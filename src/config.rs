//! Content repository configuration
//!
//! Loaded from JSON. Dimension values are declared as trees where each value
//! lists its specializations; node types declare their tethered children.

use crate::dimension::{ContentDimension, InterDimensionalVariationGraph};
use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use crate::handlers::InMemoryNodeTypeManager;
use crate::queries::DEFAULT_TOP_LEVEL_CONTAINER_NODE_TYPE;
use crate::value_objects::{NodeName, NodeType, NodeTypeName};
use indexmap::IndexMap;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration of a content repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRepositoryConfig {
    /// Dimensions in declaration order
    #[serde(default)]
    pub content_dimensions: IndexMap<String, ContentDimensionConfig>,
    #[serde(default)]
    pub node_types: IndexMap<String, NodeTypeConfig>,
    /// Traversal stops below nodes of this type
    #[serde(default = "default_top_level_container_node_type")]
    pub top_level_container_node_type: String,
}

/// One dimension axis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDimensionConfig {
    #[serde(default)]
    pub values: IndexMap<String, DimensionValueConfig>,
}

/// A dimension value and the values specializing it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionValueConfig {
    #[serde(default)]
    pub specializations: IndexMap<String, DimensionValueConfig>,
}

/// Schema of one node type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeConfig {
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub root: bool,
    /// Tethered child name to node type name
    #[serde(default)]
    pub child_nodes: IndexMap<String, String>,
}

fn default_top_level_container_node_type() -> String {
    DEFAULT_TOP_LEVEL_CONTAINER_NODE_TYPE.to_string()
}

impl Default for ContentRepositoryConfig {
    fn default() -> Self {
        Self {
            content_dimensions: IndexMap::new(),
            node_types: IndexMap::new(),
            top_level_container_node_type: default_top_level_container_node_type(),
        }
    }
}

impl ContentRepositoryConfig {
    pub fn from_json(json: &str) -> ContentRepositoryResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ContentRepositoryError::InvalidConfiguration(e.to_string()))
    }

    /// Dimensions with each value mapped to its direct generalization
    pub fn content_dimensions(&self) -> ContentRepositoryResult<Vec<ContentDimension>> {
        self.content_dimensions
            .iter()
            .map(|(identifier, dimension)| {
                let mut generalizations = IndexMap::new();
                flatten_values(identifier, &dimension.values, None, &mut generalizations)?;
                ContentDimension::new(identifier.clone(), generalizations)
            })
            .collect()
    }

    pub fn variation_graph(&self) -> ContentRepositoryResult<InterDimensionalVariationGraph> {
        Ok(InterDimensionalVariationGraph::from_dimensions(
            &self.content_dimensions()?,
        ))
    }

    /// Node type registry; tethered children must name known types without cycles
    pub fn node_type_manager(&self) -> ContentRepositoryResult<InMemoryNodeTypeManager> {
        let node_types = self
            .node_types
            .iter()
            .map(|(name, config)| -> ContentRepositoryResult<NodeType> {
                let mut node_type = NodeType::new(NodeTypeName::new(name.as_str()))
                    .with_abstract(config.is_abstract);
                node_type.is_root = config.root;
                for (child_name, child_type) in &config.child_nodes {
                    node_type = node_type.with_tethered_child(
                        NodeName::from_string(child_name)?,
                        NodeTypeName::new(child_type.as_str()),
                    );
                }
                Ok(node_type)
            })
            .collect::<ContentRepositoryResult<Vec<_>>>()?;

        require_known_acyclic_tethering(&node_types)?;

        Ok(InMemoryNodeTypeManager::new(node_types))
    }

    pub fn top_level_container_node_type(&self) -> NodeTypeName {
        NodeTypeName::new(self.top_level_container_node_type.as_str())
    }
}

/// Every tethered child names a registered type and no type tethers itself transitively
fn require_known_acyclic_tethering(node_types: &[NodeType]) -> ContentRepositoryResult<()> {
    let mut schema = DiGraph::<&NodeTypeName, ()>::new();
    let indices: HashMap<&NodeTypeName, NodeIndex> = node_types
        .iter()
        .map(|node_type| (&node_type.name, schema.add_node(&node_type.name)))
        .collect();
    for (node_type, parent) in node_types.iter().zip(schema.node_indices().collect::<Vec<_>>()) {
        for (child_name, child_type) in &node_type.tethered_child_nodes {
            let Some(&child) = indices.get(child_type) else {
                return Err(ContentRepositoryError::InvalidConfiguration(format!(
                    "tethered child \"{child_name}\" of \"{}\" has unknown node type \"{child_type}\"",
                    node_type.name
                )));
            };
            schema.add_edge(parent, child, ());
        }
    }
    if is_cyclic_directed(&schema) {
        return Err(ContentRepositoryError::InvalidConfiguration(
            "tethered child nodes form a cycle".to_string(),
        ));
    }
    Ok(())
}

fn flatten_values(
    dimension: &str,
    values: &IndexMap<String, DimensionValueConfig>,
    generalization: Option<&str>,
    generalizations: &mut IndexMap<String, Option<String>>,
) -> ContentRepositoryResult<()> {
    for (value, config) in values {
        if generalizations
            .insert(value.clone(), generalization.map(str::to_string))
            .is_some()
        {
            return Err(ContentRepositoryError::InvalidConfiguration(format!(
                "value \"{value}\" is declared twice in dimension \"{dimension}\""
            )));
        }
        flatten_values(dimension, &config.specializations, Some(value), generalizations)?;
    }
    Ok(())
}
