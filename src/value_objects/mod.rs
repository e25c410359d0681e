//! Content value objects
//!
//! Value objects are immutable types that represent concepts in the content domain.
//! They are compared by value rather than identity and encapsulate domain validation.

use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Longest identifier accepted for a node aggregate
const MAX_NODE_AGGREGATE_IDENTIFIER_LENGTH: usize = 64;

fn invalid(value: &str, reason: &str) -> ContentRepositoryError {
    ContentRepositoryError::InvalidIdentifier {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Identifies one branch of the event history
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentStreamIdentifier(String);

impl ContentStreamIdentifier {
    /// Generate a fresh identifier
    pub fn create() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse an identifier from its string form
    pub fn from_string(value: &str) -> ContentRepositoryResult<Self> {
        if value.trim().is_empty() {
            return Err(invalid(value, "content stream identifier must not be empty"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentStreamIdentifier {
    type Error = ContentRepositoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<ContentStreamIdentifier> for String {
    fn from(value: ContentStreamIdentifier) -> Self {
        value.0
    }
}

impl fmt::Display for ContentStreamIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a node aggregate, stable across all variants and time
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeAggregateIdentifier(String);

impl NodeAggregateIdentifier {
    /// Generate a fresh identifier
    pub fn create() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse an identifier; 1 to 64 characters out of `[a-z0-9-]`
    pub fn from_string(value: &str) -> ContentRepositoryResult<Self> {
        if value.is_empty() || value.len() > MAX_NODE_AGGREGATE_IDENTIFIER_LENGTH {
            return Err(invalid(value, "must be between 1 and 64 characters long"));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(invalid(
                value,
                "only lowercase ascii letters, digits and dashes are allowed",
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeAggregateIdentifier {
    type Error = ContentRepositoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<NodeAggregateIdentifier> for String {
    fn from(value: NodeAggregateIdentifier) -> Self {
        value.0
    }
}

impl fmt::Display for NodeAggregateIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of node aggregate identifiers
///
/// Used for references, where order is significant and duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAggregateIdentifiers(Vec<NodeAggregateIdentifier>);

impl NodeAggregateIdentifiers {
    pub fn new(identifiers: Vec<NodeAggregateIdentifier>) -> Self {
        Self(identifiers)
    }

    /// Parse every entry, failing on the first malformed one
    pub fn from_strings<S: AsRef<str>>(values: &[S]) -> ContentRepositoryResult<Self> {
        values
            .iter()
            .map(|value| NodeAggregateIdentifier::from_string(value.as_ref()))
            .collect::<ContentRepositoryResult<Vec<_>>>()
            .map(Self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeAggregateIdentifier> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a NodeAggregateIdentifiers {
    type Item = &'a NodeAggregateIdentifier;
    type IntoIter = std::slice::Iter<'a, NodeAggregateIdentifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Actor identity carried into every event for audit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserIdentifier(String);

impl UserIdentifier {
    /// The identity used for changes made by the system itself
    pub fn system_user() -> Self {
        Self(Uuid::nil().to_string())
    }

    pub fn from_string(value: &str) -> ContentRepositoryResult<Self> {
        if value.trim().is_empty() {
            return Err(invalid(value, "user identifier must not be empty"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserIdentifier {
    type Error = ContentRepositoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<UserIdentifier> for String {
    fn from(value: UserIdentifier) -> Self {
        value.0
    }
}

impl fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified node type name, e.g. `Acme.Site:Page`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeTypeName(String);

impl NodeTypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a node below its parent, used to address tethered children
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeName(String);

impl NodeName {
    pub fn from_string(value: &str) -> ContentRepositoryResult<Self> {
        if value.trim().is_empty() {
            return Err(invalid(value, "node name must not be empty"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeName {
    type Error = ContentRepositoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<NodeName> for String {
    fn from(value: NodeName) -> Self {
        value.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a property or reference slot on a node type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyName(String);

impl PropertyName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// References share the property namespace
pub type ReferenceName = PropertyName;

/// Classification of a node aggregate, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeAggregateClassification {
    /// Top of a content stream's hierarchy
    Root,
    /// Ordinary content
    Regular,
    /// Bound to its parent; removed only together with it
    Tethered,
}

impl NodeAggregateClassification {
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    pub fn is_tethered(&self) -> bool {
        matches!(self, Self::Tethered)
    }
}

impl fmt::Display for NodeAggregateClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::Regular => "regular",
            Self::Tethered => "tethered",
        };
        f.write_str(name)
    }
}

/// The slice of a node type schema the command handlers care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeType {
    pub name: NodeTypeName,
    pub is_abstract: bool,
    pub is_root: bool,
    /// Tethered children in declaration order
    pub tethered_child_nodes: IndexMap<NodeName, NodeTypeName>,
}

impl NodeType {
    /// A concrete, non-root node type without tethered children
    pub fn new(name: NodeTypeName) -> Self {
        Self {
            name,
            is_abstract: false,
            is_root: false,
            tethered_child_nodes: IndexMap::new(),
        }
    }

    pub fn root(name: NodeTypeName) -> Self {
        Self {
            is_root: true,
            ..Self::new(name)
        }
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_tethered_child(mut self, name: NodeName, node_type_name: NodeTypeName) -> Self {
        self.tethered_child_nodes.insert(name, node_type_name);
        self
    }
}
