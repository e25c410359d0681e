//! Coordinates in the dimension space and sets of them

use crate::error::{ContentRepositoryError, ContentRepositoryResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One coordinate in the variation space, e.g. `{language: en, market: ch}`
///
/// Axes are kept sorted so serialization and hashing are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionSpacePoint {
    coordinates: BTreeMap<String, String>,
}

impl DimensionSpacePoint {
    pub fn new(coordinates: BTreeMap<String, String>) -> Self {
        Self { coordinates }
    }

    /// Build a point from `(axis, value)` pairs
    pub fn from_pairs<I, A, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, V)>,
        A: Into<String>,
        V: Into<String>,
    {
        Self {
            coordinates: pairs
                .into_iter()
                .map(|(axis, value)| (axis.into(), value.into()))
                .collect(),
        }
    }

    /// Parse the JSON object form, e.g. `{"language":"en"}`
    pub fn from_json(json: &str) -> ContentRepositoryResult<Self> {
        serde_json::from_str(json).map_err(|e| ContentRepositoryError::InvalidIdentifier {
            value: json.to_string(),
            reason: format!("not a dimension space point: {e}"),
        })
    }

    /// The point of a repository without dimensions
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn coordinates(&self) -> &BTreeMap<String, String> {
        &self.coordinates
    }

    pub fn coordinate(&self, axis: &str) -> Option<&str> {
        self.coordinates.get(axis).map(String::as_str)
    }

    /// Copy of this point with one axis set to another value
    pub fn vary(&self, axis: &str, value: &str) -> Self {
        let mut coordinates = self.coordinates.clone();
        coordinates.insert(axis.to_string(), value.to_string());
        Self { coordinates }
    }

    /// Stable content hash of the coordinates
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (axis, value) in &self.coordinates {
            hasher.update(axis.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b";");
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl fmt::Display for DimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (axis, value)) in self.coordinates.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{axis}:{value}")?;
        }
        f.write_str("}")
    }
}

/// The coordinate at which a variant was authored
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginDimensionSpacePoint(DimensionSpacePoint);

impl OriginDimensionSpacePoint {
    pub fn from_dimension_space_point(point: DimensionSpacePoint) -> Self {
        Self(point)
    }

    pub fn from_pairs<I, A, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, V)>,
        A: Into<String>,
        V: Into<String>,
    {
        Self(DimensionSpacePoint::from_pairs(pairs))
    }

    pub fn as_dimension_space_point(&self) -> &DimensionSpacePoint {
        &self.0
    }

    pub fn to_dimension_space_point(&self) -> DimensionSpacePoint {
        self.0.clone()
    }
}

impl From<DimensionSpacePoint> for OriginDimensionSpacePoint {
    fn from(point: DimensionSpacePoint) -> Self {
        Self(point)
    }
}

impl fmt::Display for OriginDimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unordered, deduplicated set of dimension space points
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionSpacePointSet(BTreeSet<DimensionSpacePoint>);

impl DimensionSpacePointSet {
    pub fn new(points: impl IntoIterator<Item = DimensionSpacePoint>) -> Self {
        Self(points.into_iter().collect())
    }

    pub fn contains(&self, point: &DimensionSpacePoint) -> bool {
        self.0.contains(point)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionSpacePoint> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn intersect(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).cloned().collect())
    }
}

impl FromIterator<DimensionSpacePoint> for DimensionSpacePointSet {
    fn from_iter<T: IntoIterator<Item = DimensionSpacePoint>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DimensionSpacePointSet {
    type Item = &'a DimensionSpacePoint;
    type IntoIter = std::collections::btree_set::Iter<'a, DimensionSpacePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Unordered, deduplicated set of origin dimension space points
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginDimensionSpacePointSet(BTreeSet<OriginDimensionSpacePoint>);

impl OriginDimensionSpacePointSet {
    pub fn new(points: impl IntoIterator<Item = OriginDimensionSpacePoint>) -> Self {
        Self(points.into_iter().collect())
    }

    pub fn contains(&self, point: &OriginDimensionSpacePoint) -> bool {
        self.0.contains(point)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OriginDimensionSpacePoint> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_dimension_space_point_set(&self) -> DimensionSpacePointSet {
        self.0
            .iter()
            .map(OriginDimensionSpacePoint::to_dimension_space_point)
            .collect()
    }
}

impl FromIterator<OriginDimensionSpacePoint> for OriginDimensionSpacePointSet {
    fn from_iter<T: IntoIterator<Item = OriginDimensionSpacePoint>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a OriginDimensionSpacePointSet {
    type Item = &'a OriginDimensionSpacePoint;
    type IntoIter = std::collections::btree_set::Iter<'a, OriginDimensionSpacePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn language(value: &str) -> DimensionSpacePoint {
        DimensionSpacePoint::from_pairs([("language", value)])
    }

    #[test]
    fn test_point_equality_ignores_insertion_order() {
        let a = DimensionSpacePoint::from_pairs([("language", "en"), ("market", "ch")]);
        let b = DimensionSpacePoint::from_pairs([("market", "ch"), ("language", "en")]);
        assert_eq!(a, b);
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), a.vary("market", "de").content_hash());
    }

    #[test]
    fn test_point_json_form() {
        let point = DimensionSpacePoint::from_json(r#"{"market":"ch","language":"en"}"#).unwrap();
        assert_eq!(point.coordinate("market"), Some("ch"));
        assert_eq!(
            serde_json::to_string(&point).unwrap(),
            r#"{"language":"en","market":"ch"}"#
        );
        assert_eq!(point.to_string(), "{language:en,market:ch}");
        assert!(DimensionSpacePoint::from_json("[1,2]").is_err());
    }

    #[test]
    fn test_set_deduplicates() {
        let set = DimensionSpacePointSet::new([language("en"), language("de"), language("en")]);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set,
            DimensionSpacePointSet::new([language("de"), language("en")])
        );
    }

    #[test]
    fn test_set_operations() {
        let left = DimensionSpacePointSet::new([language("en"), language("de")]);
        let right = DimensionSpacePointSet::new([language("de"), language("fr")]);

        assert_eq!(left.intersect(&right), DimensionSpacePointSet::new([language("de")]));
        assert_eq!(left.union(&right).len(), 3);
        assert_eq!(left.difference(&right), DimensionSpacePointSet::new([language("en")]));
    }

    #[test]
    fn test_origin_set_conversion() {
        let origins = OriginDimensionSpacePointSet::new([
            OriginDimensionSpacePoint::from(language("en")),
            OriginDimensionSpacePoint::from(language("de")),
        ]);
        assert_eq!(
            origins.to_dimension_space_point_set(),
            DimensionSpacePointSet::new([language("en"), language("de")])
        );
    }
}
