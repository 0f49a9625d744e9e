//! Vector data structures: features, attributes and collections

use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Numeric reading of the attribute.
    ///
    /// Integers and floats convert directly, strings are parsed after
    /// trimming. Booleans and nulls are not numbers. Non-finite results
    /// are rejected.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            AttributeValue::Int(i) => *i as f64,
            AttributeValue::Float(f) => *f,
            AttributeValue::String(s) => s.trim().parse::<f64>().ok()?,
            AttributeValue::Null | AttributeValue::Bool(_) => return None,
        };
        v.is_finite().then_some(v)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: Some(geometry.into()),
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Builder-style identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder-style attribute
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// Identifier used for matching: the explicit id, or the feature's
    /// position in its collection.
    pub fn resolved_id(&self, position: usize) -> String {
        self.id.clone().unwrap_or_else(|| position.to_string())
    }
}

/// Collection of features
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Features paired with their resolved identifiers, in input order.
    pub fn identified(&self) -> impl Iterator<Item = (String, &Feature)> {
        self.features
            .iter()
            .enumerate()
            .map(|(pos, f)| (f.resolved_id(pos), f))
    }

    /// Resolved identifiers of every feature, in input order.
    ///
    /// Explicit ids and positional fallbacks share one namespace, so a
    /// feature with id `"1"` collides with an unnamed feature at position 1.
    ///
    /// # Errors
    /// `DuplicateId` for the first identifier seen twice, whether or not
    /// the features involved have geometry.
    pub fn resolved_ids(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::with_capacity(self.features.len());
        self.identified()
            .map(|(id, _)| {
                if seen.insert(id.clone()) {
                    Ok(id)
                } else {
                    Err(Error::DuplicateId(id))
                }
            })
            .collect()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}
