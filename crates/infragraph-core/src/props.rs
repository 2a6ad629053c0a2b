//! Tagged property values and the additive-overwrite merge rule.
//!
//! Node and edge metadata is heterogeneous (strings, counts, flags, nested
//! resource maps), so properties are a tagged value type rather than an
//! untyped JSON blob. The merge rule is what lets several connectors each
//! contribute disjoint metadata to the same node.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single property value attached to a node or edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

/// Ordered property map. Iteration order is deterministic by key.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// Merge `incoming` into `stored`, key by key.
///
/// Every incoming key overwrites (or adds) its stored counterpart; keys
/// absent from `incoming` keep their stored value. Never a full replace.
pub fn merge_properties(stored: &mut PropertyMap, incoming: &PropertyMap) {
    for (key, value) in incoming {
        stored.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn merge_overwrites_overlapping_keys_only() {
        let mut stored = props(&[("a", 1i64.into()), ("b", 2i64.into())]);
        let incoming = props(&[("b", 3i64.into()), ("c", 4i64.into())]);

        merge_properties(&mut stored, &incoming);

        assert_eq!(stored.get("a").and_then(PropertyValue::as_i64), Some(1));
        assert_eq!(stored.get("b").and_then(PropertyValue::as_i64), Some(3));
        assert_eq!(stored.get("c").and_then(PropertyValue::as_i64), Some(4));
    }

    #[test]
    fn merge_with_identical_map_is_idempotent() {
        let mut stored = props(&[("team", "orders-team".into())]);
        let incoming = stored.clone();

        merge_properties(&mut stored, &incoming);
        assert_eq!(stored, incoming);
    }

    #[test]
    fn untagged_serialization_roundtrip() {
        let mut map = PropertyMap::new();
        map.insert("port".to_string(), 8080i64.into());
        map.insert("encrypted".to_string(), true.into());
        map.insert(
            "limits".to_string(),
            PropertyValue::Map(props(&[("cpu", "500m".into())])),
        );

        let json = serde_json::to_string(&map).unwrap();
        let back: PropertyMap = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }

    #[test]
    fn accessors() {
        assert_eq!(PropertyValue::from("x").as_str(), Some("x"));
        assert_eq!(PropertyValue::from(7i64).as_i64(), Some(7));
        assert_eq!(PropertyValue::from(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::from(7i64).as_str(), None);
    }
}
