//! Property values carried by nodes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single property value.
///
/// Every value the ingestion feeds produce is a string; integers exist for
/// callers that build graphs by hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
}

impl PropertyValue {
    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get integer value if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
        }
    }
}

/// Renders the raw value, without quoting, as it appears in result rows
impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

/// Node properties, kept in insertion order
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// Build a [`PropertyMap`] from `(key, value)` pairs.
///
/// ```
/// use papergraph::graph::property::props;
///
/// let p = props([("name", "SRDS"), ("year", "2014")]);
/// assert_eq!(p.len(), 2);
/// ```
pub fn props<K, V, I>(pairs: I) -> PropertyMap
where
    K: Into<String>,
    V: Into<PropertyValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// True when every entry of `pattern` is present in `properties` with an
/// equal value. An empty pattern matches everything.
pub fn matches_all(properties: &PropertyMap, pattern: &PropertyMap) -> bool {
    pattern
        .iter()
        .all(|(key, expected)| properties.get(key) == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_value_conversions() {
        let s: PropertyValue = "hello".into();
        assert_eq!(s.as_string(), Some("hello"));
        assert_eq!(s.as_integer(), None);
        assert_eq!(s.type_name(), "String");

        let i: PropertyValue = 27i64.into();
        assert_eq!(i.as_integer(), Some(27));
        assert_eq!(i.type_name(), "Integer");
    }

    #[test]
    fn test_display_is_unquoted() {
        assert_eq!(PropertyValue::from("IEEE Network").to_string(), "IEEE Network");
        assert_eq!(PropertyValue::from(8).to_string(), "8");
    }

    #[test]
    fn test_props_keeps_insertion_order() {
        let p = props([("name", "SRDS"), ("year", "2014"), ("city", "Nara")]);
        let keys: Vec<&str> = p.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "year", "city"]);
    }

    #[test]
    fn test_matches_all_is_superset_match() {
        let node = props([("name", "SRDS"), ("year", "2014"), ("city", "Nara")]);

        assert!(matches_all(&node, &props([("name", "SRDS")])));
        assert!(matches_all(&node, &props([("city", "Nara"), ("name", "SRDS")])));
        assert!(matches_all(&node, &PropertyMap::new()));
        assert!(!matches_all(&node, &props([("name", "SRDS"), ("year", "2015")])));
        assert!(!matches_all(&node, &props([("volume", "8")])));
    }

    #[test]
    fn test_string_and_integer_do_not_match() {
        let node = props([("volume", "8")]);
        assert!(!matches_all(&node, &props([("volume", 8i64)])));
    }
}
