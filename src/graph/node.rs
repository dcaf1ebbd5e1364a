//! Node record of the paper graph

use super::property::{matches_all, PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use serde::{Deserialize, Serialize};

/// A labeled node.
///
/// Nodes carry exactly one label and are never mutated once the store
/// has accepted them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Type tag (Paper, Author, ...)
    pub label: Label,

    /// Properties in the order they were supplied at creation
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Node {
    pub fn new(id: NodeId, label: impl Into<Label>, properties: PropertyMap) -> Self {
        Node {
            id,
            label: label.into(),
            properties,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn has_label(&self, label: &Label) -> bool {
        &self.label == label
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// String value of a property, if present and a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_property(key).and_then(PropertyValue::as_string)
    }

    /// Label equality plus superset match on `pattern`
    pub fn matches(&self, label: &Label, pattern: &PropertyMap) -> bool {
        self.has_label(label) && matches_all(&self.properties, pattern)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::props;

    #[test]
    fn test_create_node() {
        let node = Node::new(NodeId::new(1), "Paper", props([("title", "T1")]));
        assert_eq!(node.id, NodeId::new(1));
        assert!(node.has_label(&Label::new("Paper")));
        assert!(!node.has_label(&Label::new("Author")));
        assert_eq!(node.get_str("title"), Some("T1"));
        assert!(node.created_at > 0);
    }

    #[test]
    fn test_matches_requires_label() {
        let node = Node::new(NodeId::new(2), "Author", props([("surname", "Feng")]));
        let pattern = props([("surname", "Feng")]);

        assert!(node.matches(&Label::new("Author"), &pattern));
        assert!(!node.matches(&Label::new("Reviewer"), &pattern));
    }

    #[test]
    fn test_node_equality_is_by_id() {
        let a = Node::new(NodeId::new(3), "Author", props([("surname", "A")]));
        let b = Node::new(NodeId::new(3), "Author", props([("surname", "B")]));
        let c = Node::new(NodeId::new(4), "Author", props([("surname", "A")]));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
