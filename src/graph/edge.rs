//! Directed, typed edges
//!
//! Edges carry no property payload. Creating the same
//! (source, type, target) triple twice yields two distinct edges.

use super::types::{Direction, EdgeId, EdgeType, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    /// Relationship type (HAS, WROTE, ...)
    pub edge_type: EdgeType,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, edge_type: impl Into<EdgeType>) -> Self {
        Edge {
            id,
            source,
            target,
            edge_type: edge_type.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// The endpoint reached when leaving `from` in `direction`.
    ///
    /// Returns `None` if `from` is not the corresponding endpoint.
    pub fn neighbor(&self, from: NodeId, direction: Direction) -> Option<NodeId> {
        match direction {
            Direction::Outgoing if self.source == from => Some(self.target),
            Direction::Incoming if self.target == from => Some(self.source),
            _ => None,
        }
    }

    pub fn starts_from(&self, node: NodeId) -> bool {
        self.source == node
    }

    pub fn ends_at(&self, node: NodeId) -> bool {
        self.target == node
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
