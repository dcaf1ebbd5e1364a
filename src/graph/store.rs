//! In-memory graph storage
//!
//! Append-only: nodes and edges are created, never updated or deleted.
//! Ids are dense and handed out in creation order, which gives every
//! lookup a deterministic "earliest created wins" tie-break.

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyMap;
use super::types::{Direction, EdgeId, EdgeType, Label, NodeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Which endpoint of an edge a bad reference was supplied for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Source,
    Target,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointRole::Source => f.write_str("source"),
            EndpointRole::Target => f.write_str("target"),
        }
    }
}

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Invalid reference: {role} node {id} does not exist")]
    InvalidReference { id: NodeId, role: EndpointRole },

    #[error("Recovered {kind} id {found} out of sequence, expected {expected}")]
    OutOfSequence {
        kind: &'static str,
        expected: u64,
        found: u64,
    },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Node and edge counts, grouped by label and relationship type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_per_label: BTreeMap<String, usize>,
    pub edges_per_type: BTreeMap<String, usize>,
}

/// In-memory graph storage
///
/// - nodes / edges: arenas indexed by `id - 1`
/// - outgoing / incoming: per-node adjacency lists in edge creation order
/// - label_index: Label -> NodeIds in creation order
/// - edge_type_index: EdgeType -> EdgeIds in creation order
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    label_index: HashMap<Label, Vec<NodeId>>,
    edge_type_index: HashMap<EdgeType, Vec<EdgeId>>,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        GraphStore {
            nodes: Vec::with_capacity(1024),
            edges: Vec::with_capacity(4096),
            outgoing: Vec::with_capacity(1024),
            incoming: Vec::with_capacity(1024),
            label_index: HashMap::new(),
            edge_type_index: HashMap::new(),
        }
    }

    fn node_slot(id: NodeId) -> Option<usize> {
        (id.as_u64() as usize).checked_sub(1)
    }

    fn edge_slot(id: EdgeId) -> Option<usize> {
        (id.as_u64() as usize).checked_sub(1)
    }

    fn next_node_id(&self) -> NodeId {
        NodeId::new(self.nodes.len() as u64 + 1)
    }

    fn next_edge_id(&self) -> EdgeId {
        EdgeId::new(self.edges.len() as u64 + 1)
    }

    /// Create a node. Always succeeds and always creates a new node;
    /// deduplication is the caller's business.
    pub fn create_node(&mut self, label: impl Into<Label>, properties: PropertyMap) -> NodeId {
        let node_id = self.next_node_id();
        let node = Node::new(node_id, label, properties);
        self.index_node(&node);
        debug!("Created {} node {}", node.label, node_id);
        self.nodes.push(node);
        node_id
    }

    fn index_node(&mut self, node: &Node) {
        self.label_index
            .entry(node.label.clone())
            .or_default()
            .push(node.id);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
    }

    /// First node, in creation order, with `label` whose properties are a
    /// superset match of `pattern`
    pub fn find_node(&self, label: &Label, pattern: &PropertyMap) -> Option<NodeId> {
        self.scan_label(label, pattern).next()
    }

    /// Every node with `label` matching `pattern`, in creation order
    pub fn find_nodes(&self, label: &Label, pattern: &PropertyMap) -> Vec<NodeId> {
        self.scan_label(label, pattern).collect()
    }

    fn scan_label<'a>(
        &'a self,
        label: &'a Label,
        pattern: &'a PropertyMap,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.label_index
            .get(label)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |&id| {
                self.get_node(id)
                    .map(|node| node.matches(label, pattern))
                    .unwrap_or(false)
            })
    }

    /// Create a directed edge `source -[edge_type]-> target`.
    ///
    /// Identical edges are not merged: calling this twice with the same
    /// arguments yields two edges.
    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
    ) -> GraphResult<EdgeId> {
        if !self.has_node(source) {
            return Err(GraphError::InvalidReference {
                id: source,
                role: EndpointRole::Source,
            });
        }
        if !self.has_node(target) {
            return Err(GraphError::InvalidReference {
                id: target,
                role: EndpointRole::Target,
            });
        }

        let edge_id = self.next_edge_id();
        let edge = Edge::new(edge_id, source, target, edge_type);
        self.index_edge(&edge);
        self.edges.push(edge);
        Ok(edge_id)
    }

    fn index_edge(&mut self, edge: &Edge) {
        // Endpoints were validated by the caller
        if let Some(slot) = Self::node_slot(edge.source) {
            self.outgoing[slot].push(edge.id);
        }
        if let Some(slot) = Self::node_slot(edge.target) {
            self.incoming[slot].push(edge.id);
        }
        self.edge_type_index
            .entry(edge.edge_type.clone())
            .or_default()
            .push(edge.id);
    }

    /// Nodes one hop away from `source` over `edge_type` edges in
    /// `direction`, in edge creation order.
    ///
    /// One entry per edge: duplicate edges produce duplicate neighbors.
    /// An unknown source or a node without such edges gives an empty list.
    pub fn traverse(
        &self,
        source: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> Vec<NodeId> {
        let adjacency = match direction {
            Direction::Outgoing => &self.outgoing,
            Direction::Incoming => &self.incoming,
        };
        Self::node_slot(source)
            .and_then(|slot| adjacency.get(slot))
            .into_iter()
            .flatten()
            .filter_map(|&edge_id| self.get_edge(edge_id))
            .filter(|edge| &edge.edge_type == edge_type)
            .filter_map(|edge| edge.neighbor(source, direction))
            .collect()
    }

    /// Whether at least one `source -[edge_type]-> target` edge exists
    pub fn has_edge(&self, source: NodeId, edge_type: &EdgeType, target: NodeId) -> bool {
        Self::node_slot(source)
            .and_then(|slot| self.outgoing.get(slot))
            .into_iter()
            .flatten()
            .filter_map(|&edge_id| self.get_edge(edge_id))
            .any(|edge| edge.target == target && &edge.edge_type == edge_type)
    }

    /// Number of `source -[edge_type]-> target` edges
    pub fn count_edges_between(&self, source: NodeId, edge_type: &EdgeType, target: NodeId) -> usize {
        self.traverse(source, edge_type, Direction::Outgoing)
            .into_iter()
            .filter(|&n| n == target)
            .count()
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        Self::node_slot(id).and_then(|slot| self.nodes.get(slot))
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        Self::edge_slot(id).and_then(|slot| self.edges.get(slot))
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Get all nodes with a specific label, in creation order
    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        self.label_index
            .get(label)
            .map(|ids| ids.iter().filter_map(|&id| self.get_node(id)).collect())
            .unwrap_or_default()
    }

    /// Get all edges of a specific type, in creation order
    pub fn get_edges_by_type(&self, edge_type: &EdgeType) -> Vec<&Edge> {
        self.edge_type_index
            .get(edge_type)
            .map(|ids| ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in creation order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn statistics(&self) -> GraphStatistics {
        let mut stats = GraphStatistics {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            ..Default::default()
        };
        for (label, ids) in &self.label_index {
            stats.nodes_per_label.insert(label.to_string(), ids.len());
        }
        for (edge_type, ids) in &self.edge_type_index {
            stats.edges_per_type.insert(edge_type.to_string(), ids.len());
        }
        stats
    }

    // ============================================================
    // Recovery - rebuild the store from a snapshot
    // ============================================================

    /// Insert a recovered node, keeping its id.
    ///
    /// Nodes must arrive in id order so that the arena stays dense.
    pub fn insert_recovered_node(&mut self, node: Node) -> GraphResult<()> {
        let expected = self.next_node_id();
        if node.id != expected {
            return Err(GraphError::OutOfSequence {
                kind: "node",
                expected: expected.as_u64(),
                found: node.id.as_u64(),
            });
        }
        self.index_node(&node);
        self.nodes.push(node);
        Ok(())
    }

    /// Insert a recovered edge, keeping its id. Both endpoints must
    /// already have been recovered.
    pub fn insert_recovered_edge(&mut self, edge: Edge) -> GraphResult<()> {
        let expected = self.next_edge_id();
        if edge.id != expected {
            return Err(GraphError::OutOfSequence {
                kind: "edge",
                expected: expected.as_u64(),
                found: edge.id.as_u64(),
            });
        }
        if !self.has_node(edge.source) {
            return Err(GraphError::InvalidReference {
                id: edge.source,
                role: EndpointRole::Source,
            });
        }
        if !self.has_node(edge.target) {
            return Err(GraphError::InvalidReference {
                id: edge.target,
                role: EndpointRole::Target,
            });
        }
        self.index_edge(&edge);
        self.edges.push(edge);
        Ok(())
    }
}
