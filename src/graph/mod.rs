//! Property graph store
//!
//! This module implements the labeled property graph the rest of the crate
//! writes to and reads from:
//! - Nodes with a single label and string-valued properties
//! - Directed, typed edges without payload
//! - Multiple edges between the same nodes
//! - Hash-based label/type indices and per-node adjacency lists

pub mod edge;
pub mod node;
pub mod property;
pub mod schema;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::Node;
pub use property::{props, PropertyMap, PropertyValue};
pub use store::{EndpointRole, GraphError, GraphResult, GraphStatistics, GraphStore};
pub use types::{Direction, EdgeId, EdgeType, Label, NodeId};
