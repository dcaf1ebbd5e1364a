//! Papergraph
//!
//! An in-memory property graph of papers, the venues that published them,
//! their authors and reviewers, and friendships between authors and
//! reviewers. Three comma-separated feeds populate the graph; four fixed
//! pattern queries read it back.
//!
//! # Layout
//!
//! - [`graph`]: append-only property graph store (nodes, edges, indices)
//! - [`resolve`]: find-or-create of nodes by natural key
//! - [`ingest`]: feed reader, typed records and the ingestion pipeline
//! - [`query`]: evaluator for the fixed queries Q1 to Q4
//! - [`sink`]: append-only result log
//! - [`persistence`]: gzip-compressed snapshot of the whole graph
//! - [`config`]: YAML run configuration
//! - [`session`]: open, populate, query and close in one place
//!
//! ## Example Usage
//!
//! ```rust
//! use papergraph::ingest::{FeedReader, IngestionPipeline};
//! use papergraph::query::{PatternQuery, QueryEvaluator};
//! use papergraph::GraphStore;
//! use std::io::Cursor;
//!
//! let mut store = GraphStore::new();
//! let feed = "title,authors,conference,year,city,reviewer\n\
//!             P,A;B,SRDS,2019,Lyon,R\n";
//! IngestionPipeline::new(&mut store)
//!     .ingest_conferences(FeedReader::new(Cursor::new(feed)))
//!     .unwrap();
//!
//! let outcome = QueryEvaluator::new(&store).execute(&PatternQuery::Q1 {
//!     title: "P".to_string(),
//! });
//! assert_eq!(outcome.rows[0].to_string(), "P,(A,B),R");
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod persistence;
pub mod query;
pub mod resolve;
pub mod session;
pub mod sink;

// Re-export main types for convenience
pub use graph::{
    Direction, Edge, EdgeId, EdgeType, GraphError, GraphResult, GraphStatistics, GraphStore,
    Label, Node, NodeId, PropertyMap, PropertyValue,
};

pub use resolve::{EntityResolver, Resolution, ResolveError, ResolveResult};

pub use ingest::{
    FeedError, FeedPaths, FeedReader, FeedResult, IngestReport, IngestionPipeline, PopulateReport,
};

pub use query::{Field, PatternQuery, QueryEvaluator, QueryKind, QueryOutcome, ResultRow};

pub use sink::{FileSink, MemorySink, ResultSink, SinkError, SinkResult, TeeSink};

pub use persistence::{PersistenceError, PersistenceResult, SnapshotStore};

pub use config::{AppConfig, ConfigError, ConfigResult};

pub use error::{Error, Result};

pub use session::{run_batch, Session};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
