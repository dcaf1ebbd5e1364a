//! Persistence module for durable graph storage
//!
//! The whole graph is kept as a single compressed snapshot file. It is
//! read once when a run starts and rewritten when the run closes the
//! store, so re-running ingestion against a reopened store reuses the
//! nodes created by earlier runs.

pub mod snapshot;

pub use snapshot::{GraphSnapshot, SnapshotStore, SNAPSHOT_FORMAT_VERSION};

use crate::graph::GraphError;
use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Unsupported snapshot format version {found} (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("Corrupt snapshot: {0}")]
    Corrupt(#[from] GraphError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
