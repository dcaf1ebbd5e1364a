//! Crate-level error type

use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::ingest::FeedError;
use crate::persistence::PersistenceError;
use crate::resolve::ResolveError;
use crate::sink::SinkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Entity resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// The backing store could not be opened or closed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] PersistenceError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Result sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
