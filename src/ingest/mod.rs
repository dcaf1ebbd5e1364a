//! Ingestion of the conference, journal and friendship feeds
//!
//! - [`source`]: line-oriented feed reader (comma-separated fields)
//! - [`records`]: typed records built from split fields
//! - [`pipeline`]: drives the entity resolver and the store per record

pub mod pipeline;
pub mod records;
pub mod source;

pub use pipeline::{FeedKind, FeedPaths, IngestReport, IngestionPipeline, PopulateReport};
pub use records::{ConferenceRecord, FeedRecord, FriendshipRecord, JournalRecord};
pub use source::{FeedLine, FeedReader};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading feeds
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to read feed {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {kind} record at line {line}: expected {expected} fields, found {found}")]
    RecordMalformed {
        kind: &'static str,
        line: usize,
        expected: usize,
        found: usize,
    },
}

pub type FeedResult<T> = Result<T, FeedError>;
