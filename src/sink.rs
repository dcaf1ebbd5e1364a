//! Result sinks
//!
//! A sink receives every row a query produced, tagged with the query it
//! came from. [`FileSink`] appends to a log that is never truncated, so
//! results of successive runs accumulate.

use crate::query::{QueryKind, QueryOutcome, ResultRow};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write results to {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type SinkResult<T> = Result<T, SinkError>;

pub trait ResultSink {
    /// Record one result row of `kind`
    fn emit(&mut self, kind: QueryKind, row: &ResultRow) -> SinkResult<()>;

    /// Record every row of an outcome, in order
    fn emit_outcome(&mut self, outcome: &QueryOutcome) -> SinkResult<()> {
        for row in &outcome.rows {
            self.emit(outcome.kind, row)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> SinkResult<()> {
        Ok(())
    }
}

/// One formatted line per row
pub fn format_line(kind: QueryKind, row: &ResultRow) -> String {
    format!("{}: {}", kind, row)
}

/// Appends `"<Qn>: <row>"` lines to a file
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> SinkResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("Appending results to {:?}", path);
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ResultSink for FileSink {
    fn emit(&mut self, kind: QueryKind, row: &ResultRow) -> SinkResult<()> {
        writeln!(self.writer, "{}", format_line(kind, row)).map_err(|e| self.io_error(e))
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.writer.flush().map_err(|e| self.io_error(e))
    }
}

/// Keeps formatted lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl ResultSink for MemorySink {
    fn emit(&mut self, kind: QueryKind, row: &ResultRow) -> SinkResult<()> {
        self.lines.push(format_line(kind, row));
        Ok(())
    }
}

/// Forwards every row to two sinks, e.g. the result log and a
/// [`MemorySink`] echoed to the terminal
pub struct TeeSink<A, B> {
    first: A,
    second: B,
}

impl<A: ResultSink, B: ResultSink> TeeSink<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: ResultSink, B: ResultSink> ResultSink for TeeSink<A, B> {
    fn emit(&mut self, kind: QueryKind, row: &ResultRow) -> SinkResult<()> {
        self.first.emit(kind, row)?;
        self.second.emit(kind, row)
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.first.flush()?;
        self.second.flush()
    }
}
