//! One run against the graph: open the store, ingest, query, close

use crate::config::AppConfig;
use crate::error::Result;
use crate::graph::GraphStore;
use crate::ingest::{FeedPaths, IngestionPipeline, PopulateReport};
use crate::persistence::SnapshotStore;
use crate::query::{PatternQuery, QueryEvaluator, QueryOutcome};
use crate::sink::ResultSink;
use std::path::Path;
use tracing::info;

/// Owns the graph for the duration of a run
///
/// Without a snapshot the graph lives only as long as the session.
pub struct Session {
    store: GraphStore,
    snapshot: Option<SnapshotStore>,
}

impl Session {
    /// A session over a fresh in-memory graph
    pub fn in_memory() -> Self {
        Self {
            store: GraphStore::new(),
            snapshot: None,
        }
    }

    /// Open the snapshot at `path`, or start empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let snapshot = SnapshotStore::new(path);
        let store = snapshot.open()?;
        Ok(Self {
            store,
            snapshot: Some(snapshot),
        })
    }

    /// Open the store the config names, if any
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match &config.store_path {
            Some(path) => Self::open(path),
            None => Ok(Self::in_memory()),
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    pub fn populate(&mut self, paths: &FeedPaths) -> Result<PopulateReport> {
        let report = IngestionPipeline::new(&mut self.store).populate(paths)?;
        Ok(report)
    }

    pub fn query(&self, query: &PatternQuery) -> QueryOutcome {
        QueryEvaluator::new(&self.store).execute(query)
    }

    /// Run `queries` in order, sending every row to `sink`
    pub fn run_queries<S: ResultSink + ?Sized>(
        &self,
        queries: &[PatternQuery],
        sink: &mut S,
    ) -> Result<Vec<QueryOutcome>> {
        let evaluator = QueryEvaluator::new(&self.store);
        let mut outcomes = Vec::with_capacity(queries.len());
        for query in queries {
            let outcome = evaluator.execute(query);
            sink.emit_outcome(&outcome)?;
            outcomes.push(outcome);
        }
        sink.flush()?;
        info!("Ran {} queries", outcomes.len());
        Ok(outcomes)
    }

    /// Persist the graph when a snapshot backs this session
    pub fn close(self) -> Result<()> {
        if let Some(snapshot) = &self.snapshot {
            snapshot.close(&self.store)?;
        }
        Ok(())
    }
}

/// Populate from the configured feeds, run the configured queries and close
pub fn run_batch<S: ResultSink + ?Sized>(
    config: &AppConfig,
    sink: &mut S,
) -> Result<(PopulateReport, Vec<QueryOutcome>)> {
    let mut session = Session::from_config(config)?;
    let report = session.populate(&config.feed_paths())?;
    let outcomes = session.run_queries(&config.queries, sink)?;
    session.close()?;
    Ok((report, outcomes))
}
