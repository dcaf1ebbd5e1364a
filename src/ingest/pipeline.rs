//! Feed handlers
//!
//! Each handler consumes the lines of one feed, discards the first line
//! (header) and processes one record at a time. A record that cannot be
//! parsed, or a relationship whose endpoint cannot be resolved, is logged
//! and skipped; the rest of the feed is still ingested. Only I/O failures
//! of the feed itself abort a handler.

use super::records::{ConferenceRecord, FeedRecord, FriendshipRecord, JournalRecord};
use super::source::{FeedLine, FeedReader};
use super::FeedResult;
use crate::graph::schema::{HAS, IS_FRIEND, REVIEWED, WROTE};
use crate::graph::{GraphStore, NodeId};
use crate::resolve::{EntityResolver, Resolution, ResolveResult};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Conferences,
    Journals,
    Friendships,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Conferences => f.write_str("conferences"),
            FeedKind::Journals => f.write_str("journals"),
            FeedKind::Friendships => f.write_str("friendships"),
        }
    }
}

/// What one feed handler did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub feed: FeedKind,
    /// Records parsed and processed
    pub records: usize,
    /// Records skipped because they had too few fields
    pub malformed: usize,
    pub nodes_created: usize,
    pub nodes_reused: usize,
    pub edges_created: usize,
    /// Relationships not created because an endpoint could not be resolved
    pub relationships_skipped: usize,
    /// A blank line stopped the feed before end of input
    pub stopped_at_blank: bool,
}

impl IngestReport {
    pub fn new(feed: FeedKind) -> Self {
        Self {
            feed,
            records: 0,
            malformed: 0,
            nodes_created: 0,
            nodes_reused: 0,
            edges_created: 0,
            relationships_skipped: 0,
            stopped_at_blank: false,
        }
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} records ({} malformed), {} nodes created, {} reused, {} edges, {} relationships skipped",
            self.feed,
            self.records,
            self.malformed,
            self.nodes_created,
            self.nodes_reused,
            self.edges_created,
            self.relationships_skipped
        )
    }
}

/// Reports of a full populate run, in feed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateReport {
    pub conferences: IngestReport,
    pub journals: IngestReport,
    pub friendships: IngestReport,
}

impl PopulateReport {
    pub fn edges_created(&self) -> usize {
        self.conferences.edges_created + self.journals.edges_created + self.friendships.edges_created
    }
}

/// Locations of the three feeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPaths {
    pub conferences: PathBuf,
    pub journals: PathBuf,
    pub friendships: PathBuf,
}

impl FeedPaths {
    /// The conventional file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            conferences: dir.join("conferences.csv"),
            journals: dir.join("journals.csv"),
            friendships: dir.join("friendships.csv"),
        }
    }
}

pub struct IngestionPipeline<'a> {
    store: &'a mut GraphStore,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(store: &'a mut GraphStore) -> Self {
        Self { store }
    }

    /// Ingest the three feeds in order: conferences, journals, friendships
    pub fn populate(&mut self, paths: &FeedPaths) -> FeedResult<PopulateReport> {
        info!("Populating graph");
        let conferences = self.ingest_conferences(FeedReader::open(&paths.conferences)?)?;
        let journals = self.ingest_journals(FeedReader::open(&paths.journals)?)?;
        let friendships = self.ingest_friendships(FeedReader::open(&paths.friendships)?)?;
        info!(
            "Populating complete: {} nodes, {} edges in store",
            self.store.node_count(),
            self.store.edge_count()
        );
        Ok(PopulateReport {
            conferences,
            journals,
            friendships,
        })
    }

    pub fn ingest_conferences<I>(&mut self, lines: I) -> FeedResult<IngestReport>
    where
        I: IntoIterator<Item = FeedResult<FeedLine>>,
    {
        self.run_feed(FeedKind::Conferences, lines, |pipeline, record: ConferenceRecord, report| {
            pipeline.conference_record(&record, report)
        })
    }

    pub fn ingest_journals<I>(&mut self, lines: I) -> FeedResult<IngestReport>
    where
        I: IntoIterator<Item = FeedResult<FeedLine>>,
    {
        self.run_feed(FeedKind::Journals, lines, |pipeline, record: JournalRecord, report| {
            pipeline.journal_record(&record, report)
        })
    }

    /// Friendship feed; a blank line ends it
    pub fn ingest_friendships<I>(&mut self, lines: I) -> FeedResult<IngestReport>
    where
        I: IntoIterator<Item = FeedResult<FeedLine>>,
    {
        self.run_feed(FeedKind::Friendships, lines, |pipeline, record: FriendshipRecord, report| {
            pipeline.friendship_record(&record, report)
        })
    }

    fn run_feed<I, R, F>(&mut self, feed: FeedKind, lines: I, mut handle: F) -> FeedResult<IngestReport>
    where
        I: IntoIterator<Item = FeedResult<FeedLine>>,
        R: FeedRecord,
        F: FnMut(&mut Self, R, &mut IngestReport),
    {
        info!("Populating {}", feed);
        let mut report = IngestReport::new(feed);

        let mut lines = lines.into_iter();
        // First line is the header
        if let Some(header) = lines.next() {
            header?;
        }
        for line in lines {
            match line? {
                FeedLine::Blank { line } => {
                    if feed == FeedKind::Friendships {
                        info!("Blank line {} ends the {} feed", line, feed);
                        report.stopped_at_blank = true;
                        break;
                    }
                }
                FeedLine::Fields { line, fields } => match R::from_fields(line, &fields) {
                    Ok(record) => {
                        report.records += 1;
                        handle(&mut *self, record, &mut report);
                    }
                    Err(e) => {
                        warn!("Skipping record: {}", e);
                        report.malformed += 1;
                    }
                },
            }
        }

        info!("Populating {} complete", report);
        Ok(report)
    }

    /// Paper, Conference -HAS-> Paper, Reviewer -REVIEWED-> Paper, then
    /// Author -WROTE-> Paper for every listed author
    pub fn conference_record(&mut self, record: &ConferenceRecord, report: &mut IngestReport) {
        let paper = self.resolve(report, |r| r.paper(&record.title));
        let conference = self.resolve(report, |r| {
            r.conference(&record.conference, &record.year, &record.city)
        });
        self.link(report, conference, HAS, paper);

        let reviewer = self.resolve(report, |r| r.reviewer(&record.reviewer));
        self.link(report, reviewer, REVIEWED, paper);

        for surname in &record.authors {
            let author = self.resolve(report, |r| r.author(surname));
            self.link(report, author, WROTE, paper);
        }
    }

    /// Paper, Journal -HAS-> Paper, authors, then the reviewer
    pub fn journal_record(&mut self, record: &JournalRecord, report: &mut IngestReport) {
        let paper = self.resolve(report, |r| r.paper(&record.title));
        let journal = self.resolve(report, |r| r.journal(&record.journal, &record.volume));
        self.link(report, journal, HAS, paper);

        for surname in &record.authors {
            let author = self.resolve(report, |r| r.author(surname));
            self.link(report, author, WROTE, paper);
        }

        let reviewer = self.resolve(report, |r| r.reviewer(&record.reviewer));
        self.link(report, reviewer, REVIEWED, paper);
    }

    /// Author -IS_FRIEND-> Reviewer
    pub fn friendship_record(&mut self, record: &FriendshipRecord, report: &mut IngestReport) {
        let reviewer = self.resolve(report, |r| r.reviewer(&record.reviewer));
        let author = self.resolve(report, |r| r.author(&record.author));
        self.link(report, author, IS_FRIEND, reviewer);
    }

    fn resolve<F>(&mut self, report: &mut IngestReport, upsert: F) -> Option<NodeId>
    where
        F: FnOnce(&mut EntityResolver<'_>) -> ResolveResult<Resolution>,
    {
        let mut resolver = EntityResolver::new(&mut *self.store);
        match upsert(&mut resolver) {
            Ok(resolution) => {
                if resolution.is_created() {
                    report.nodes_created += 1;
                } else {
                    report.nodes_reused += 1;
                }
                Some(resolution.id())
            }
            Err(e) => {
                warn!("Could not resolve node: {}", e);
                None
            }
        }
    }

    fn link(
        &mut self,
        report: &mut IngestReport,
        source: Option<NodeId>,
        rel: &str,
        target: Option<NodeId>,
    ) {
        let (Some(source), Some(target)) = (source, target) else {
            warn!("{} relationship not created: one of the nodes does not exist", rel);
            report.relationships_skipped += 1;
            return;
        };
        match self.store.create_edge(source, target, rel) {
            Ok(_) => report.edges_created += 1,
            Err(e) => {
                warn!("{} relationship not created: {}", rel, e);
                report.relationships_skipped += 1;
            }
        }
    }
}
