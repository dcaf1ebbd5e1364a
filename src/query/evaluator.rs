//! Pattern query evaluator
//!
//! Each query is a fixed composition of [`GraphStore::find_node`] and
//! [`GraphStore::traverse`] calls. Evaluation only borrows the store
//! immutably, so a query can never change the graph.

use super::result::{Field, QueryKind, QueryOutcome, ResultRow};
use crate::graph::schema::{
    self, AUTHOR, CONFERENCE, HAS, IS_FRIEND, JOURNAL, NAME, PAPER, REVIEWED, REVIEWER, SURNAME,
    TITLE, VOLUME, WROTE,
};
use crate::graph::{props, Direction, GraphStore, Label, NodeId};
use indexmap::IndexSet;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

/// One invocation of a fixed query with its literal parameters
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "query", rename_all = "lowercase")]
pub enum PatternQuery {
    Q1 { title: String },
    Q2 { conference: String },
    Q3 { author: String },
    Q4 { journal: String, volume: u32 },
}

impl PatternQuery {
    pub fn kind(&self) -> QueryKind {
        match self {
            PatternQuery::Q1 { .. } => QueryKind::Q1,
            PatternQuery::Q2 { .. } => QueryKind::Q2,
            PatternQuery::Q3 { .. } => QueryKind::Q3,
            PatternQuery::Q4 { .. } => QueryKind::Q4,
        }
    }
}

impl fmt::Display for PatternQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternQuery::Q1 { title } => write!(f, "Q1(\"{}\")", title),
            PatternQuery::Q2 { conference } => write!(f, "Q2(\"{}\")", conference),
            PatternQuery::Q3 { author } => write!(f, "Q3(\"{}\")", author),
            PatternQuery::Q4 { journal, volume } => write!(f, "Q4(\"{}\", {})", journal, volume),
        }
    }
}

pub struct QueryEvaluator<'a> {
    store: &'a GraphStore,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    pub fn execute(&self, query: &PatternQuery) -> QueryOutcome {
        debug!("Executing {}", query);
        match query {
            PatternQuery::Q1 { title } => self.paper_review(title),
            PatternQuery::Q2 { conference } => self.conference_papers(conference),
            PatternQuery::Q3 { author } => self.author_papers(author),
            PatternQuery::Q4 { journal, volume } => self.friendly_reviews(journal, *volume),
        }
    }

    /// Q1: `(p:Paper {title})<-[:WROTE]-(a:Author), (p)<-[:REVIEWED]-(r:Reviewer)`
    ///
    /// One row `title,(author1,author2,...),reviewer`. Only one reviewer slot
    /// exists: with several REVIEWED edges the last one created wins. A
    /// missing paper, or a paper lacking authors or a reviewer, yields
    /// `title,()`.
    pub fn paper_review(&self, title: &str) -> QueryOutcome {
        let empty = || {
            QueryOutcome::no_match(
                QueryKind::Q1,
                ResultRow::new(vec![Field::value(title), Field::List(Vec::new())]),
            )
        };

        let Some(paper) = self.store.find_node(&schema::label(PAPER), &props([(TITLE, title)])) else {
            return empty();
        };

        let authors = self.neighbors(paper, WROTE, Direction::Incoming, AUTHOR);
        // Every edge is visited; the last one overwrites the slot
        let reviewer_label = schema::label(REVIEWER);
        let reviewer = self
            .store
            .traverse(paper, &schema::rel(REVIEWED), Direction::Incoming)
            .into_iter()
            .filter(|&id| self.has_label(id, &reviewer_label))
            .last();

        match reviewer {
            Some(reviewer) if !authors.is_empty() => QueryOutcome::new(
                QueryKind::Q1,
                vec![ResultRow::new(vec![
                    Field::value(title),
                    Field::List(self.values(&authors, SURNAME)),
                    Field::value(self.value(reviewer, SURNAME)),
                ])],
            ),
            _ => empty(),
        }
    }

    /// Q2: `(c:Conference {name})-[:HAS]->(p:Paper)`
    ///
    /// Matches on name only, so every edition of the conference counts.
    /// One row `name,(title1,title2,...)`.
    pub fn conference_papers(&self, name: &str) -> QueryOutcome {
        let conferences = self
            .store
            .find_nodes(&schema::label(CONFERENCE), &props([(NAME, name)]));

        let mut papers = IndexSet::new();
        for conference in conferences {
            papers.extend(self.neighbors(conference, HAS, Direction::Outgoing, PAPER));
        }

        self.titled_list(QueryKind::Q2, name, papers)
    }

    /// Q3: `(a:Author {surname})-[:WROTE]->(p:Paper)`; one row
    /// `surname,(title1,title2,...)`
    pub fn author_papers(&self, surname: &str) -> QueryOutcome {
        let papers = self
            .store
            .find_node(&schema::label(AUTHOR), &props([(SURNAME, surname)]))
            .map(|author| self.neighbors(author, WROTE, Direction::Outgoing, PAPER))
            .unwrap_or_default();

        self.titled_list(QueryKind::Q3, surname, papers)
    }

    /// Q4: `(:Journal {name, volume})-[:HAS]->(p:Paper)<-[:WROTE]-(a:Author),
    /// (p)<-[:REVIEWED]-(r:Reviewer), (a)-[:IS_FRIEND]->(r)`
    ///
    /// One row `title,author,reviewer` per distinct triple, or a single
    /// `,,` row when nothing matches.
    pub fn friendly_reviews(&self, name: &str, volume: u32) -> QueryOutcome {
        let volume = volume.to_string();
        let friend = schema::rel(IS_FRIEND);
        let mut triples = IndexSet::new();

        let journal = self.store.find_node(
            &schema::label(JOURNAL),
            &props([(NAME, name), (VOLUME, volume.as_str())]),
        );
        for paper in journal
            .map(|j| self.neighbors(j, HAS, Direction::Outgoing, PAPER))
            .unwrap_or_default()
        {
            let authors = self.neighbors(paper, WROTE, Direction::Incoming, AUTHOR);
            let reviewers = self.neighbors(paper, REVIEWED, Direction::Incoming, REVIEWER);
            for &author in &authors {
                for &reviewer in &reviewers {
                    if self.store.has_edge(author, &friend, reviewer) {
                        triples.insert((
                            self.value(paper, TITLE),
                            self.value(author, SURNAME),
                            self.value(reviewer, SURNAME),
                        ));
                    }
                }
            }
        }

        if triples.is_empty() {
            return QueryOutcome::no_match(
                QueryKind::Q4,
                ResultRow::new(vec![Field::value(""), Field::value(""), Field::value("")]),
            );
        }

        let rows = triples
            .into_iter()
            .map(|(title, author, reviewer)| {
                ResultRow::new(vec![
                    Field::Value(title),
                    Field::Value(author),
                    Field::Value(reviewer),
                ])
            })
            .collect();
        QueryOutcome::new(QueryKind::Q4, rows)
    }

    fn titled_list<I>(&self, kind: QueryKind, head: &str, papers: I) -> QueryOutcome
    where
        I: IntoIterator<Item = NodeId>,
    {
        let papers: Vec<NodeId> = papers.into_iter().collect();
        let row = ResultRow::new(vec![
            Field::value(head),
            Field::List(self.values(&papers, TITLE)),
        ]);
        if papers.is_empty() {
            QueryOutcome::no_match(kind, row)
        } else {
            QueryOutcome::new(kind, vec![row])
        }
    }

    /// Distinct one-hop neighbors carrying `label`, first occurrence order
    fn neighbors(&self, node: NodeId, rel: &str, direction: Direction, label: &str) -> Vec<NodeId> {
        let label = schema::label(label);
        self.store
            .traverse(node, &schema::rel(rel), direction)
            .into_iter()
            .filter(|&id| self.has_label(id, &label))
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    fn has_label(&self, node: NodeId, label: &Label) -> bool {
        self.store
            .get_node(node)
            .map(|n| n.has_label(label))
            .unwrap_or(false)
    }

    fn value(&self, node: NodeId, property: &str) -> String {
        self.store
            .get_node(node)
            .and_then(|n| n.get_property(property))
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    fn values(&self, nodes: &[NodeId], property: &str) -> Vec<String> {
        nodes.iter().map(|&n| self.value(n, property)).collect()
    }
}
