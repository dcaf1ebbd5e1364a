//! Typed feed records

use super::{FeedError, FeedResult};

/// A record that can be built from the split fields of one feed line.
pub trait FeedRecord: Sized {
    /// Record kind, used in diagnostics
    const KIND: &'static str;

    /// Minimum number of fields a line must carry
    const FIELDS: usize;

    /// Build from fields already checked to be at least `FIELDS` long
    fn from_checked(fields: &[String]) -> Self;

    /// Build from the fields of line `line`, failing on short records.
    /// Extra trailing fields are ignored.
    fn from_fields(line: usize, fields: &[String]) -> FeedResult<Self> {
        if fields.len() < Self::FIELDS {
            return Err(FeedError::RecordMalformed {
                kind: Self::KIND,
                line,
                expected: Self::FIELDS,
                found: fields.len(),
            });
        }
        Ok(Self::from_checked(fields))
    }
}

/// `paperTitle,authorList,confName,confYear,confCity,reviewerSurname`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConferenceRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub conference: String,
    pub year: String,
    pub city: String,
    pub reviewer: String,
}

impl FeedRecord for ConferenceRecord {
    const KIND: &'static str = "conference";
    const FIELDS: usize = 6;

    fn from_checked(fields: &[String]) -> Self {
        Self {
            title: field(fields, 0),
            authors: split_authors(&fields[1]),
            conference: field(fields, 2),
            year: field(fields, 3),
            city: field(fields, 4),
            reviewer: field(fields, 5),
        }
    }
}

/// `paperTitle,authorList,journalName,journalVolume,reviewerSurname`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    pub volume: String,
    pub reviewer: String,
}

impl FeedRecord for JournalRecord {
    const KIND: &'static str = "journal";
    const FIELDS: usize = 5;

    fn from_checked(fields: &[String]) -> Self {
        Self {
            title: field(fields, 0),
            authors: split_authors(&fields[1]),
            journal: field(fields, 2),
            volume: field(fields, 3),
            reviewer: field(fields, 4),
        }
    }
}

/// `reviewerSurname,authorSurname`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendshipRecord {
    pub reviewer: String,
    pub author: String,
}

impl FeedRecord for FriendshipRecord {
    const KIND: &'static str = "friendship";
    const FIELDS: usize = 2;

    fn from_checked(fields: &[String]) -> Self {
        Self {
            reviewer: field(fields, 0),
            author: field(fields, 1),
        }
    }
}

fn field(fields: &[String], idx: usize) -> String {
    fields[idx].trim().to_string()
}

/// Split a `;`-separated author list, trimming each entry and dropping
/// empty ones. Order is preserved.
pub fn split_authors(list: &str) -> Vec<String> {
    list.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
