//! Labels, relationship types and natural keys of the paper graph
//!
//! | Label               | Natural key        |
//! |---------------------|--------------------|
//! | Conference          | name, year, city   |
//! | Journal             | name, volume       |
//! | Paper               | title              |
//! | Author / Reviewer   | surname            |
//!
//! Relationships:
//! - `Conference -HAS-> Paper`, `Journal -HAS-> Paper`
//! - `Author -WROTE-> Paper`
//! - `Reviewer -REVIEWED-> Paper`
//! - `Author -IS_FRIEND-> Reviewer`

use super::types::{EdgeType, Label};

pub const CONFERENCE: &str = "Conference";
pub const JOURNAL: &str = "Journal";
pub const PAPER: &str = "Paper";
pub const AUTHOR: &str = "Author";
pub const REVIEWER: &str = "Reviewer";

pub const HAS: &str = "HAS";
pub const WROTE: &str = "WROTE";
pub const REVIEWED: &str = "REVIEWED";
pub const IS_FRIEND: &str = "IS_FRIEND";

// Property names
pub const NAME: &str = "name";
pub const YEAR: &str = "year";
pub const CITY: &str = "city";
pub const VOLUME: &str = "volume";
pub const TITLE: &str = "title";
pub const SURNAME: &str = "surname";

/// Properties forming the natural key of `label`.
///
/// Labels outside the schema have no natural key; every supplied property
/// then takes part in the match.
pub fn natural_key(label: &str) -> Option<&'static [&'static str]> {
    match label {
        CONFERENCE => Some(&[NAME, YEAR, CITY]),
        JOURNAL => Some(&[NAME, VOLUME]),
        PAPER => Some(&[TITLE]),
        AUTHOR | REVIEWER => Some(&[SURNAME]),
        _ => None,
    }
}

pub fn label(name: &str) -> Label {
    Label::new(name)
}

pub fn rel(name: &str) -> EdgeType {
    EdgeType::new(name)
}
