//! Entity resolution: find-or-create nodes by natural key
//!
//! [`EntityResolver::upsert`] is the only path the ingestion pipeline uses
//! to create nodes. It holds no state of its own; every lookup and insert
//! goes straight to the borrowed [`GraphStore`].
//!
//! The find-then-create sequence is not atomic. That is sound only because
//! the resolver needs `&mut GraphStore`, so two upserts can never interleave.

use crate::graph::schema::{self, AUTHOR, CONFERENCE, JOURNAL, PAPER, REVIEWER};
use crate::graph::{GraphStore, Label, NodeId, PropertyMap, PropertyValue};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq)]
pub enum ResolveError {
    #[error("{label} key property '{property}' is missing")]
    MissingKey { label: Label, property: String },

    #[error("{label} key property '{property}' is blank")]
    BlankKey { label: Label, property: String },
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Outcome of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No node carried the key; this one was just created
    Created(NodeId),
    /// A node with the same label and key already existed
    Existing(NodeId),
}

impl Resolution {
    pub fn id(&self) -> NodeId {
        match self {
            Resolution::Created(id) | Resolution::Existing(id) => *id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Resolution::Created(_))
    }
}

pub struct EntityResolver<'a> {
    store: &'a mut GraphStore,
}

impl<'a> EntityResolver<'a> {
    pub fn new(store: &'a mut GraphStore) -> Self {
        Self { store }
    }

    /// Return the node of `label` carrying `key`, creating it first if
    /// none exists.
    ///
    /// Idempotent: repeated calls with equal key values return the same
    /// id. For schema labels every natural-key property must be present
    /// and non-blank.
    pub fn upsert(&mut self, label: &Label, key: PropertyMap) -> ResolveResult<Resolution> {
        validate_key(label, &key)?;

        if let Some(id) = self.store.find_node(label, &key) {
            debug!("{} already exists: {}", label, describe(&key));
            return Ok(Resolution::Existing(id));
        }

        let id = self.store.create_node(label.clone(), key);
        Ok(Resolution::Created(id))
    }

    pub fn paper(&mut self, title: &str) -> ResolveResult<Resolution> {
        self.upsert(&schema::label(PAPER), key([(schema::TITLE, title)]))
    }

    pub fn conference(&mut self, name: &str, year: &str, city: &str) -> ResolveResult<Resolution> {
        self.upsert(
            &schema::label(CONFERENCE),
            key([(schema::NAME, name), (schema::YEAR, year), (schema::CITY, city)]),
        )
    }

    pub fn journal(&mut self, name: &str, volume: &str) -> ResolveResult<Resolution> {
        self.upsert(
            &schema::label(JOURNAL),
            key([(schema::NAME, name), (schema::VOLUME, volume)]),
        )
    }

    pub fn author(&mut self, surname: &str) -> ResolveResult<Resolution> {
        self.upsert(&schema::label(AUTHOR), key([(schema::SURNAME, surname)]))
    }

    pub fn reviewer(&mut self, surname: &str) -> ResolveResult<Resolution> {
        self.upsert(&schema::label(REVIEWER), key([(schema::SURNAME, surname)]))
    }
}

fn key<const N: usize>(pairs: [(&str, &str); N]) -> PropertyMap {
    crate::graph::props(pairs)
}

fn validate_key(label: &Label, key: &PropertyMap) -> ResolveResult<()> {
    let Some(required) = schema::natural_key(label.as_str()) else {
        return Ok(());
    };
    for &property in required {
        match key.get(property) {
            None => {
                return Err(ResolveError::MissingKey {
                    label: label.clone(),
                    property: property.to_string(),
                })
            }
            Some(PropertyValue::String(s)) if s.trim().is_empty() => {
                return Err(ResolveError::BlankKey {
                    label: label.clone(),
                    property: property.to_string(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn describe(key: &PropertyMap) -> String {
    key.values()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" , ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::props;

    #[test]
    fn test_upsert_is_idempotent() {
        let mut store = GraphStore::new();
        let mut resolver = EntityResolver::new(&mut store);

        let first = resolver.author("Smith").unwrap();
        let second = resolver.author("Smith").unwrap();

        assert!(first.is_created());
        assert_eq!(second, Resolution::Existing(first.id()));
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_same_surname_different_labels() {
        let mut store = GraphStore::new();
        let mut resolver = EntityResolver::new(&mut store);

        let author = resolver.author("Feng").unwrap().id();
        let reviewer = resolver.reviewer("Feng").unwrap().id();

        assert_ne!(author, reviewer);
        assert_eq!(store.node_count(), 2);
    }

    #[test]
    fn test_conference_key_uses_all_fields() {
        let mut store = GraphStore::new();
        let mut resolver = EntityResolver::new(&mut store);

        let a = resolver.conference("SRDS", "2014", "Nara").unwrap().id();
        let b = resolver.conference("SRDS", "2015", "Montreal").unwrap().id();
        let c = resolver.conference("SRDS", "2014", "Nara").unwrap().id();

        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(store.node_count(), 2);
    }

    #[test]
    fn test_journal_key() {
        let mut store = GraphStore::new();
        let mut resolver = EntityResolver::new(&mut store);

        let v27 = resolver.journal("IEEE Network", "27").unwrap().id();
        let v28 = resolver.journal("IEEE Network", "28").unwrap().id();
        assert_ne!(v27, v28);
        assert_eq!(resolver.journal("IEEE Network", "27").unwrap().id(), v27);
    }

    #[test]
    fn test_blank_key_is_rejected() {
        let mut store = GraphStore::new();
        let mut resolver = EntityResolver::new(&mut store);

        let err = resolver.author("  ").unwrap_err();
        assert_eq!(
            err,
            ResolveError::BlankKey { label: Label::new("Author"), property: "surname".into() }
        );
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let mut store = GraphStore::new();
        let mut resolver = EntityResolver::new(&mut store);

        let err = resolver
            .upsert(&Label::new("Journal"), props([("name", "KSII")]))
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingKey { ref property, .. } if property == "volume"));
    }

    #[test]
    fn test_unknown_label_matches_on_all_properties() {
        let mut store = GraphStore::new();
        let mut resolver = EntityResolver::new(&mut store);
        let label = Label::new("Institution");

        let a = resolver.upsert(&label, props([("name", "UPM")])).unwrap().id();
        let b = resolver.upsert(&label, props([("name", "UPM")])).unwrap().id();
        assert_eq!(a, b);
    }
}
