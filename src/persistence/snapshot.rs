//! Gzip-compressed bincode snapshots of a [`GraphStore`]

use super::{PersistenceError, PersistenceResult};
use crate::graph::{Edge, GraphStore, Node};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// On-disk form of a graph; nodes and edges in id order
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub format_version: u32,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn capture(store: &GraphStore) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            nodes: store.nodes().to_vec(),
            edges: store.edges().to_vec(),
        }
    }

    /// Rebuild a store, checking id order and edge endpoints
    pub fn restore(self) -> PersistenceResult<GraphStore> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                expected: SNAPSHOT_FORMAT_VERSION,
                found: self.format_version,
            });
        }

        let mut store = GraphStore::new();
        for node in self.nodes {
            store.insert_recovered_node(node)?;
        }
        for edge in self.edges {
            store.insert_recovered_edge(edge)?;
        }
        Ok(store)
    }
}

/// A graph store backed by one snapshot file
///
/// `open` yields an empty graph when the file does not exist yet. `close`
/// writes to a sibling temp file first and renames it into place, so a
/// failed write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the graph from disk
    pub fn open(&self) -> PersistenceResult<GraphStore> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No snapshot at {:?}, starting with an empty graph", self.path);
                return Ok(GraphStore::new());
            }
            Err(e) => return Err(e.into()),
        };

        let decoder = GzDecoder::new(BufReader::new(file));
        let snapshot: GraphSnapshot = bincode::deserialize_from(decoder)?;
        let store = snapshot.restore()?;

        info!(
            "Opened snapshot {:?}: {} nodes, {} edges",
            self.path,
            store.node_count(),
            store.edge_count()
        );
        Ok(store)
    }

    /// Write the graph to disk, replacing any previous snapshot
    pub fn close(&self, store: &GraphStore) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            bincode::serialize_into(&mut encoder, &GraphSnapshot::capture(store))?;
            let mut writer = encoder.finish()?;
            writer.flush()?;
        }
        debug!("Wrote snapshot to {:?}", tmp_path);

        fs::rename(&tmp_path, &self.path)?;
        info!(
            "Closed snapshot {:?}: {} nodes, {} edges",
            self.path,
            store.node_count(),
            store.edge_count()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "graph.snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{props, EdgeId, GraphError, NodeId, PropertyValue};
    use tempfile::TempDir;

    fn sample_store() -> GraphStore {
        let mut store = GraphStore::new();
        let paper = store.create_node("Paper", props([("title", "P")]));
        let author = store.create_node("Author", props([("surname", "Smith")]));
        let mut conf_props = props([("name", "SRDS"), ("city", "Lyon")]);
        conf_props.insert("year".to_string(), PropertyValue::Integer(2019));
        let conf = store.create_node("Conference", conf_props);
        store.create_edge(author, paper, "WROTE").unwrap();
        store.create_edge(paper, conf, "HAS").unwrap();
        store
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let snapshots = SnapshotStore::new(dir.path().join("graph.snapshot"));
        assert!(!snapshots.exists());

        let store = snapshots.open().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_close_then_open() {
        let dir = TempDir::new().unwrap();
        let snapshots = SnapshotStore::new(dir.path().join("graph.snapshot"));

        let saved = sample_store();
        snapshots.close(&saved).unwrap();
        assert!(snapshots.exists());

        let restored = snapshots.open().unwrap();
        assert_eq!(restored.statistics(), saved.statistics());

        let conf = restored.get_node(NodeId::new(3)).unwrap();
        assert_eq!(conf.get_property("year").and_then(|v| v.as_integer()), Some(2019));
        assert_eq!(conf.get_str("city"), Some("Lyon"));

        // Ids keep counting from where the snapshot stopped
        let mut restored = restored;
        let next = restored.create_node("Paper", props([("title", "Q")]));
        assert_eq!(next, NodeId::new(4));
        let edge = restored.create_edge(next, NodeId::new(3), "HAS").unwrap();
        assert_eq!(edge, EdgeId::new(3));
    }

    #[test]
    fn test_close_creates_parent_dirs_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store").join("graph.snapshot");
        let snapshots = SnapshotStore::new(&path);

        snapshots.close(&sample_store()).unwrap();
        assert!(path.exists());
        assert!(!path.with_file_name("graph.snapshot.tmp").exists());
    }

    #[test]
    fn test_close_overwrites_previous() {
        let dir = TempDir::new().unwrap();
        let snapshots = SnapshotStore::new(dir.path().join("graph.snapshot"));

        snapshots.close(&sample_store()).unwrap();
        snapshots.close(&GraphStore::new()).unwrap();

        assert!(snapshots.open().unwrap().is_empty());
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.snapshot");
        fs::write(&path, b"definitely not gzip").unwrap();

        let result = SnapshotStore::new(&path).open();
        assert!(result.is_err());
    }

    #[test]
    fn test_restore_rejects_dangling_edge() {
        let snapshot = GraphSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            nodes: vec![Node::new(NodeId::new(1), "Paper", props([("title", "P")]))],
            edges: vec![Edge::new(EdgeId::new(1), NodeId::new(1), NodeId::new(9), "HAS")],
        };
        let err = snapshot.restore().unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt(GraphError::InvalidReference { .. })));
    }

    #[test]
    fn test_restore_rejects_unknown_version() {
        let snapshot = GraphSnapshot {
            format_version: 99,
            nodes: vec![],
            edges: vec![],
        };
        assert!(matches!(
            snapshot.restore(),
            Err(PersistenceError::UnsupportedVersion { found: 99, .. })
        ));
    }
}
