//! Run configuration
//!
//! Loaded from a YAML file. Every field has a default, so an empty file
//! (or no file at all) describes a run over `./conferences.csv`,
//! `./journals.csv` and `./friendships.csv` with an in-memory store.
//!
//! ```yaml
//! data_dir: files
//! store_path: data/graph.snapshot
//! result_log: results.log
//! queries:
//!   - { query: q2, conference: SRDS }
//!   - { query: q4, journal: KSII, volume: 8 }
//! ```

use crate::ingest::FeedPaths;
use crate::query::PatternQuery;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// File names of the three feeds, relative to `data_dir`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedFiles {
    pub conferences: String,
    pub journals: String,
    pub friendships: String,
}

impl Default for FeedFiles {
    fn default() -> Self {
        Self {
            conferences: "conferences.csv".to_string(),
            journals: "journals.csv".to_string(),
            friendships: "friendships.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub feeds: FeedFiles,
    /// Snapshot file; `None` keeps the graph in memory only
    pub store_path: Option<PathBuf>,
    pub result_log: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Executed in order by `run`
    pub queries: Vec<PatternQuery>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            feeds: FeedFiles::default(),
            store_path: None,
            result_log: PathBuf::from("results.log"),
            log_level: "info".to_string(),
            queries: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Read and validate a YAML config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        // serde_yaml rejects an empty document for a struct
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let feeds = [
            ("conferences", &self.feeds.conferences),
            ("journals", &self.feeds.journals),
            ("friendships", &self.feeds.friendships),
        ];
        for (name, file) in feeds {
            if file.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("feeds.{} must not be empty", name)));
            }
        }
        if self.result_log.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("result_log must not be empty".to_string()));
        }
        if let Some(store) = &self.store_path {
            if store.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("store_path must not be empty when set".to_string()));
            }
        }
        Ok(())
    }

    /// Full paths of the three feeds
    pub fn feed_paths(&self) -> FeedPaths {
        FeedPaths {
            conferences: self.data_dir.join(&self.feeds.conferences),
            journals: self.data_dir.join(&self.feeds.journals),
            friendships: self.data_dir.join(&self.feeds.friendships),
        }
    }
}
