//! Run configuration.
//!
//! Each pass has its own configuration struct. They all implement [Default]
//! and [serde::Deserialize], so that a (partial) JSON file can be loaded with
//! [load] and then overridden by command line flags.
use std::{fs::File, io::BufReader, path::Path};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Error;

/// How rows are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Write rows as they come, committing every `commit_every` checkpoints.
    Incremental { commit_every: usize },
    /// Keep every row in memory and write them in a single transaction at the end.
    Bulk,
}

impl Default for WriteMode {
    fn default() -> Self {
        WriteMode::Incremental { commit_every: 1000 }
    }
}

/// What to do with partially overlapping spans once contained spans are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Keep every maximal span, even if it partially overlaps another one.
    #[default]
    KeepPartial,
    /// Keep the leftmost span, then the longest one, dropping anything overlapping it.
    LeftmostLongest,
}

/// Context window cropping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropMode {
    #[default]
    Tokens,
    Sentences,
}

/// Where the mention pass reads the link graph from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphStorage {
    /// Load every edge in memory before matching. Fastest.
    #[default]
    Memory,
    /// Query the database for each page, one connection per busy worker.
    Database,
}

/// Link graph pass configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub write_mode: WriteMode,
    pub max_pages: Option<usize>,
    pub progress_every: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            write_mode: WriteMode::Incremental {
                commit_every: 10_000,
            },
            max_pages: None,
            progress_every: 100_000,
        }
    }
}

/// Mention extraction pass configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionConfig {
    /// Number of worker threads. `None` means "available cores minus one".
    pub workers: Option<usize>,
    pub write_mode: WriteMode,
    pub max_pages: Option<usize>,
    /// Radius (in characters) of the debug context stored along each match.
    pub debug_radius: usize,
    pub overlap_policy: OverlapPolicy,
    pub graph_storage: GraphStorage,
    /// Number of page results that can wait for the coordinator.
    pub channel_capacity: usize,
    pub progress_every: usize,
}

impl MentionConfig {
    /// Effective worker count. Leaves one core to the coordinator.
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| rayon::current_num_threads().saturating_sub(1))
            .max(1)
    }
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            workers: None,
            write_mode: WriteMode::Incremental { commit_every: 1000 },
            max_pages: None,
            debug_radius: 40,
            overlap_policy: OverlapPolicy::default(),
            graph_storage: GraphStorage::default(),
            channel_capacity: 1024,
            progress_every: 10_000,
        }
    }
}

/// Context derivation pass configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Radius (in characters) of the raw window around a mention.
    pub radius: usize,
    pub crop: CropMode,
    pub mask_char: char,
    /// Maximum number of contexts derived per entity. `None` means all matches.
    pub contexts_per_entity: Option<usize>,
    /// Seed used to sample matches when `contexts_per_entity` is set.
    pub seed: u64,
    pub overlap_policy: OverlapPolicy,
    pub write_mode: WriteMode,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            radius: 250,
            crop: CropMode::default(),
            mask_char: '#',
            contexts_per_entity: None,
            seed: 42,
            overlap_policy: OverlapPolicy::default(),
            write_mode: WriteMode::Incremental { commit_every: 100 },
        }
    }
}

/// Load a configuration from a JSON file. Missing fields take their default value.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    if !path.exists() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let f = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(f)?)
}
