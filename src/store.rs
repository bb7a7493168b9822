//! Measurement ID Store
//!
//! The only state that survives between runs: a JSON object mapping each
//! logical source to its `[traceroute_id, dns_id]` pair. Entries keep their
//! file order and new ones are appended; an existing pair is never replaced.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Platform-assigned identifiers for one source's submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, u64)", into = "(u64, u64)")]
pub struct MeasurementPair {
    pub traceroute_id: u64,
    pub dns_id: u64,
}

impl MeasurementPair {
    pub fn new(traceroute_id: u64, dns_id: u64) -> Self {
        Self {
            traceroute_id,
            dns_id,
        }
    }
}

impl From<(u64, u64)> for MeasurementPair {
    fn from((traceroute_id, dns_id): (u64, u64)) -> Self {
        Self::new(traceroute_id, dns_id)
    }
}

impl From<MeasurementPair> for (u64, u64) {
    fn from(pair: MeasurementPair) -> Self {
        (pair.traceroute_id, pair.dns_id)
    }
}

/// Logical source -> measurement pair, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdStore {
    entries: IndexMap<String, MeasurementPair>,
}

impl IdStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the store at `path`; a missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No ID store at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let store: Self =
            serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Loaded {} entries from {}", store.len(), path.display());
        Ok(store)
    }

    /// Overwrite `path` with the whole store.
    ///
    /// Written to a sibling temp file, flushed, then renamed over the target.
    /// The temp file is removed if any step fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let tmp = temp_path(path);

        if let Err(e) = self.write_and_replace(&tmp, path) {
            if tmp.exists() {
                if let Err(cleanup) = fs::remove_file(&tmp) {
                    warn!("Failed to remove {}: {}", tmp.display(), cleanup);
                }
            }
            return Err(e);
        }

        debug!("Saved {} entries to {}", self.len(), path.display());
        Ok(())
    }

    fn write_and_replace(&self, tmp: &Path, path: &Path) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(tmp).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| {
            StoreError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
        let file = writer
            .into_inner()
            .map_err(|e| io_err(e.into_error()))?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(tmp, path).map_err(io_err)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn get(&self, source: &str) -> Option<MeasurementPair> {
        self.entries.get(source).copied()
    }

    /// Append a pair for a source not yet tracked.
    ///
    /// Returns `false` and leaves the store untouched if the source exists.
    pub fn insert_new(&mut self, source: impl Into<String>, pair: MeasurementPair) -> bool {
        let source = source.into();
        if self.entries.contains_key(&source) {
            return false;
        }
        self.entries.insert(source, pair);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, MeasurementPair)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, MeasurementPair)> for IdStore {
    fn from_iter<I: IntoIterator<Item = (String, MeasurementPair)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (source, pair) in iter {
            store.insert_new(source, pair);
        }
        store
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "ids".into());
    name.push(".tmp");
    path.with_file_name(name)
}
