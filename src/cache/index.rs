//! Reverse index from secret path to dependent cache entries
//!
//! Loaded once per process and rewritten whole after each mutation.
//! Mutations only change the in-memory view until `persist` is called.
//!
//! There is no cross-process locking: two invocations that both update
//! the index race, and the last `persist` wins. Entries lost that way
//! only cost targeted invalidation for the affected cache entries.
//!
//! The file is bincode, which carries no schema of its own. A leading
//! `version` field stands in for that: a file whose version is unknown
//! is treated like a corrupt one and the index starts empty.

use crate::error::{PassEnvError, PassEnvResult};
use crate::secrets::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, warn};

/// On-disk format version
const INDEX_VERSION: u32 = 1;

/// Serialized form of the index file
#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    dependents: BTreeMap<String, BTreeSet<Fingerprint>>,
}

/// Secret path -> fingerprints of cache entries built from it
#[derive(Debug, Clone)]
pub struct DependencyIndex {
    path: PathBuf,
    dependents: BTreeMap<String, BTreeSet<Fingerprint>>,
}

impl DependencyIndex {
    /// Create an empty index that persists to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dependents: BTreeMap::new(),
        }
    }

    /// Load the index at `path`
    ///
    /// A missing or empty file is an empty index. An unreadable or
    /// corrupt file is logged and also yields an empty index.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No index at {}, starting empty", path.display());
                return Self::empty(path);
            }
            Err(e) => {
                warn!(
                    "Unable to read index {}, clearing cache by pass name is unavailable: {}",
                    path.display(),
                    e
                );
                return Self::empty(path);
            }
        };

        if data.is_empty() {
            return Self::empty(path);
        }

        match decode(&data) {
            Ok(dependents) => {
                debug!("Loaded index with {} pass name(s)", dependents.len());
                Self { path, dependents }
            }
            Err(e) => {
                warn!(
                    "The index file is corrupt, this is not a big issue, you just won't be able to clear cache based on pass names: {}",
                    e
                );
                Self::empty(path)
            }
        }
    }

    /// Union of fingerprints depending on any of `secret_paths`
    pub fn dependents<S: AsRef<str>>(&self, secret_paths: &[S]) -> BTreeSet<Fingerprint> {
        secret_paths
            .iter()
            .filter_map(|p| self.dependents.get(p.as_ref()))
            .flatten()
            .cloned()
            .collect()
    }

    /// Record that `fingerprint` was built from each of `secret_paths`
    pub fn update<S: AsRef<str>>(&mut self, fingerprint: &Fingerprint, secret_paths: &[S]) {
        for path in secret_paths {
            self.dependents
                .entry(path.as_ref().to_string())
                .or_default()
                .insert(fingerprint.clone());
        }
    }

    /// Drop `secret_paths` from the index entirely
    pub fn remove<S: AsRef<str>>(&mut self, secret_paths: &[S]) {
        for path in secret_paths {
            self.dependents.remove(path.as_ref());
        }
    }

    /// Write the whole index to disk
    ///
    /// Writes a uniquely named temp file (mode 0600) next to the index and
    /// renames it over the index, so a crash mid-write leaves the previous
    /// index intact and concurrent writers never share a temp file.
    pub async fn persist(&self) -> PassEnvResult<()> {
        let data = bincode::serialize(&IndexFile {
            version: INDEX_VERSION,
            dependents: self.dependents.clone(),
        })?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &data))
            .await
            .map_err(|e| PassEnvError::Internal(format!("index write task failed: {}", e)))??;

        debug!("Wrote index {}", self.path.display());
        Ok(())
    }

    /// Iterate `(secret path, dependents)` ordered by path
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<Fingerprint>)> {
        self.dependents.iter().map(|(p, fps)| (p.as_str(), fps))
    }

    /// Number of secret paths tracked
    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    /// Whether no secret paths are tracked
    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }

    /// Location of the index file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn replace_file(path: &Path, data: &[u8]) -> PassEnvResult<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| PassEnvError::io(format!("creating temp file in {}", dir.display()), e))?;
    tmp.write_all(data)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| PassEnvError::io(format!("writing index {}", tmp.path().display()), e))?;

    tmp.persist(path)
        .map_err(|e| PassEnvError::io(format!("replacing index {}", path.display()), e.error))?;
    Ok(())
}

fn decode(data: &[u8]) -> PassEnvResult<BTreeMap<String, BTreeSet<Fingerprint>>> {
    let file: IndexFile = bincode::deserialize(data)?;
    if file.version != INDEX_VERSION {
        return Err(PassEnvError::Internal(format!(
            "unsupported index version {}",
            file.version
        )));
    }
    Ok(file.dependents)
}
