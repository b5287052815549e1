//! Snapshot Manager
//!
//! Reads and writes codec output at a fixed path.
//!
//! Writes are a direct create-and-write, not write-then-rename: a crash in
//! the middle of `persist` can leave a truncated file, which the next `load`
//! reports as a decode or compression error.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::Entry;
use crate::error::{Result, SnapshotError};
use crate::snapshot::{codec, SnapshotFile, TypeRegistry};

/// File name used when a snapshot directory rather than a file is configured
pub const SNAPSHOT_FILE_NAME: &str = "mtstorage.dat";

// == Snapshot Manager ==
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    path: PathBuf,
    registry: Arc<TypeRegistry>,
}

impl SnapshotManager {
    pub fn new(path: impl Into<PathBuf>, registry: Arc<TypeRegistry>) -> Self {
        Self {
            path: path.into(),
            registry,
        }
    }

    /// Places the snapshot at `dir/mtstorage.dat`.
    pub fn in_dir(dir: impl AsRef<Path>, registry: Arc<TypeRegistry>) -> Self {
        Self::new(dir.as_ref().join(SNAPSHOT_FILE_NAME), registry)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Persist ==
    /// Encodes `value` and writes it, creating missing parent directories.
    pub fn persist<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let bytes = codec::encode(value)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SnapshotError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&self.path, &bytes).map_err(|source| SnapshotError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }

    // == Load ==
    /// Reads and decodes the snapshot. A missing file is `SnapshotError::Missing`.
    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = fs::read(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => SnapshotError::Missing(self.path.clone()),
            _ => SnapshotError::Io {
                path: self.path.clone(),
                source,
            },
        })?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot read");
        codec::decode(&bytes)
    }

    // == Store Entries ==
    /// Persists a copy of the store's mapping. Returns the number of entries
    /// written.
    pub fn persist_entries(&self, entries: &HashMap<String, Entry>) -> Result<usize> {
        let file = SnapshotFile::from_entries(entries, &self.registry)?;
        self.persist(&file)?;
        Ok(file.entries.len())
    }

    /// Loads a mapping previously written by `persist_entries`.
    pub fn load_entries(&self) -> Result<HashMap<String, Entry>> {
        let file: SnapshotFile = self.load()?;
        file.into_entries(&self.registry)
    }
}
