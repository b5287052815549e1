//! Snapshot file layout
//!
//! The on-disk envelope and per-entry record. Timestamps are written at
//! second resolution and rounded up, so a restored entry never expires
//! earlier than it would have in the process that wrote it.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{duration_ms, Entry};
use crate::error::{Result, SnapshotError};
use crate::snapshot::{TaggedValue, TypeRegistry};

/// Envelope version written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub version: u32,
    pub entries: HashMap<String, SnapshotRecord>,
}

/// One entry as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub content: TaggedValue,
    /// Unix seconds
    pub expire_at: i64,
    /// Seconds
    pub ttl: u64,
}

impl SnapshotRecord {
    pub fn from_entry(entry: &Entry, registry: &TypeRegistry) -> Result<Self> {
        Ok(Self {
            content: registry.encode_value(&entry.content)?,
            expire_at: ceil_div(entry.expire_at, 1000),
            ttl: ceil_div(duration_ms(entry.ttl), 1000).max(0) as u64,
        })
    }

    pub fn into_entry(self, registry: &TypeRegistry) -> Result<Entry> {
        Ok(Entry {
            content: registry.decode_value(&self.content)?,
            expire_at: self.expire_at.saturating_mul(1000),
            ttl: Duration::from_secs(self.ttl),
        })
    }
}

impl SnapshotFile {
    /// Tags every entry through the registry. Fails on the first value whose
    /// type is not registered.
    pub fn from_entries(entries: &HashMap<String, Entry>, registry: &TypeRegistry) -> Result<Self> {
        let entries = entries
            .iter()
            .map(|(key, entry)| {
                SnapshotRecord::from_entry(entry, registry).map(|record| (key.clone(), record))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            version: SNAPSHOT_VERSION,
            entries,
        })
    }

    pub fn into_entries(self, registry: &TypeRegistry) -> Result<HashMap<String, Entry>> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }

        self.entries
            .into_iter()
            .map(|(key, record)| record.into_entry(registry).map(|entry| (key, entry)))
            .collect()
    }
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    let quotient = value.div_euclid(divisor);
    if value.rem_euclid(divisor) > 0 {
        quotient + 1
    } else {
        quotient
    }
}
