//! Error types for snapshot persistence
//!
//! Store operations never fail; everything that touches the codec or the
//! filesystem reports a `SnapshotError`.

use std::path::PathBuf;

use thiserror::Error;

// == Snapshot Error Enum ==
/// Unified error type for encoding, decoding and persisting snapshots.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// No snapshot file exists at the configured path
    #[error("No prior snapshot at {}", .0.display())]
    Missing(PathBuf),

    /// Filesystem failure while reading or writing a snapshot
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Gzip stream could not be produced or is corrupt
    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),

    /// Value graph could not be serialized
    #[error("Encode error: {0}")]
    Encode(#[source] bincode::Error),

    /// Payload is truncated or does not match the destination shape
    #[error("Decode error: {0}")]
    Decode(#[source] bincode::Error),

    /// A stored value's concrete type has not been registered
    #[error("Unregistered type: {0}")]
    UnregisteredType(String),

    /// A tag or type was registered twice with conflicting bindings
    #[error("Duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// Snapshot envelope carries a version this build cannot read
    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    /// Background snapshot work panicked or was cancelled
    #[error("Snapshot task failed: {0}")]
    Task(String),
}

impl SnapshotError {
    /// Returns true when the error only means "first run, nothing to restore".
    pub fn is_missing(&self) -> bool {
        matches!(self, SnapshotError::Missing(_))
    }
}

impl From<tokio::task::JoinError> for SnapshotError {
    fn from(err: tokio::task::JoinError) -> Self {
        SnapshotError::Task(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;
