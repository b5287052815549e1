//! Snapshot Module
//!
//! Best-effort persistence of the store: serialize, compress, write; and
//! the reverse at startup. Not a write-ahead log.

pub mod codec;
mod manager;
mod record;
mod registry;

pub use manager::{SnapshotManager, SNAPSHOT_FILE_NAME};
pub use record::{SnapshotFile, SnapshotRecord, SNAPSHOT_VERSION};
pub use registry::{TaggedValue, TypeRegistry};
