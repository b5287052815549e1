//! TTL Store - An in-process key/value store with automatic expiry
//!
//! Every entry carries a time-to-live and is evicted once it expires. Store
//! contents can optionally survive restarts through compressed snapshots.
//!
//! ```ignore
//! let config = Config::default().with_snapshot_path("/var/lib/app/mtstorage.dat");
//! let registry = TypeRegistry::new().with::<Session>("session")?;
//! let store = MemoryTtlStore::start_with_registry(config, registry).await;
//!
//! store.add("user:1", Session::new(), Some(Duration::from_secs(30)));
//! let session = store.get_as::<Session>("user:1");
//!
//! store.stop().await?;
//! ```

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod snapshot;
pub mod tasks;

pub use cache::{Entry, Store, Value};
pub use config::Config;
pub use controller::MemoryTtlStore;
pub use error::SnapshotError;
pub use snapshot::{SnapshotManager, TypeRegistry};
