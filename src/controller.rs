//! Lifecycle Controller
//!
//! Wires a `Config` into a running store: restore from the last snapshot,
//! start the sweeper and the optional periodic snapshot task, and tear all
//! of it down again on `stop`.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::cache::{Store, Value};
use crate::config::Config;
use crate::error::Result;
use crate::snapshot::{SnapshotManager, TypeRegistry};
use crate::tasks::{persist_now, spawn_snapshotter, spawn_sweeper, BackgroundTasks};

// == Memory TTL Store ==
/// A running store and the background tasks that serve it.
///
/// Must be started inside a tokio runtime. Call `stop` to shut down and take
/// the final snapshot; dropping the handle stops the tasks but skips the
/// snapshot.
#[derive(Debug)]
pub struct MemoryTtlStore {
    store: Arc<Store>,
    snapshots: Option<SnapshotManager>,
    tasks: BackgroundTasks,
}

impl MemoryTtlStore {
    /// Starts a store with an empty type registry.
    ///
    /// With persistence enabled, only values of registered types can be
    /// snapshotted; use `start_with_registry` for anything else.
    pub async fn start(config: Config) -> Self {
        Self::start_with_registry(config, TypeRegistry::new()).await
    }

    pub async fn start_with_registry(config: Config, registry: TypeRegistry) -> Self {
        let config = config.resolved();
        let store = Arc::new(Store::new(config.default_ttl).with_logging(config.enable_logging));

        info!(
            sweep_interval_ms = config.sweep_interval.as_millis() as u64,
            default_ttl_ms = config.default_ttl.as_millis() as u64,
            persistence = config.snapshot_path.is_some(),
            "Creating TTL store"
        );

        let snapshots = config
            .snapshot_path
            .as_ref()
            .map(|path| SnapshotManager::new(path, Arc::new(registry)));

        if let Some(manager) = &snapshots {
            restore(&store, manager).await;
        }

        let mut tasks = BackgroundTasks::new();
        tasks.push(spawn_sweeper(
            store.clone(),
            config.sweep_interval,
            tasks.subscribe(),
            config.enable_logging,
        ));

        match (&snapshots, config.snapshot_interval) {
            (Some(manager), Some(interval)) => {
                tasks.push(spawn_snapshotter(
                    store.clone(),
                    manager.clone(),
                    interval,
                    tasks.subscribe(),
                ));
            }
            (None, Some(_)) => {
                warn!("Snapshot interval configured without a snapshot path; periodic snapshots disabled");
            }
            _ => {}
        }

        Self {
            store,
            snapshots,
            tasks,
        }
    }

    // == Store Operations ==
    /// Stores a value, replacing any previous entry for `key`.
    pub fn add<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T, ttl: Option<Duration>) {
        self.store.add(key, Arc::new(value), ttl);
    }

    /// Stores an already shared value.
    pub fn add_value(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        self.store.add(key, value, ttl);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    /// `get`, downcast to the concrete type. None if absent or of another type.
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.store.get(key).and_then(|value| value.downcast::<T>().ok())
    }

    pub fn refresh(&self, key: &str) -> Option<Value> {
        self.store.refresh(key)
    }

    pub fn delete(&self, key: &str) {
        self.store.delete(key);
    }

    pub fn set_default_ttl(&self, ttl: Duration) {
        self.store.set_default_ttl(ttl);
    }

    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.store.expires_at(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The underlying store, for callers that share it across threads.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    // == Stop ==
    /// Stops the background tasks, waits for them to exit, then writes a
    /// final snapshot if persistence is enabled.
    pub async fn stop(self) -> Result<()> {
        let Self {
            store,
            snapshots,
            tasks,
        } = self;

        tasks.shutdown().await;

        if let Some(manager) = snapshots {
            let count = persist_now(&store, &manager).await?;
            info!(entries = count, path = %manager.path().display(), "Final snapshot written");
        }

        info!("TTL store stopped");
        Ok(())
    }
}

/// Loads the last snapshot into `store`. Failures leave the store empty.
async fn restore(store: &Store, manager: &SnapshotManager) {
    let reader = manager.clone();
    let loaded = match tokio::task::spawn_blocking(move || reader.load_entries()).await {
        Ok(result) => result,
        Err(err) => Err(err.into()),
    };

    match loaded {
        Ok(entries) => {
            let total = entries.len();
            let kept = store.restore(entries);
            info!(
                restored = kept,
                expired = total.saturating_sub(kept),
                path = %manager.path().display(),
                "Restored snapshot"
            );
        }
        Err(err) if err.is_missing() => {
            info!(path = %manager.path().display(), "No prior snapshot, starting empty");
        }
        Err(err) => {
            warn!(error = %err, path = %manager.path().display(), "Unable to restore snapshot, starting empty");
        }
    }
}
