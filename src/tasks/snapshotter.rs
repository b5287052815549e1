//! Periodic Snapshot Task
//!
//! Copies the store's mapping under the read lock, then encodes and writes
//! it on the blocking pool with no lock held.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::Store;
use crate::error::Result;
use crate::snapshot::SnapshotManager;

/// Writes one snapshot of `store`. Returns the number of entries written.
pub async fn persist_now(store: &Store, manager: &SnapshotManager) -> Result<usize> {
    let entries = store.snapshot();
    let manager = manager.clone();
    tokio::task::spawn_blocking(move || manager.persist_entries(&entries)).await?
}

/// Spawns a background task that persists the store every `interval`.
///
/// A failed write is logged and retried on the next tick.
pub fn spawn_snapshotter(
    store: Arc<Store>,
    manager: SnapshotManager,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            path = %manager.path().display(),
            "Starting periodic snapshot task"
        );

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Snapshot task received shutdown signal");
                        break;
                    }
                    continue;
                }
            }

            match persist_now(&store, &manager).await {
                Ok(count) => debug!(entries = count, "Periodic snapshot written"),
                Err(err) => warn!(error = %err, "Periodic snapshot failed"),
            }
        }

        info!("Periodic snapshot task stopped");
    })
}
