//! TTL Sweeper Task
//!
//! Background task that periodically removes expired entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::Store;

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// Each tick takes the store's write lock for one pass over the mapping.
/// The task exits as soon as `true` is sent on `shutdown` or the sender is
/// dropped; await the returned handle to know it has finished.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Store::new(Duration::from_secs(10)));
/// let (tx, rx) = watch::channel(false);
/// let handle = spawn_sweeper(store.clone(), Duration::from_secs(1), rx, false);
/// // Later, during shutdown:
/// tx.send(true).ok();
/// handle.await.ok();
/// ```
pub fn spawn_sweeper(
    store: Arc<Store>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    log_sweeps: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting TTL sweeper");

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("TTL sweeper received shutdown signal");
                        break;
                    }
                    continue;
                }
            }

            let removed = store.sweep_expired();

            if log_sweeps {
                if removed > 0 {
                    debug!(removed, remaining = store.len(), "TTL sweep removed expired entries");
                } else {
                    debug!("TTL sweep: no expired entries found");
                }
            }
        }

        info!("TTL sweeper stopped");
    })
}
