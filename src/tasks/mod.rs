//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a store is live.
//!
//! # Tasks
//! - TTL Sweep: Removes expired entries at the configured interval
//! - Periodic Snapshot: Persists the store at the configured interval

mod snapshotter;
mod sweeper;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

pub use snapshotter::{persist_now, spawn_snapshotter};
pub use sweeper::spawn_sweeper;

// == Background Tasks ==
/// Owns the shutdown signal and join handles of a store's background tasks.
///
/// Dropping the set signals the tasks to exit without waiting for them.
#[derive(Debug)]
pub struct BackgroundTasks {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    /// Receiver to hand to a task spawned into this set.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    pub fn push(&mut self, handle: JoinHandle<()>) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Signals every task and waits until all of them have exited.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);

        for handle in std::mem::take(&mut self.handles) {
            if let Err(err) = handle.await {
                warn!(error = %err, "Background task ended abnormally");
            }
        }
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}
