//! TTL Store - demonstration daemon
//!
//! Runs a store configured from environment variables until interrupted,
//! then writes the final snapshot.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_store::{Config, MemoryTtlStore, TypeRegistry};

const LAST_START_KEY: &str = "last_start";

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Start the store, restoring the previous snapshot if configured
/// 4. Record this start so the next run can restore it
/// 5. Wait for SIGINT/SIGTERM, then stop and persist
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: sweep_interval={:?}, default_ttl={:?}, snapshot_path={:?}, snapshot_interval={:?}",
        config.sweep_interval, config.default_ttl, config.snapshot_path, config.snapshot_interval
    );

    let registry = TypeRegistry::new()
        .with::<String>("string")
        .context("registering snapshot types")?;
    let store = MemoryTtlStore::start_with_registry(config, registry).await;

    match store.get_as::<String>(LAST_START_KEY) {
        Some(previous) => info!("Previous run started at {}", previous),
        None => info!("No record of a previous run"),
    }
    store.add(
        LAST_START_KEY,
        chrono::Utc::now().to_rfc3339(),
        Some(Duration::from_secs(24 * 60 * 60)),
    );

    shutdown_signal().await?;

    store.stop().await.context("writing final snapshot")?;
    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("installing Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("installing SIGTERM handler")?
            .recv()
            .await;
        Ok::<(), anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<anyhow::Result<()>>();

    tokio::select! {
        result = ctrl_c => {
            result?;
            info!("Received Ctrl+C, initiating shutdown...");
        }
        result = terminate => {
            result?;
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
    Ok(())
}
