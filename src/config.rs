//! Configuration Module
//!
//! Handles loading and resolving store configuration, from code or from
//! environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default interval between expiry sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Default TTL applied when `add` has no override
pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

/// Store configuration parameters.
///
/// Setting `snapshot_path` enables persistence at startup and shutdown;
/// `snapshot_interval` additionally enables periodic snapshots.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interval between background expiry sweeps
    pub sweep_interval: Duration,
    /// TTL for entries added without an explicit TTL
    pub default_ttl: Duration,
    /// Emit per-operation debug logs
    pub enable_logging: bool,
    /// Snapshot file location, None = persistence disabled
    pub snapshot_path: Option<PathBuf>,
    /// Interval between periodic snapshots, None = shutdown only
    pub snapshot_interval: Option<Duration>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 1)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 10)
    /// - `ENABLE_LOGGING` - `true` or `1` to log every operation (default: false)
    /// - `SNAPSHOT_PATH` - Snapshot file path (default: unset)
    /// - `SNAPSHOT_INTERVAL` - Periodic snapshot frequency in seconds (default: unset)
    pub fn from_env() -> Self {
        Self {
            sweep_interval: env_secs("SWEEP_INTERVAL").unwrap_or(DEFAULT_SWEEP_INTERVAL),
            default_ttl: env_secs("DEFAULT_TTL").unwrap_or(DEFAULT_TTL),
            enable_logging: env::var("ENABLE_LOGGING")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
                .unwrap_or(false),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            snapshot_interval: env_secs("SNAPSHOT_INTERVAL"),
        }
        .resolved()
    }

    /// Replaces zero durations with their defaults.
    ///
    /// A zero periodic-snapshot interval disables periodic snapshots.
    pub fn resolved(mut self) -> Self {
        if self.sweep_interval.is_zero() {
            self.sweep_interval = DEFAULT_SWEEP_INTERVAL;
        }
        if self.default_ttl.is_zero() {
            self.default_ttl = DEFAULT_TTL;
        }
        self.snapshot_interval = self.snapshot_interval.filter(|d| !d.is_zero());
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn with_snapshot_interval(mut self, interval: Duration) -> Self {
        self.snapshot_interval = Some(interval);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            default_ttl: DEFAULT_TTL,
            enable_logging: false,
            snapshot_path: None,
            snapshot_interval: None,
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
