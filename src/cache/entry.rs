//! Cache Entry Module
//!
//! Defines a single stored record: an opaque value plus its expiry metadata.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::Value;

// == Entry ==
/// A stored value with the TTL it was written with.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The stored value, opaque to the store
    pub content: Value,
    /// Expiration timestamp (Unix milliseconds)
    pub expire_at: i64,
    /// Duration used to compute `expire_at`, reapplied on refresh
    pub ttl: Duration,
}

impl Entry {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    pub fn new(content: Value, ttl: Duration) -> Self {
        Self::with_expiry(content, ttl, current_timestamp_ms())
    }

    /// Creates an entry that expires `ttl` after `now_ms`.
    pub fn with_expiry(content: Value, ttl: Duration, now_ms: i64) -> Self {
        Self {
            content,
            expire_at: now_ms.saturating_add(duration_ms(ttl)),
            ttl,
        }
    }

    // == Refresh ==
    /// Pushes the expiry to `ttl` from now, using the entry's own TTL.
    pub fn refresh(&mut self) {
        self.expire_at = current_timestamp_ms().saturating_add(duration_ms(self.ttl));
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches `expire_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Checks expiry against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expire_at
    }

    /// Absolute expiry as a UTC timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expire_at)
    }

    // == Time To Live ==
    /// Returns remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        let remaining = self.expire_at - current_timestamp_ms();
        if remaining > 0 {
            Duration::from_millis(remaining as u64)
        } else {
            Duration::ZERO
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Converts a duration to whole milliseconds, saturating at `i64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
