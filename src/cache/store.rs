//! Cache Store Module
//!
//! HashMap storage behind a reader/writer lock, with read-time expiry checks
//! and a bulk sweep used by the background sweeper.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::cache::{current_timestamp_ms, Entry, Value};

// == Store ==
/// Concurrency-safe key/value storage where every entry carries a TTL.
///
/// All methods take `&self`; share the store between threads with an `Arc`.
#[derive(Debug)]
pub struct Store {
    /// Key-value storage
    entries: RwLock<HashMap<String, Entry>>,
    /// Default TTL in milliseconds for entries without explicit TTL
    default_ttl_ms: AtomicU64,
    /// Emit per-operation debug logs
    log_operations: bool,
}

impl Store {
    // == Constructor ==
    /// Creates an empty store with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl_ms: AtomicU64::new(ttl_to_ms(default_ttl)),
            log_operations: false,
        }
    }

    /// Enables or disables per-operation debug logging.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_operations = enabled;
        self
    }

    // == Add ==
    /// Stores a value, replacing any previous entry for `key`.
    ///
    /// The entry expires `ttl` from now, or the default TTL if `ttl` is None.
    pub fn add(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or_else(|| self.default_ttl());
        let entry = Entry::new(value, ttl);

        if self.log_operations {
            debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "add");
        }

        self.entries.write().insert(key, entry);
    }

    // == Get ==
    /// Returns the value if the key exists and has not expired.
    ///
    /// Never touches the entry's expiry. Expired records still awaiting the
    /// sweeper are reported as absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.content.clone())
    }

    // == Refresh ==
    /// Like `get`, but on a hit restarts the entry's TTL from now.
    ///
    /// A missing key is left missing. An expired record is removed.
    pub fn refresh(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.write();

        match entries.get_mut(key) {
            None => return None,
            Some(entry) if !entry.is_expired() => {
                entry.refresh();
                if self.log_operations {
                    debug!(key = %key, expire_at = entry.expire_at, "refresh");
                }
                return Some(entry.content.clone());
            }
            Some(_) => {}
        }

        entries.remove(key);
        None
    }

    // == Delete ==
    /// Removes an entry by key. Deleting an absent key is a no-op.
    pub fn delete(&self, key: &str) {
        let removed = self.entries.write().remove(key).is_some();
        if self.log_operations {
            debug!(key = %key, removed, "delete");
        }
    }

    // == Default TTL ==
    /// Changes the TTL used by future `add` calls without an override.
    pub fn set_default_ttl(&self, ttl: Duration) {
        self.default_ttl_ms.store(ttl_to_ms(ttl), Ordering::Relaxed);
        if self.log_operations {
            debug!(ttl_ms = ttl.as_millis() as u64, "default TTL updated");
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms.load(Ordering::Relaxed))
    }

    // == Expiry Inspection ==
    /// Absolute expiry of a live entry.
    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(Entry::expires_at)
    }

    /// Remaining lifetime of a live entry.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(Entry::ttl_remaining)
    }

    // == Sweep Expired ==
    /// Removes every entry whose expiry is at or before now.
    ///
    /// Uses one clock reading for the whole pass. Returns the number of
    /// entries removed.
    pub fn sweep_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write();
        let before = entries.len();

        entries.retain(|key, entry| {
            let keep = !entry.is_expired_at(now);
            if !keep && self.log_operations {
                debug!(key = %key, "sweeping expired entry");
            }
            keep
        });

        before - entries.len()
    }

    // == Snapshot / Restore ==
    /// Copies the whole mapping out under the read lock.
    ///
    /// Values are reference counted, so the copy does not clone content.
    pub fn snapshot(&self) -> HashMap<String, Entry> {
        self.entries.read().clone()
    }

    /// Inserts restored entries, skipping any that have already expired.
    ///
    /// Returns the number of entries kept.
    pub fn restore(&self, restored: HashMap<String, Entry>) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write();
        let before = entries.len();

        entries.extend(
            restored
                .into_iter()
                .filter(|(_, entry)| !entry.is_expired_at(now)),
        );

        entries.len() - before
    }

    // == Length ==
    /// Returns the number of stored records, including expired records
    /// not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn ttl_to_ms(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread::sleep;

    const DEFAULT: Duration = Duration::from_secs(300);

    fn value(s: &str) -> Value {
        Arc::new(s.to_string())
    }

    fn as_str(v: Option<Value>) -> Option<String> {
        v.and_then(|v| v.downcast_ref::<String>().cloned())
    }

    #[test]
    fn test_store_new() {
        let store = Store::new(DEFAULT);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.default_ttl(), DEFAULT);
    }

    #[test]
    fn test_store_add_and_get() {
        let store = Store::new(DEFAULT);

        store.add("key1", value("value1"), None);

        assert_eq!(as_str(store.get("key1")), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = Store::new(DEFAULT);
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_delete() {
        let store = Store::new(DEFAULT);

        store.add("key1", value("value1"), None);
        store.delete("key1");

        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_delete_is_idempotent() {
        let store = Store::new(DEFAULT);

        store.delete("nonexistent");
        store.add("key1", value("value1"), None);
        store.delete("key1");
        store.delete("key1");

        assert!(store.get("key1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_overwrite() {
        let store = Store::new(DEFAULT);

        store.add("key1", value("value1"), None);
        store.add("key1", value("value2"), None);

        assert_eq!(as_str(store.get("key1")), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = Store::new(DEFAULT);

        store.add("key1", value("value1"), Some(Duration::from_secs(1)));
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(1100));

        // Not yet swept, but no longer visible
        assert_eq!(store.len(), 1);
        assert!(store.get("key1").is_none());
        assert!(store.expires_at("key1").is_none());
    }

    #[test]
    fn test_get_does_not_change_expiry() {
        let store = Store::new(DEFAULT);
        store.add("key1", value("value1"), None);

        let first = store.expires_at("key1");
        store.get("key1");
        let second = store.expires_at("key1");

        assert!(first.is_some());
        assert_eq!(first, second);

        let remaining = store.ttl_remaining("key1").unwrap();
        assert!(remaining <= DEFAULT && remaining > DEFAULT - Duration::from_secs(1));
    }

    #[test]
    fn test_refresh_resets_clock() {
        let store = Store::new(DEFAULT);
        store.add("key1", value("value1"), Some(Duration::from_millis(1000)));

        sleep(Duration::from_millis(600));
        assert_eq!(as_str(store.refresh("key1")), Some("value1".to_string()));

        // 1200ms after add, 600ms after refresh
        sleep(Duration::from_millis(600));
        assert_eq!(as_str(store.get("key1")), Some("value1".to_string()));
    }

    #[test]
    fn test_refresh_missing_key_does_not_insert() {
        let store = Store::new(DEFAULT);

        assert!(store.refresh("ghost").is_none());
        assert!(store.is_empty());
        assert!(store.get("ghost").is_none());
    }

    #[test]
    fn test_refresh_expired_entry_reports_missing() {
        let store = Store::new(DEFAULT);
        store.add("key1", value("value1"), Some(Duration::from_millis(50)));

        sleep(Duration::from_millis(100));

        assert!(store.refresh("key1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_default_ttl_only_affects_new_entries() {
        let store = Store::new(Duration::from_secs(100));
        store.add("old", value("a"), None);

        store.set_default_ttl(Duration::from_millis(50));
        store.add("new", value("b"), None);

        sleep(Duration::from_millis(100));

        assert!(store.get("old").is_some());
        assert!(store.get("new").is_none());
        assert_eq!(store.default_ttl(), Duration::from_millis(50));
    }

    #[test]
    fn test_store_sweep_expired() {
        let store = Store::new(DEFAULT);

        store.add("key1", value("value1"), Some(Duration::from_millis(50)));
        store.add("key2", value("value2"), Some(Duration::from_secs(10)));
        let key2_expiry = store.expires_at("key2");

        sleep(Duration::from_millis(100));

        let removed = store.sweep_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
        assert_eq!(store.expires_at("key2"), key2_expiry);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = Store::new(DEFAULT);
        store.add("key1", value("value1"), None);

        let snapshot = store.snapshot();
        store.delete("key1");

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("key1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_restore_skips_expired_entries() {
        let store = Store::new(DEFAULT);
        let now = current_timestamp_ms();

        let mut restored = HashMap::new();
        restored.insert(
            "live".to_string(),
            Entry::with_expiry(value("a"), Duration::from_secs(60), now),
        );
        restored.insert(
            "dead".to_string(),
            Entry::with_expiry(value("b"), Duration::from_secs(1), now - 5_000),
        );

        assert_eq!(store.restore(restored), 1);
        assert_eq!(as_str(store.get("live")), Some("a".to_string()));
        assert!(store.get("dead").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        let store = Arc::new(Store::new(DEFAULT));

        let handles: Vec<_> = (0..8i32)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let key = format!("key{}", i % 16);
                        store.add(key.clone(), Arc::new(t * 1000 + i), None);
                        store.get(&key);
                        store.refresh(&key);
                        if i % 7 == 0 {
                            store.delete(&key);
                        }
                        store.sweep_expired();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(store.len() <= 16);
        for (_, entry) in store.snapshot() {
            assert!(entry.content.downcast_ref::<i32>().is_some());
        }
    }
}
