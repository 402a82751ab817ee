//! Cookie store capability: string key/value entries with rolling TTL.
//!
//! The decision engine persists the session record through this trait rather
//! than through ambient document state, so tests and the simulator can run
//! against an in-memory substitute. Time is an explicit `now_ms` argument on
//! every call; the crate never reads a wall clock itself.
//!
//! Expiration is lazy: entries past their deadline simply read as absent.
//! An empty value behaves like the browser — writing `""` removes the entry,
//! and reading never returns an empty string.

use std::collections::HashMap;
use std::sync::Mutex;

/// String key/value storage with per-entry TTL.
///
/// `now_ms` is milliseconds on whatever monotonic-enough timeline the host
/// drives; only differences matter.
pub trait CookieStore: Send + Sync {
    /// Read an entry. Absent, expired, and empty entries all return `None`.
    fn get(&self, key: &str, now_ms: u64) -> Option<String>;

    /// Write an entry with a TTL measured from `now_ms`. Writing an empty
    /// value removes the entry.
    fn set(&self, key: &str, value: &str, ttl_ms: u64, now_ms: u64);

    /// Remove an entry.
    fn delete(&self, key: &str);
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at_ms: u64,
}

/// In-memory cookie store with lazy TTL expiration.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCookieStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self, now_ms: u64) -> usize {
        let entries = self.entries.lock().expect("store mutex poisoned");
        entries
            .values()
            .filter(|entry| entry.expires_at_ms > now_ms)
            .count()
    }

    /// Whether the store holds no live entries.
    #[must_use]
    pub fn is_empty(&self, now_ms: u64) -> bool {
        self.len(now_ms) == 0
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, key: &str, now_ms: u64) -> Option<String> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at_ms > now_ms => Some(entry.value.clone()),
            Some(_) => {
                // Lapsed: purge on read.
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: &str, ttl_ms: u64, now_ms: u64) {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        if value.is_empty() {
            entries.remove(key);
            return;
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at_ms: now_ms.saturating_add(ttl_ms),
            },
        );
    }

    fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.remove(key);
    }
}

/// Store that models cookies being disabled: reads are always absent and
/// writes are dropped.
///
/// Callers must never assume a write succeeded; this store makes that
/// assumption fail immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCookieStore;

impl CookieStore for DisabledCookieStore {
    fn get(&self, _key: &str, _now_ms: u64) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str, _ttl_ms: u64, _now_ms: u64) {}

    fn delete(&self, _key: &str) {}
}
