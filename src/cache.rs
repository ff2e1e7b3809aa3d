//! Validation result cache.
//!
//! Entries are never shared between edge locations; each one validates a
//! token independently. Hosts pick the store through [`ValidationCache`].

use std::collections::HashMap;
use std::sync::Mutex;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac_sha256::Hash;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub valid: bool,
    /// Unix seconds after which the entry must not be returned.
    pub expires_at: u64,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: u64) -> bool {
        now <= self.expires_at
    }

    /// Seconds a store should keep the entry, at least one.
    pub fn ttl_secs(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now).max(1)
    }
}

pub trait ValidationCache {
    /// Returns the entry for `key` unless it has expired as of `now`.
    fn get(&self, key: &str, now: u64) -> Option<CacheEntry>;

    /// Stores `entry`, replacing any previous one.
    fn put(&self, key: &str, entry: CacheEntry);
}

/// Cache key for a bearer token, so raw tokens are never kept as keys.
pub fn fingerprint(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Hash::hash(token.as_bytes()))
}

/// Process-local cache backed by a HashMap. No capacity limit; expired
/// entries are dropped when read.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ValidationCache for InMemoryCache {
    fn get(&self, key: &str, now: u64) -> Option<CacheEntry> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if !entry.is_fresh(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(*entry),
            None => None,
        }
    }

    fn put(&self, key: &str, entry: CacheEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), entry);
        }
    }
}

/// Never remembers anything.
#[derive(Debug, Default)]
pub struct NoopCache;

impl ValidationCache for NoopCache {
    fn get(&self, _key: &str, _now: u64) -> Option<CacheEntry> {
        None
    }

    fn put(&self, _key: &str, _entry: CacheEntry) {}
}
