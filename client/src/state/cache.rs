//! Shared request cache kept consistent with the session.
//!
//! The cache is owned by the data-fetching layer; the session controller only
//! primes whole entries, marks them stale, or clears everything. It never
//! patches fields inside an entry.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Identity key of the cached current-user entry.
pub const USER_CACHE_KEY: &str = "user";

/// The controller's contract with the request cache.
pub trait RequestCache: Send + Sync {
    /// Replace the entry under `key` with a fresh value.
    fn prime(&self, key: &str, value: Value);

    /// Mark the entry under `key` stale so the next read refetches.
    fn invalidate(&self, key: &str);

    /// Drop every entry.
    fn clear(&self);
}

#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub value: Value,
    pub stale: bool,
}

/// In-memory keyed cache of JSON query results.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Fresh entry under `key` decoded as `T`. Stale or undecodable entries
    /// read as absent.
    #[must_use]
    pub fn get_fresh<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.get(key).filter(|e| !e.stale)?;
        serde_json::from_value(entry.value).ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl RequestCache for QueryCache {
    fn prime(&self, key: &str, value: Value) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), CacheEntry { value, stale: false });
    }

    fn invalidate(&self, key: &str) {
        if let Some(entry) = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(key)
        {
            entry.stale = true;
        }
    }

    fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
