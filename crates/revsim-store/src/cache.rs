//! Bounded LRU cache shared between worker threads.
//!
//! Each [`EntityCache`] owns one `lru::LruCache` behind its own mutex, so a
//! `get` or `put` is atomic with respect to every other caller of the same
//! cache. Two workers missing the same key may both scan and both `put`; the
//! later write wins and the cache stays consistent.

use crate::error::{Result, StoreError};
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Point-in-time counters of one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

#[derive(Debug)]
pub struct EntityCache<V> {
    name: &'static str,
    inner: Mutex<LruCache<String, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> EntityCache<V> {
    /// # Errors
    /// A capacity of zero is rejected.
    pub fn new(name: &'static str, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(StoreError::ZeroCapacity { cache: name })?;
        Ok(Self {
            name,
            inner: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Returns the cached value and marks `key` most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let value = self.lock().get(key).cloned();
        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// Inserts or replaces `key`, evicting the least recently used entry
    /// when the cache is full.
    pub fn put(&self, key: String, value: V) {
        let mut guard = self.lock();
        let replacing = guard.contains(key.as_str());
        if let Some((evicted, _)) = guard.push(key, value) {
            if !replacing {
                tracing::trace!(cache = self.name, key = %evicted, "evicted");
            }
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let guard = self.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: guard.len(),
            capacity: guard.cap().get(),
        }
    }

    // `get` and `put` never leave the map half-updated, so a poisoned lock
    // still guards a valid cache.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
