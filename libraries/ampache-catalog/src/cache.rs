//! Bounded record cache
//!
//! Strict least-recently-used eviction over a fixed capacity. Every access
//! (hit through `get_if_cached` or `get_or_fetch`, or a store) refreshes
//! recency.

use ampache_core::{CatalogError, Result};
use lru::LruCache;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// LRU cache of catalog records with fetch-on-miss
///
/// Lookups, stores and evictions are serialized by an internal mutex that is
/// never held across a fetch. Two concurrent misses for the same key may both
/// fetch; the second store simply replaces the first with an equal record.
pub struct CatalogCache<K: Hash + Eq, V> {
    /// Record kind, used in logs ("album", "song")
    kind: &'static str,
    entries: Mutex<LruCache<K, Arc<V>>>,
    fetch_timeout: Duration,
}

impl<K, V> CatalogCache<K, V>
where
    K: Hash + Eq + Copy + Display,
{
    /// Create a cache holding at most `capacity` records
    pub fn new(kind: &'static str, capacity: NonZeroUsize, fetch_timeout: Duration) -> Self {
        Self {
            kind,
            entries: Mutex::new(LruCache::new(capacity)),
            fetch_timeout,
        }
    }

    // The LRU map stays structurally valid even if a holder panicked.
    fn entries(&self) -> MutexGuard<'_, LruCache<K, Arc<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached record, if any. Never fetches.
    pub fn get_if_cached(&self, key: &K) -> Option<Arc<V>> {
        self.entries().get(key).cloned()
    }

    /// Whether `key` is cached, without touching its recency
    pub fn contains(&self, key: &K) -> bool {
        self.entries().contains(key)
    }

    /// Store a record, evicting the least recently used one when full
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let evicted = self.entries().push(key, Arc::clone(&value));

        if let Some((evicted_key, _)) = evicted {
            if evicted_key != key {
                debug!(cache = self.kind, id = %evicted_key, "Evicted");
            }
        }
        value
    }

    /// Return the cached record or fetch, store and return it
    ///
    /// The fetch is bounded by the cache's fetch timeout. A failed or timed
    /// out fetch leaves the cache untouched and is reported to this caller
    /// only.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(hit) = self.get_if_cached(&key) {
            debug!(cache = self.kind, id = %key, "Cache hit");
            return Ok(hit);
        }

        debug!(cache = self.kind, id = %key, "Cache miss, fetching");
        let value = tokio::time::timeout(self.fetch_timeout, fetch())
            .await
            .map_err(|_| CatalogError::Timeout(self.fetch_timeout))??;

        Ok(self.insert(key, value))
    }

    /// Number of cached records
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Maximum number of cached records
    pub fn capacity(&self) -> usize {
        self.entries().cap().get()
    }

    /// Drop every cached record
    pub fn clear(&self) {
        self.entries().clear();
        debug!(cache = self.kind, "Cleared");
    }
}
