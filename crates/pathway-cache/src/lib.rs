//! pathway-cache
//!
//! In-process TTL cache for search results. Expired entries are masked on read
//! and only removed when overwritten or when `purge_expired` is called.

pub mod clock;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pathway_core::traits::CacheStore;

pub use clock::{Clock, ManualClock, SystemClock};

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    /// `None` when the TTL reaches past what `Instant` can represent.
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    pub fn is_expired(&self, now: Instant) -> bool { self.expires_at.is_some_and(|at| now >= at) }
}

pub struct QueryCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self { Self::with_clock(Arc::new(SystemClock)) }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), clock }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.read();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => { tracing::debug!(key, "cache entry expired"); None }
            None => None,
        }
    }

    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        let expires_at = self.clock.now().checked_add(ttl);
        if expires_at.is_none() { tracing::debug!(key, ?ttl, "ttl overflows the clock; entry never expires"); }
        self.entries.write().insert(key.to_string(), CacheEntry { value, expires_at });
    }

    /// Removes expired entries and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize { self.entries.read().len() }

    pub fn is_empty(&self) -> bool { self.entries.read().is_empty() }

    pub fn clear(&self) { self.entries.write().clear(); }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self { Self::new() }
}

impl<V> CacheStore<V> for QueryCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> { QueryCache::get(self, key) }
    fn set(&self, key: &str, value: V, ttl: Duration) { QueryCache::set(self, key, value, ttl) }
}
