//! Process-wide object cache: at most one in-memory representative per key.
//!
//! One `ObjectCache` instance exists per entity type, so equal keys of
//! different types can never collide. A miss hydrates through the supplied
//! async loader and inserts before returning; two racing loaders converge on
//! whichever representative lands first.
//!
//! There is no eviction: entries live for the process lifetime. That is only
//! acceptable for the bounded working set here (active users, customers, and
//! open tickets) and this cache should not be reused for unbounded key
//! spaces. The cache is never the source of truth — callers write to the
//! store first and then [`insert`](ObjectCache::insert) or
//! [`invalidate`](ObjectCache::invalidate) the cached copy.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct ObjectCache<K, V> {
    entries: Arc<RwLock<HashMap<K, Arc<V>>>>,
}

impl<K, V> Clone for ObjectCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K, V> Default for ObjectCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ObjectCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the cached object for `key`, or hydrates one through `load`.
    /// The loader runs outside any lock; if another caller inserted first
    /// while we were loading, their representative wins and is returned.
    pub async fn get_or_create<F, Fut, E>(&self, key: K, load: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(existing) = self.entries.read().await.get(&key) {
            return Ok(existing.clone());
        }

        let loaded = load().await?;

        let mut entries = self.entries.write().await;
        Ok(entries
            .entry(key)
            .or_insert_with(|| Arc::new(loaded))
            .clone())
    }

    /// Replaces the representative for `key` (used after a write-through).
    pub async fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.write().await.insert(key, value.clone());
        value
    }

    /// Drops the representative for `key`; the next access re-hydrates.
    pub async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
