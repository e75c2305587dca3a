//! A small generic TTL cache (spec §3.1, §3.2, §9) shared by the
//! registry-entry cache and the blob cache. Each client instance owns its
//! own caches; nothing here is global (§9 "Ambient mutable state").
//!
//! Entries expire passively on TTL lookup and opportunistically once the
//! cache exceeds a soft size limit, at which point the single oldest entry
//! is evicted to make room — a cheap approximation that avoids tracking a
//! full LRU order for what is meant to paper over network propagation
//! delay, not serve as a hot-path cache.

use std::collections::HashMap;
use std::hash::Hash as StdHash;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A TTL-bounded, soft-size-limited cache, guarded by a mutex held only
/// across each cache-local operation (spec §9).
pub struct TtlCache<K, V> {
    inner: Mutex<HashMap<K, Entry<V>>>,
    ttl: Duration,
    soft_limit: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + StdHash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, soft_limit: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
            soft_limit,
        }
    }

    /// Returns the cached value for `key` if present and not expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.inner.lock().await;
        match guard.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                guard.remove(key);
                None
            }
            None => None,
        }
    }

    /// Inserts or overwrites `key`, evicting the oldest entry first if the
    /// cache is at its soft limit.
    pub async fn insert(&self, key: K, value: V) {
        let mut guard = self.inner.lock().await;
        if guard.len() >= self.soft_limit && !guard.contains_key(&key) {
            if let Some(oldest_key) = guard
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                guard.remove(&oldest_key);
            }
        }
        guard.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn remove(&self, key: &K) {
        self.inner.lock().await.remove(key);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn expires_after_ttl() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_millis(20), 10);
        cache.insert("a", 1).await;
        assert_eq!(cache.get(&"a").await, Some(1));
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get(&"a").await, None);
    }

    #[tokio::test]
    async fn evicts_oldest_over_soft_limit() {
        let cache: TtlCache<i32, i32> = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert(1, 1).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert(2, 2).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert(3, 3).await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.get(&3).await, Some(3));
    }
}
