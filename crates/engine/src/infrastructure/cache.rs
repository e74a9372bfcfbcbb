//! TTL-based cache for ephemeral state.
//!
//! Expiry is sliding: every write and every [`TtlCache::touch`] restarts the
//! entry's clock. Expired entries are invisible to reads but stay in memory
//! until [`TtlCache::cleanup_expired`] runs.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, TtlEntry<V>>>,
    ttl: Duration,
}

struct TtlEntry<V> {
    value: V,
    last_touched: Instant,
}

impl<V> TtlEntry<V> {
    fn is_live(&self, ttl: Duration) -> bool {
        self.last_touched.elapsed() < ttl
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert or replace a value and restart its TTL.
    pub async fn insert(&self, key: K, value: V) {
        let entry = TtlEntry {
            value,
            last_touched: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    #[cfg(test)]
    pub async fn insert_at(&self, key: K, value: V, last_touched: Instant) {
        let entry = TtlEntry {
            value,
            last_touched,
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Clone of the value if present and not expired. Does not extend the TTL.
    pub async fn get(&self, key: &K) -> Option<V> {
        let guard = self.entries.read().await;
        guard
            .get(key)
            .filter(|entry| entry.is_live(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Restart the TTL of a live entry. Returns false if missing or expired.
    pub async fn touch(&self, key: &K) -> bool {
        let mut guard = self.entries.write().await;
        match guard.get_mut(key) {
            Some(entry) if entry.is_live(self.ttl) => {
                entry.last_touched = Instant::now();
                true
            }
            _ => false,
        }
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut guard = self.entries.write().await;
        let before = guard.len();
        let ttl = self.ttl;
        guard.retain(|_, entry| entry.is_live(ttl));
        before - guard.len()
    }

    /// Entry count, including expired entries not yet cleaned up.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expired(ttl: Duration) -> Instant {
        Instant::now() - (ttl + Duration::from_millis(1))
    }

    #[tokio::test]
    async fn insert_and_get() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("key".to_string(), 42).await;
        assert_eq!(cache.get(&"key".to_string()).await, Some(42));
        assert_eq!(cache.get(&"missing".to_string()).await, None);
    }

    #[tokio::test]
    async fn insert_replaces_existing_value() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("key".to_string(), 1).await;
        cache.insert("key".to_string(), 2).await;
        assert_eq!(cache.get(&"key".to_string()).await, Some(2));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn expired_entries_not_returned() {
        let ttl = Duration::from_millis(10);
        let cache: TtlCache<String, i32> = TtlCache::new(ttl);
        cache.insert_at("key".to_string(), 42, expired(ttl)).await;

        assert_eq!(cache.get(&"key".to_string()).await, None);
        assert!(!cache.touch(&"key".to_string()).await);
    }

    #[tokio::test]
    async fn touch_extends_live_entries() {
        let ttl = Duration::from_secs(60);
        let cache: TtlCache<String, i32> = TtlCache::new(ttl);
        let nearly_expired = Instant::now() - (ttl - Duration::from_millis(50));
        cache.insert_at("key".to_string(), 7, nearly_expired).await;

        assert!(cache.touch(&"key".to_string()).await);
        assert_eq!(cache.cleanup_expired().await, 0);
        assert_eq!(cache.get(&"key".to_string()).await, Some(7));
    }

    #[tokio::test]
    async fn cleanup_removes_expired() {
        let ttl = Duration::from_millis(10);
        let cache: TtlCache<String, i32> = TtlCache::new(ttl);
        cache.insert_at("key1".to_string(), 1, expired(ttl)).await;
        cache.insert_at("key2".to_string(), 2, expired(ttl)).await;
        cache.insert("key3".to_string(), 3).await;

        assert_eq!(cache.cleanup_expired().await, 2);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"key3".to_string()).await, Some(3));
    }
}
