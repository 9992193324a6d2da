use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::Mutex;

/// Fixed-capacity cache with least-recently-used eviction.
///
/// Lookups refresh recency, so the lock is exclusive for reads too.
pub struct BoundedCache<K: Hash + Eq, V: Clone> {
    store: Mutex<LruCache<K, V>>,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// A capacity of zero falls back to 1024 entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            store: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.store.lock().await.get(key).cloned()
    }

    /// Inserts and returns the entry evicted to make room, if any.
    pub async fn insert(&self, key: K, value: V) -> Option<(K, V)> {
        let mut store = self.store.lock().await;
        match store.push(key, value) {
            // push hands back the old value when the key was already present
            Some((evicted_key, _)) if store.contains(&evicted_key) => None,
            other => other,
        }
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.store.lock().await.cap().get()
    }

    pub async fn clear(&self) {
        self.store.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let cache = BoundedCache::new(2);
        cache.insert(1_u64, "apple").await;
        cache.insert(2, "banana").await;

        // touch 1 so that 2 becomes the eviction candidate
        assert_eq!(cache.get(&1).await, Some("apple"));

        let evicted = cache.insert(3, "cherry").await;
        assert_eq!(evicted, Some((2, "banana")));
        assert_eq!(cache.get(&2).await, None);
        assert_eq!(cache.get(&1).await, Some("apple"));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn replacing_a_key_is_not_an_eviction() {
        let cache = BoundedCache::new(2);
        cache.insert("a".to_string(), 1).await;
        assert_eq!(cache.insert("a".to_string(), 2).await, None);
        assert_eq!(cache.get(&"a".to_string()).await, Some(2));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn zero_capacity_uses_default() {
        let cache: BoundedCache<u64, u64> = BoundedCache::new(0);
        assert_eq!(cache.capacity().await, 1024);
        assert!(cache.is_empty().await);
    }
}
