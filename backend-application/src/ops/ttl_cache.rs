use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

pub const RESOURCE_LIST_KEY: &str = "resources:all";
pub const DISCORD_ROLES_KEY: &str = "discord:roles";

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// In-process cache with a single time-to-live for every key.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: &str, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Drops expired entries and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.insert("a", 1).await;
        assert_eq!(cache.get("a").await, Some(1));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn invalidate_removes_single_key() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert(RESOURCE_LIST_KEY, vec![1, 2]).await;
        cache.insert(DISCORD_ROLES_KEY, vec![3]).await;
        cache.invalidate(RESOURCE_LIST_KEY).await;
        assert_eq!(cache.get(RESOURCE_LIST_KEY).await, None);
        assert_eq!(cache.get(DISCORD_ROLES_KEY).await, Some(vec![3]));
        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
