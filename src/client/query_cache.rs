use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use super::ClientError;

struct CachedEntry {
    value: Value,
    updated_at: Instant,
    invalidated: bool,
}

/// Process-local query cache with a stale time.
///
/// Entries are fresh until `stale_time` has elapsed since they were written
/// or until they are invalidated by key. Stale entries are kept so callers
/// can still show them while refetching.
pub struct QueryCache {
    entries: RwLock<HashMap<String, CachedEntry>>,
    stale_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stale_time,
        }
    }

    /// Fresh value under `key`, if any
    pub async fn get_fresh<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ClientError> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.invalidated && entry.updated_at.elapsed() < self.stale_time => {
                Ok(Some(serde_json::from_value(entry.value.clone())?))
            }
            _ => Ok(None),
        }
    }

    /// Last known value under `key`, fresh or stale
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ClientError> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .map(|entry| serde_json::from_value(entry.value.clone()))
            .transpose()
            .map_err(ClientError::from)
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ClientError> {
        let value = serde_json::to_value(value)?;
        self.entries.write().await.insert(
            key.to_string(),
            CachedEntry {
                value,
                updated_at: Instant::now(),
                invalidated: false,
            },
        );
        Ok(())
    }

    /// Mark `key` stale. Returns whether an entry existed.
    pub async fn invalidate(&self, key: &str) -> bool {
        match self.entries.write().await.get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                true
            }
            None => false,
        }
    }

    pub async fn is_fresh(&self, key: &str) -> bool {
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|entry| !entry.invalidated && entry.updated_at.elapsed() < self.stale_time)
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get_fresh() {
        let cache = QueryCache::new(Duration::from_secs(30));
        cache.set("unread-count:a", &3i64).await.unwrap();

        assert!(cache.is_fresh("unread-count:a").await);
        assert_eq!(cache.get_fresh::<i64>("unread-count:a").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_invalidated_entry_is_stale_but_kept() {
        let cache = QueryCache::new(Duration::from_secs(30));
        cache.set("k", &1i64).await.unwrap();

        assert!(cache.invalidate("k").await);
        assert!(!cache.invalidate("missing").await);

        assert_eq!(cache.get_fresh::<i64>("k").await.unwrap(), None);
        assert_eq!(cache.get::<i64>("k").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_zero_stale_time_is_never_fresh() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.set("k", &1i64).await.unwrap();
        assert!(!cache.is_fresh("k").await);
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let cache = QueryCache::new(Duration::from_secs(30));
        cache.set("a", &1i64).await.unwrap();
        cache.set("b", &2i64).await.unwrap();

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
