//! Process-local response cache with per-entry TTL.
//!
//! Entries are evicted lazily: an expired entry stays in the map until a
//! read finds it expired and removes it. Each server instance holds its own
//! cache, so horizontally scaled deployments see independent copies.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;

/// A cached value with its expiry.
#[derive(Clone, Debug)]
pub struct CachedEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CachedEntry<V> {
    /// Create a new entry expiring `ttl` from now.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Check if this entry has expired.
    pub fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Key/value cache with per-entry TTL.
///
/// Values are cloned out on every hit; wrap large payloads in `Arc`.
/// Concurrent writers to the same key are last-writer-wins.
pub struct ResponseCache<V> {
    entries: DashMap<String, CachedEntry<V>>,
    /// Cache hit counter
    hits: AtomicU64,
    /// Cache miss counter (absent or expired)
    misses: AtomicU64,
    /// Entries removed because a read found them expired
    expirations: AtomicU64,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    /// Stores `value` under `key`, replacing any existing entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.entries.insert(key.into(), CachedEntry::new(value, ttl));
    }

    /// Returns the value for `key` if present and not expired.
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&self, key: &str) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            // Entry expired, remove it
            drop(entry);
            if self
                .entries
                .remove_if(key, |_, entry| entry.is_expired())
                .is_some()
            {
                self.expirations.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key = %key, "cache entry expired");
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Removes one entry. No effect if absent.
    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Removes every entry.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, _| {
            removed += 1;
            false
        });
        removed
    }

    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            if !keep {
                removed += 1;
            }
            keep
        });
        tracing::debug!(prefix = %prefix, removed, "cache invalidated by prefix");
        removed
    }

    /// Lists the stored keys, including expired entries not yet read.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of stored entries, including expired entries not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached value or computes, stores and returns a fresh one.
    ///
    /// Errors from `load` are returned as-is and nothing is cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        load: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = load().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for the response cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of entries currently in the cache.
    pub size: usize,
    /// Number of reads served from the cache.
    pub hits: u64,
    /// Number of reads that found nothing usable.
    pub misses: u64,
    /// Number of entries removed on read because they had expired.
    pub expirations: u64,
}

impl CacheStats {
    /// Calculate hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache = ResponseCache::new();
        cache.set("k", 42, Duration::from_secs(1));
        assert_eq!(cache.get("k"), Some(42));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_expired_entry_is_absent_and_evicted() {
        let cache = ResponseCache::new();
        cache.set("k", "v".to_string(), Duration::from_secs(1));
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        std::thread::sleep(Duration::from_millis(1100));

        // Still stored until read.
        assert!(cache.keys().contains(&"k".to_string()));
        assert_eq!(cache.get("k"), None);
        assert!(!cache.keys().contains(&"k".to_string()));
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_set_overwrites() {
        let cache = ResponseCache::new();
        cache.set("k", 1, Duration::from_secs(60));
        cache.set("k", 2, Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_by_prefix() {
        let cache = ResponseCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("client-data-1", 1, ttl);
        cache.set("client-data-2", 2, ttl);
        cache.set("other-key", 3, ttl);

        assert_eq!(cache.invalidate_by_prefix("client-data-"), 2);

        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, ["other-key"]);
        assert_eq!(cache.get("other-key"), Some(3));
    }

    #[test]
    fn test_delete_and_clear_are_idempotent() {
        let cache = ResponseCache::new();
        cache.set("a", 1, Duration::from_secs(60));
        cache.set("b", 2, Duration::from_secs(60));

        cache.delete("a");
        cache.delete("a");
        assert_eq!(cache.keys(), ["b"]);

        assert_eq!(cache.clear(), 1);
        assert!(cache.is_empty());
        assert_eq!(cache.clear(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_or_try_insert_with() {
        let cache: ResponseCache<u32> = ResponseCache::new();
        let ttl = Duration::from_secs(60);

        let first: Result<u32, String> = cache
            .get_or_try_insert_with("k", ttl, || async { Ok(7) })
            .await;
        assert_eq!(first, Ok(7));

        // Served from cache, loader not called.
        let second: Result<u32, String> = cache
            .get_or_try_insert_with("k", ttl, || async { Err("loader called".to_string()) })
            .await;
        assert_eq!(second, Ok(7));

        let failed: Result<u32, String> = cache
            .get_or_try_insert_with("other", ttl, || async { Err("boom".to_string()) })
            .await;
        assert_eq!(failed, Err("boom".to_string()));
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn test_stats_and_hit_rate() {
        let cache = ResponseCache::new();
        cache.set("k", 1, Duration::from_secs(60));
        cache.get("k");
        cache.get("k");
        cache.get("nope");

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 66.666).abs() < 0.01);
    }
}
