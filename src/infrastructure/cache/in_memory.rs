//! In-memory cache implementation using moka

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::policy::EvictionPolicy;

use crate::domain::DomainError;
use crate::domain::cache::{Cache, CachedValue};

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Upper bound on the lifetime of any entry, whatever TTL it was set with
    pub max_ttl: Duration,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            max_ttl: Duration::from_secs(3600),
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_max_ttl(mut self, ttl: Duration) -> Self {
        self.max_ttl = ttl;
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized JSON value
    data: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .checked_duration_since(now)
            .filter(|d| !d.is_zero())
    }
}

/// Thread-safe in-memory cache using moka
///
/// Entries carry their own deadline; moka's TinyLFU policy decides what to
/// evict once `max_capacity` is reached, favoring keys that are both hot and
/// recent over plain LRU.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
    config: InMemoryCacheConfig,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.max_ttl)
            .eviction_policy(EvictionPolicy::tiny_lfu())
            .build();

        Self { cache, config }
    }

    /// Live entry for `key`; expired entries are dropped on the way
    async fn live_entry(&self, key: &str) -> Option<(CacheEntry, Duration)> {
        let entry = self.cache.get(key).await?;

        match entry.remaining(Instant::now()) {
            Some(remaining) => Some((entry, remaining)),
            None => {
                self.cache.remove(key).await;
                None
            }
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.live_entry(key).await.map(|(entry, _)| entry.data))
    }

    async fn get_with_meta_raw(&self, key: &str) -> Result<Option<CachedValue>, DomainError> {
        Ok(self
            .live_entry(key)
            .await
            .map(|(entry, remaining)| CachedValue {
                data: entry.data,
                ttl_remaining: Some(remaining),
            }))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let entry = CacheEntry {
            data: value.to_string(),
            expires_at: Instant::now() + ttl.min(self.config.max_ttl),
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        Ok(self.live_entry(key).await.map(|(_, remaining)| remaining))
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        self.cache.run_pending_tasks().await;
        Ok(self.cache.entry_count() as usize)
    }
}
