//! Two-tier cache: a small local moka tier in front of a shared remote tier

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use crate::domain::DomainError;
use crate::domain::cache::{Cache, CachedValue};

/// Configuration of the local tier
#[derive(Debug, Clone)]
pub struct TieredCacheConfig {
    /// Maximum number of entries held locally
    pub local_capacity: u64,
    /// Longest a key stays local before it is re-read from the remote tier
    pub local_ttl: Duration,
}

impl Default for TieredCacheConfig {
    fn default() -> Self {
        Self {
            local_capacity: 1000,
            local_ttl: Duration::from_secs(60),
        }
    }
}

/// Cache that serves from a bounded local tier and falls back to a remote tier
///
/// The remote tier is authoritative for TTLs. A local copy never outlives
/// the remote entry it was taken from, so expiry is observed at the same
/// moment on every process sharing the remote tier.
#[derive(Debug)]
pub struct TieredCache {
    local: InMemoryCache,
    remote: Arc<dyn Cache>,
    config: TieredCacheConfig,
}

impl TieredCache {
    pub fn new(remote: Arc<dyn Cache>, config: TieredCacheConfig) -> Self {
        let local = InMemoryCache::with_config(
            InMemoryCacheConfig::default()
                .with_max_capacity(config.local_capacity)
                .with_max_ttl(config.local_ttl),
        );

        Self {
            local,
            remote,
            config,
        }
    }

    fn local_ttl(&self, remote_ttl: Option<Duration>) -> Duration {
        remote_ttl.map_or(self.config.local_ttl, |ttl| ttl.min(self.config.local_ttl))
    }
}

#[async_trait]
impl Cache for TieredCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.get_with_meta_raw(key).await?.map(|value| value.data))
    }

    async fn get_with_meta_raw(&self, key: &str) -> Result<Option<CachedValue>, DomainError> {
        if let Some(value) = self.local.get_with_meta_raw(key).await? {
            debug!(key, "local tier hit");
            return Ok(Some(value));
        }

        let Some(value) = self.remote.get_with_meta_raw(key).await? else {
            return Ok(None);
        };

        // Expired between the remote read and its TTL lookup
        if value.ttl_remaining == Some(Duration::ZERO) {
            debug!(key, "remote entry expired, not filling local tier");
            return Ok(None);
        }

        debug!(key, "remote tier hit, filling local tier");
        self.local
            .set_raw(key, &value.data, self.local_ttl(value.ttl_remaining))
            .await?;

        Ok(Some(value))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        // Remote first: a failed remote write must not leave a local-only copy
        self.remote.set_raw(key, value, ttl).await?;
        self.local.set_raw(key, value, self.local_ttl(Some(ttl))).await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let local = self.local.delete(key).await?;
        let remote = self.remote.delete(key).await?;
        Ok(local || remote)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        self.remote.ttl(key).await
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.local.clear().await?;
        self.remote.clear().await
    }

    async fn size(&self) -> Result<usize, DomainError> {
        self.remote.size().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{CacheExt, MockCache};

    fn tiered_over(remote: Arc<dyn Cache>, local_ttl: Duration) -> TieredCache {
        TieredCache::new(
            remote,
            TieredCacheConfig {
                local_capacity: 100,
                local_ttl,
            },
        )
    }

    #[tokio::test]
    async fn test_set_writes_both_tiers() {
        let remote = Arc::new(InMemoryCache::new());
        let cache = tiered_over(remote.clone(), Duration::from_secs(60));

        cache.set("k", &"v", Duration::from_secs(30)).await.unwrap();

        let remote_value: Option<String> = remote.get("k").await.unwrap();
        assert_eq!(remote_value, Some("v".to_string()));
        let local_value: Option<String> = cache.local.get("k").await.unwrap();
        assert_eq!(local_value, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_remote_hit_fills_local() {
        let remote = Arc::new(InMemoryCache::new());
        remote.set("k", &"v", Duration::from_secs(30)).await.unwrap();
        let cache = tiered_over(remote.clone(), Duration::from_secs(60));

        let value: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(value, Some("v".to_string()));

        // Served locally even once the remote copy is gone
        remote.delete("k").await.unwrap();
        let value: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(value, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_local_copy_does_not_outlive_remote_ttl() {
        let remote = Arc::new(InMemoryCache::new());
        remote
            .set("k", &"v", Duration::from_millis(80))
            .await
            .unwrap();
        let cache = tiered_over(remote, Duration::from_secs(60));

        let value: Option<String> = cache.get("k").await.unwrap();
        assert!(value.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;

        let value: Option<String> = cache.get("k").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_local_ttl_caps_local_copy() {
        let remote = Arc::new(InMemoryCache::new());
        let cache = tiered_over(remote.clone(), Duration::from_millis(50));

        cache.set("k", &"v1", Duration::from_secs(60)).await.unwrap();
        remote.set("k", &"v2", Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        // Local copy expired; the remote value is picked up again
        let value: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(value, Some("v2".to_string()));
    }

    #[tokio::test]
    async fn test_expired_remote_entry_does_not_fill_local() {
        let remote = Arc::new(MockCache::new().with_entry("k", &"v", Some(Duration::ZERO)));
        let cache = tiered_over(remote.clone(), Duration::from_secs(60));

        let value: Option<String> = cache.get("k").await.unwrap();
        assert!(value.is_none());
        assert!(cache.local.ttl("k").await.unwrap().is_none());

        remote.delete("k").await.unwrap();
        let value: Option<String> = cache.get("k").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_remote_without_expiry_fills_local_for_local_ttl() {
        let remote = Arc::new(MockCache::new().with_entry("k", &"v", None));
        let cache = tiered_over(remote, Duration::from_secs(60));

        let value: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(value, Some("v".to_string()));

        let local_ttl = cache.local.ttl("k").await.unwrap().unwrap();
        assert!(local_ttl <= Duration::from_secs(60));
        assert!(local_ttl > Duration::from_secs(50));
    }

    #[tokio::test]
    async fn test_remote_set_failure_skips_local() {
        let remote = Arc::new(MockCache::new().with_set_error("redis down"));
        let cache = tiered_over(remote, Duration::from_secs(60));

        let result = cache.set("k", &"v", Duration::from_secs(30)).await;
        assert!(matches!(result, Err(DomainError::Cache { .. })));

        let local_value: Option<String> = cache.local.get("k").await.unwrap();
        assert!(local_value.is_none());
    }

    #[tokio::test]
    async fn test_remote_get_failure_is_an_error_not_a_miss() {
        let remote = Arc::new(MockCache::new().with_get_error("redis down"));
        let cache = tiered_over(remote, Duration::from_secs(60));

        let result: Result<Option<String>, _> = cache.get("k").await;
        assert!(result.is_err());
    }
}
