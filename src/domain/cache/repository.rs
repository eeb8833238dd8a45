//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Cached value together with what the tier knows about its lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue {
    /// Serialized JSON value
    pub data: String,
    /// Time-to-live remaining (if known)
    pub ttl_remaining: Option<Duration>,
}

/// Key-value cache with per-entry TTL
///
/// A miss is `Ok(None)`, never an error. Expired entries are misses.
/// Values cross the trait as JSON strings to keep it dyn-compatible; use
/// [`CacheExt`] for typed access.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a raw JSON value from the cache
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Gets a raw JSON value along with its remaining TTL
    async fn get_with_meta_raw(&self, key: &str) -> Result<Option<CachedValue>, DomainError> {
        let Some(data) = self.get_raw(key).await? else {
            return Ok(None);
        };
        let ttl_remaining = self.ttl(key).await?;

        Ok(Some(CachedValue {
            data,
            ttl_remaining,
        }))
    }

    /// Sets a raw JSON value in the cache with a TTL
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Deletes a value from the cache
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Gets the remaining TTL for a key
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError>;

    /// Clears all entries from the cache
    async fn clear(&self) -> Result<(), DomainError>;

    /// Returns approximate number of entries in the cache
    async fn size(&self) -> Result<usize, DomainError>;
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the cache with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync + ?Sized,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock cache for testing. Entries never expire; reads and writes can be
    /// made to fail independently.
    #[derive(Debug, Default)]
    pub struct MockCache {
        entries: Mutex<HashMap<String, (String, Option<Duration>)>>,
        get_error: Mutex<Option<String>>,
        set_error: Mutex<Option<String>>,
        set_calls: AtomicUsize,
    }

    impl MockCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_entry<V: Serialize>(self, key: &str, value: &V, ttl: Option<Duration>) -> Self {
            let json = serde_json::to_string(value).unwrap();
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (json, ttl));
            self
        }

        pub fn with_get_error(self, error: impl Into<String>) -> Self {
            *self.get_error.lock().unwrap() = Some(error.into());
            self
        }

        pub fn with_set_error(self, error: impl Into<String>) -> Self {
            *self.set_error.lock().unwrap() = Some(error.into());
            self
        }

        /// Number of `set_raw` calls, failed ones included
        pub fn set_calls(&self) -> usize {
            self.set_calls.load(Ordering::SeqCst)
        }

        pub fn contains(&self, key: &str) -> bool {
            self.entries.lock().unwrap().contains_key(key)
        }

        pub fn ttl_of(&self, key: &str) -> Option<Duration> {
            self.entries.lock().unwrap().get(key).and_then(|(_, ttl)| *ttl)
        }

        fn check(error: &Mutex<Option<String>>) -> Result<(), DomainError> {
            if let Some(error) = error.lock().unwrap().clone() {
                return Err(DomainError::cache(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
            Self::check(&self.get_error)?;
            let entries = self.entries.lock().unwrap();

            Ok(entries.get(key).map(|(json, _)| json.clone()))
        }

        async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
            self.set_calls.fetch_add(1, Ordering::SeqCst);
            Self::check(&self.set_error)?;
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), Some(ttl)));
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<bool, DomainError> {
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
            Self::check(&self.get_error)?;
            Ok(self.ttl_of(key))
        }

        async fn clear(&self) -> Result<(), DomainError> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }

        async fn size(&self) -> Result<usize, DomainError> {
            Ok(self.entries.lock().unwrap().len())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_cache_set_get() {
            let cache = MockCache::new();
            cache
                .set("key1", &"value1", Duration::from_secs(60))
                .await
                .unwrap();

            let result: Option<String> = cache.get("key1").await.unwrap();
            assert_eq!(result, Some("value1".to_string()));
            assert_eq!(cache.set_calls(), 1);
        }

        #[tokio::test]
        async fn test_mock_cache_get_missing() {
            let cache = MockCache::new();

            let result: Option<String> = cache.get("missing").await.unwrap();
            assert!(result.is_none());
        }

        #[tokio::test]
        async fn test_mock_cache_meta_uses_ttl() {
            let cache = MockCache::new().with_entry("k", &1, Some(Duration::from_secs(9)));

            let meta = cache.get_with_meta_raw("k").await.unwrap().unwrap();
            assert_eq!(meta.data, "1");
            assert_eq!(meta.ttl_remaining, Some(Duration::from_secs(9)));
        }

        #[tokio::test]
        async fn test_mock_cache_set_error_leaves_reads_working() {
            let cache = MockCache::new()
                .with_entry("k", &"v", None)
                .with_set_error("redis down");

            assert!(cache.set("k2", &"v2", Duration::from_secs(1)).await.is_err());
            let value: Option<String> = cache.get("k").await.unwrap();
            assert_eq!(value, Some("v".to_string()));
            assert!(!cache.contains("k2"));
        }

        #[tokio::test]
        async fn test_mock_cache_get_error() {
            let cache = MockCache::new().with_get_error("Test error");

            let result: Result<Option<String>, _> = cache.get("key").await;
            assert!(matches!(result, Err(DomainError::Cache { .. })));
        }
    }
}
