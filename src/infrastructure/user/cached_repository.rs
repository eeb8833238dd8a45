//! Cache-aside repository decorator

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::single_flight::SingleFlight;
use crate::domain::cache::{Cache, CacheExt, CacheKey};
use crate::domain::user::{Article, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_cache_request, CacheOutcome};

/// TTL per cached read shape, in seconds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheTtlConfig {
    pub user_secs: u64,
    /// Lifetime of the negative entry stored for an absent user
    pub user_not_found_secs: u64,
    pub users_by_name_secs: u64,
    pub user_articles_secs: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            user_secs: 3600,
            user_not_found_secs: 5,
            users_by_name_secs: 5,
            user_articles_secs: 5,
        }
    }
}

/// Behavior of the caching layer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CachedRepositoryConfig {
    /// Collapse concurrent misses for one key into a single store read
    pub single_flight: bool,
    /// Log populate failures and return the value read from the store
    /// instead of failing the request
    pub swallow_populate_errors: bool,
    pub ttl: CacheTtlConfig,
}

impl Default for CachedRepositoryConfig {
    fn default() -> Self {
        Self {
            single_flight: true,
            swallow_populate_errors: false,
            ttl: CacheTtlConfig::default(),
        }
    }
}

impl CachedRepositoryConfig {
    pub fn with_ttl(mut self, ttl: CacheTtlConfig) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    pub fn swallowing_populate_errors(mut self) -> Self {
        self.swallow_populate_errors = true;
        self
    }
}

/// Repository that serves reads from a cache and falls back to an inner
/// repository on a miss
///
/// An absent user is cached as JSON `null` so that repeated lookups keep
/// failing with `NotFound` without reaching the store. `MultipleFound` and
/// every other error pass through uncached. `list_users` is never cached.
pub struct CachedUserRepository {
    inner: Arc<dyn UserRepository>,
    cache: Arc<dyn Cache>,
    config: CachedRepositoryConfig,
    user_flights: SingleFlight<Option<User>>,
    name_flights: SingleFlight<Vec<User>>,
    article_flights: SingleFlight<Vec<Article>>,
}

impl std::fmt::Debug for CachedUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedUserRepository")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CachedUserRepository {
    pub fn new(inner: Arc<dyn UserRepository>, cache: Arc<dyn Cache>) -> Self {
        Self::with_config(inner, cache, CachedRepositoryConfig::default())
    }

    pub fn with_config(
        inner: Arc<dyn UserRepository>,
        cache: Arc<dyn Cache>,
        config: CachedRepositoryConfig,
    ) -> Self {
        Self {
            inner,
            cache,
            config,
            user_flights: SingleFlight::new(),
            name_flights: SingleFlight::new(),
            article_flights: SingleFlight::new(),
        }
    }

    pub fn config(&self) -> &CachedRepositoryConfig {
        &self.config
    }

    async fn lookup<V>(&self, key: &CacheKey, rendered: &str) -> Result<Option<V>, DomainError>
    where
        V: DeserializeOwned + Send,
    {
        let shape = key.namespace();
        let raw = match self.cache.get_raw(rendered).await {
            Ok(raw) => raw,
            Err(e) => {
                record_cache_request(shape, CacheOutcome::Error);
                return Err(e);
            }
        };

        let Some(raw) = raw else {
            debug!(key = rendered, "cache miss");
            record_cache_request(shape, CacheOutcome::Miss);
            return Ok(None);
        };

        let outcome = if raw == "null" {
            CacheOutcome::NegativeHit
        } else {
            CacheOutcome::Hit
        };
        debug!(key = rendered, result = outcome.as_str(), "cache hit");
        record_cache_request(shape, outcome);

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| DomainError::cache(format!("Failed to deserialize cache value: {}", e)))
    }

    async fn populate<V>(&self, key: &str, value: &V, ttl: Duration) -> Result<(), DomainError>
    where
        V: Serialize + Send + Sync,
    {
        match self.cache.set(key, value, ttl).await {
            Ok(()) => {
                debug!(key, ttl_secs = ttl.as_secs(), "cache populated");
                Ok(())
            }
            Err(e) if self.config.swallow_populate_errors => {
                warn!(key, error = %e, "Failed to populate cache, serving store result");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn load_and_populate<V, L, Fut>(
        &self,
        key: &str,
        ttl_for: fn(&CacheTtlConfig, &V) -> u64,
        load: L,
    ) -> Result<V, DomainError>
    where
        V: Serialize + Send + Sync,
        L: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, DomainError>>,
    {
        let value = load().await?;
        let ttl = Duration::from_secs(ttl_for(&self.config.ttl, &value));
        self.populate(key, &value, ttl).await?;
        Ok(value)
    }

    /// Cache-aside read of one key, optionally behind a single flight
    async fn read_through<V, L, Fut>(
        &self,
        key: CacheKey,
        flights: &SingleFlight<V>,
        ttl_for: fn(&CacheTtlConfig, &V) -> u64,
        load: L,
    ) -> Result<V, DomainError>
    where
        V: Serialize + DeserializeOwned + Clone + Send + Sync,
        L: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, DomainError>> + Send,
    {
        let rendered = key.to_string();

        if let Some(value) = self.lookup::<V>(&key, &rendered).await? {
            return Ok(value);
        }

        if self.config.single_flight {
            flights
                .run(&rendered, || self.load_and_populate(&rendered, ttl_for, load))
                .await
        } else {
            self.load_and_populate(&rendered, ttl_for, load).await
        }
    }
}

#[async_trait]
impl UserRepository for CachedUserRepository {
    async fn get_user(&self, id: &UserId) -> Result<User, DomainError> {
        let found = self
            .read_through(
                CacheKey::User(*id),
                &self.user_flights,
                |ttl, user: &Option<User>| match user {
                    Some(_) => ttl.user_secs,
                    None => ttl.user_not_found_secs,
                },
                move || async move {
                    match self.inner.get_user(id).await {
                        Ok(user) => Ok(Some(user)),
                        Err(e) if e.is_not_found() => Ok(None),
                        Err(e) => Err(e),
                    }
                },
            )
            .await?;

        found.ok_or_else(|| DomainError::not_found(format!("user {}", id)))
    }

    async fn get_users_by_name(&self, name: &str) -> Result<Vec<User>, DomainError> {
        self.read_through(
            CacheKey::UsersByName(name.to_string()),
            &self.name_flights,
            |ttl, _| ttl.users_by_name_secs,
            move || self.inner.get_users_by_name(name),
        )
        .await
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.inner.list_users().await
    }

    async fn get_user_articles(&self, user_id: &UserId) -> Result<Vec<Article>, DomainError> {
        self.read_through(
            CacheKey::UserArticles(*user_id),
            &self.article_flights,
            |ttl, _| ttl.user_articles_secs,
            move || self.inner.get_user_articles(user_id),
        )
        .await
    }
}
