//! Cache factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::domain::DomainError;
use crate::domain::cache::Cache;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};
use super::tiered::{TieredCache, TieredCacheConfig};

/// Supported cache types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// Process-local moka cache
    #[default]
    #[serde(alias = "in_memory")]
    Memory,
    /// Redis only
    Redis,
    /// Local moka tier in front of Redis
    Tiered,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::Memory => write!(f, "memory"),
            CacheType::Redis => write!(f, "redis"),
            CacheType::Tiered => write!(f, "tiered"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in_memory" | "inmemory" => Ok(CacheType::Memory),
            "redis" => Ok(CacheType::Redis),
            "tiered" => Ok(CacheType::Tiered),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache type: {}. Valid types: memory, redis, tiered",
                s
            ))),
        }
    }
}

/// `[cache]` configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheType,
    /// Redis URL (required for the redis and tiered backends)
    pub redis_url: Option<String>,
    /// Key prefix for namespacing in Redis
    pub key_prefix: Option<String>,
    pub redis_connect_timeout_secs: u64,
    /// Entries held by a process-local tier
    pub local_capacity: u64,
    /// Lifetime cap of a process-local entry
    pub local_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheType::Memory,
            redis_url: None,
            key_prefix: None,
            redis_connect_timeout_secs: 5,
            local_capacity: 1000,
            local_ttl_secs: 60,
        }
    }
}

impl CacheConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn tiered(url: impl Into<String>) -> Self {
        Self {
            backend: CacheType::Tiered,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_local_capacity(mut self, capacity: u64) -> Self {
        self.local_capacity = capacity;
        self
    }

    fn redis_config(&self) -> Result<RedisCacheConfig, DomainError> {
        let url = self.redis_url.clone().ok_or_else(|| {
            DomainError::configuration(format!(
                "Redis URL is required for the {} cache backend",
                self.backend
            ))
        })?;

        let mut config = RedisCacheConfig::new(url).with_connection_timeout(Duration::from_secs(
            self.redis_connect_timeout_secs,
        ));

        if let Some(prefix) = &self.key_prefix {
            config = config.with_key_prefix(prefix.clone());
        }

        Ok(config)
    }
}

/// Factory for creating cache instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a cache instance based on configuration
    pub async fn create(&self, config: &CacheConfig) -> Result<Arc<dyn Cache>, DomainError> {
        info!(backend = %config.backend, "Creating cache");

        match config.backend {
            CacheType::Memory => {
                let cache = InMemoryCache::with_config(
                    InMemoryCacheConfig::default().with_max_capacity(config.local_capacity),
                );
                Ok(Arc::new(cache))
            }
            CacheType::Redis => {
                let cache = RedisCache::new(config.redis_config()?).await?;
                Ok(Arc::new(cache))
            }
            CacheType::Tiered => {
                let remote = RedisCache::new(config.redis_config()?).await?;
                let cache = TieredCache::new(
                    Arc::new(remote),
                    TieredCacheConfig {
                        local_capacity: config.local_capacity,
                        local_ttl: Duration::from_secs(config.local_ttl_secs),
                    },
                );
                Ok(Arc::new(cache))
            }
        }
    }
}
