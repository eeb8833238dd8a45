//! Cache infrastructure - Cache implementations

mod factory;
mod in_memory;
mod redis;
mod tiered;

pub use factory::{CacheConfig, CacheFactory, CacheType};
pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use redis::{RedisCache, RedisCacheConfig};
pub use tiered::{TieredCache, TieredCacheConfig};
