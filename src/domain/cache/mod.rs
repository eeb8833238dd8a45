//! Cache domain - key/value caching abstraction with per-entry TTL

mod key;
mod repository;

pub use key::CacheKey;
pub use repository::{Cache, CacheExt, CachedValue};

#[cfg(test)]
pub use repository::mock::MockCache;
