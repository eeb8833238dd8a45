use serde::Deserialize;

use crate::infrastructure::cache::CacheConfig;
use crate::infrastructure::services::LoaderConfig;
use crate::infrastructure::storage::StorageConfig;
use crate::infrastructure::user::CachedRepositoryConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub database: StorageConfig,
    pub cache: CacheSettings,
    pub loader: LoaderConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// `[cache]` section: the cache backend and the behavior of the caching
/// repository share one table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    #[serde(flatten)]
    pub backend: CacheConfig,
    #[serde(flatten)]
    pub repository: CachedRepositoryConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::CacheType;
    use crate::infrastructure::storage::StorageType;

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database.backend, StorageType::Postgres);
        assert_eq!(config.cache.backend.backend, CacheType::Memory);
        assert!(config.cache.repository.single_flight);
        assert!(!config.cache.repository.swallow_populate_errors);
        assert_eq!(config.cache.repository.ttl.user_secs, 3600);
        assert_eq!(config.loader.batch_size, 1000);
    }

    #[test]
    fn test_cache_section_feeds_both_halves() {
        let config = from_toml(
            r#"
            [cache]
            backend = "tiered"
            redis_url = "redis://cache:6379"
            local_capacity = 250
            single_flight = false

            [cache.ttl]
            user_secs = 60
            "#,
        );

        assert_eq!(config.cache.backend.backend, CacheType::Tiered);
        assert_eq!(config.cache.backend.local_capacity, 250);
        assert!(!config.cache.repository.single_flight);
        assert_eq!(config.cache.repository.ttl.user_secs, 60);
        assert_eq!(config.cache.repository.ttl.users_by_name_secs, 5);
    }

    #[test]
    fn test_database_and_loader_sections() {
        let config = from_toml(
            r#"
            [logging]
            format = "json"

            [database]
            backend = "memory"

            [loader]
            batch_size = 500
            users = 10
            "#,
        );

        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.database.backend, StorageType::Memory);
        assert_eq!(config.loader.batch_size, 500);
        assert_eq!(config.loader.users, 10);
        assert_eq!(config.loader.articles, 10000);
    }
}
