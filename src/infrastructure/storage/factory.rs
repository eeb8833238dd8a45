//! Storage factory for runtime store selection

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::domain::loader::BatchStore;
use crate::domain::user::UserStore;
use crate::domain::DomainError;

use super::in_memory::InMemoryStore;
use super::postgres::{PostgresConfig, PostgresStore};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// In-memory store (for testing/development)
    #[serde(alias = "in_memory")]
    Memory,
    /// PostgreSQL store
    #[default]
    #[serde(alias = "postgresql")]
    Postgres,
}

impl std::str::FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::Memory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(DomainError::configuration(format!(
                "Unknown storage type: {}. Valid types: memory, postgres",
                s
            ))),
        }
    }
}

/// `[database]` configuration section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageType,
    #[serde(flatten)]
    pub postgres: PostgresConfig,
}

/// The read and write faces of one store, sharing its pool
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub batches: Arc<dyn BatchStore>,
    postgres: Option<PostgresStore>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("postgres", &self.postgres.is_some())
            .finish()
    }
}

impl Stores {
    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            batches: store,
            postgres: None,
        }
    }

    pub fn postgres(store: PostgresStore) -> Self {
        let shared = Arc::new(store.clone());
        Self {
            users: shared.clone(),
            batches: shared,
            postgres: Some(store),
        }
    }

    /// Creates the schema when backed by PostgreSQL; a no-op otherwise
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        match &self.postgres {
            Some(store) => store.ensure_schema().await,
            None => Ok(()),
        }
    }

    /// Closes the connection pool, if any
    pub async fn close(&self) {
        if let Some(store) = &self.postgres {
            store.close().await;
        }
    }
}

/// Factory for creating store instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StorageConfig) -> Result<Stores, DomainError> {
        info!(backend = ?config.backend, "Creating store");

        match config.backend {
            StorageType::Memory => Ok(Stores::in_memory(InMemoryStore::new())),
            StorageType::Postgres => {
                let store = PostgresStore::connect(&config.postgres).await?;
                Ok(Stores::postgres(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!("memory".parse::<StorageType>().unwrap(), StorageType::Memory);
        assert_eq!("pg".parse::<StorageType>().unwrap(), StorageType::Postgres);
        assert!("sqlite".parse::<StorageType>().is_err());
    }

    #[test]
    fn test_storage_config_flattened_postgres() {
        let config: StorageConfig = serde_json::from_str(
            r#"{"backend": "postgres", "url": "postgres://db/app", "max_connections": 3}"#,
        )
        .unwrap();

        assert_eq!(config.backend, StorageType::Postgres);
        assert_eq!(config.postgres.url, "postgres://db/app");
        assert_eq!(config.postgres.max_connections, 3);
    }

    #[tokio::test]
    async fn test_create_memory() {
        let config = StorageConfig {
            backend: StorageType::Memory,
            ..Default::default()
        };

        let stores = StorageFactory::create(&config).await.unwrap();
        stores.ensure_schema().await.unwrap();
        assert!(stores.users.find_all_users().await.unwrap().is_empty());
        assert!(stores.batches.fetch_user_ids().await.unwrap().is_empty());
    }
}
