//! articles-cache
//!
//! Cache-aside reads of users and their articles over PostgreSQL, with a
//! bounded TinyLFU tier in front of Redis, plus a transactional batch loader
//! that fills the store with synthetic data.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::{Cache, DomainError, UserRepository};
use infrastructure::{
    cache::CacheFactory,
    services::BatchLoader,
    storage::{StorageFactory, Stores},
    user::{CachedUserRepository, StoreUserRepository},
};

/// Everything a command needs, wired from configuration
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub cache: Arc<dyn Cache>,
    pub users: Arc<dyn UserRepository>,
    pub loader: Arc<BatchLoader>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("stores", &self.stores)
            .field("cache", &self.cache)
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

/// Connects the configured store and cache and builds the repositories
pub async fn create_app_state(config: &AppConfig) -> Result<AppState, DomainError> {
    let stores = StorageFactory::create(&config.database).await?;
    create_app_state_with_stores(config, stores).await
}

/// Same as [`create_app_state`] over stores that already exist
pub async fn create_app_state_with_stores(
    config: &AppConfig,
    stores: Stores,
) -> Result<AppState, DomainError> {
    let cache = CacheFactory::new().create(&config.cache.backend).await?;

    let store_repository = Arc::new(StoreUserRepository::new(stores.users.clone()));
    let users = Arc::new(CachedUserRepository::with_config(
        store_repository,
        cache.clone(),
        config.cache.repository.clone(),
    ));

    let loader = BatchLoader::new(stores.batches.clone()).with_batch_size(config.loader.batch_size);

    Ok(AppState {
        stores,
        cache,
        users,
        loader: Arc::new(loader),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ReferencePools;
    use infrastructure::storage::{InMemoryStore, StorageType};

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.backend = StorageType::Memory;
        config
    }

    #[tokio::test]
    async fn test_seed_then_read_through_cache() {
        let state = create_app_state(&memory_config()).await.unwrap();
        let pools = Arc::new(ReferencePools {
            names: vec!["Ann".to_string()],
            chemical_elements: vec!["Neon".to_string()],
            shoes: vec!["Clog".to_string()],
        });

        let report = state.loader.seed(3, 9, pools).await.unwrap();
        assert_eq!(report.users.rows, 3);

        let users = state.users.list_users().await.unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(state.users.get_users_by_name("Ann").await.unwrap().len(), 3);

        let mut articles = 0;
        for user in &users {
            assert_eq!(&state.users.get_user(&user.id).await.unwrap(), user);
            articles += state.users.get_user_articles(&user.id).await.unwrap().len();
        }
        assert_eq!(articles, 9);
        assert!(state.cache.size().await.unwrap() > 0);
    }

    #[tokio::test]
    async fn test_duplicate_ids_surface_multiple_found() {
        let id = domain::UserId::new(uuid::Uuid::new_v4());
        let store = InMemoryStore::with_users(vec![
            domain::User::new(id, "Ann"),
            domain::User::new(id, "Ann"),
        ]);

        let state = create_app_state_with_stores(&memory_config(), Stores::in_memory(store))
            .await
            .unwrap();

        let err = state.users.get_user(&id).await.unwrap_err();
        assert!(matches!(err, DomainError::MultipleFound { .. }));
    }
}
