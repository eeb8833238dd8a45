//! Uncached repository reading straight from the store

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::user::{Article, User, UserId, UserRepository, UserStore};
use crate::domain::DomainError;

/// Repository that queries the store on every call
///
/// Enforces the single-row cardinality of `get_user`; everything else is
/// passed through as returned by the store.
pub struct StoreUserRepository {
    store: Arc<dyn UserStore>,
}

impl std::fmt::Debug for StoreUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreUserRepository").finish_non_exhaustive()
    }
}

impl StoreUserRepository {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

fn single_row(id: &UserId, mut rows: Vec<User>) -> Result<User, DomainError> {
    match rows.len() {
        0 => Err(DomainError::not_found(format!("user {}", id))),
        1 => Ok(rows.remove(0)),
        n => Err(DomainError::multiple_found(format!(
            "{} users share id {}",
            n, id
        ))),
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn get_user(&self, id: &UserId) -> Result<User, DomainError> {
        let rows = self.store.find_users_by_id(id).await?;
        single_row(id, rows)
    }

    async fn get_users_by_name(&self, name: &str) -> Result<Vec<User>, DomainError> {
        self.store.find_users_by_name(name).await
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.store.find_all_users().await
    }

    async fn get_user_articles(&self, user_id: &UserId) -> Result<Vec<Article>, DomainError> {
        self.store.find_articles_by_user(user_id).await
    }
}
