//! User read ports
//!
//! `UserStore` is the raw query executor: every method returns the row set
//! as the relational store produced it. `UserRepository` is what handlers
//! consume, with single-row cardinality enforced and caching layered on top.

use async_trait::async_trait;

use super::entity::{Article, User, UserId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Parameterized reads against the source of truth
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All rows whose id matches. More than one row is an integrity violation
    /// the caller has to detect.
    async fn find_users_by_id(&self, id: &UserId) -> Result<Vec<User>, DomainError>;

    async fn find_users_by_name(&self, name: &str) -> Result<Vec<User>, DomainError>;

    async fn find_all_users(&self) -> Result<Vec<User>, DomainError>;

    async fn find_articles_by_user(&self, user_id: &UserId) -> Result<Vec<Article>, DomainError>;
}

/// Read operations exposed to the request-handling layer
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exactly one user, or `NotFound` / `MultipleFound`
    async fn get_user(&self, id: &UserId) -> Result<User, DomainError>;

    /// Users sharing a name; an empty result is valid
    async fn get_users_by_name(&self, name: &str) -> Result<Vec<User>, DomainError>;

    async fn list_users(&self) -> Result<Vec<User>, DomainError>;

    async fn get_user_articles(&self, user_id: &UserId) -> Result<Vec<Article>, DomainError>;
}
