//! Row generators for the bulk loader

use std::sync::Arc;

use super::reference::{ReferencePools, pick};
use super::row::{NewArticle, NewRow, NewUser};
use crate::domain::DomainError;
use crate::domain::user::UserId;

/// Produces one insert statement per call
///
/// Generators only read immutable reference data and draw randomness, so a
/// failed job can simply be run again.
pub trait RowGenerator: Send {
    fn next_row(&mut self) -> Result<NewRow, DomainError>;
}

impl<F> RowGenerator for F
where
    F: FnMut() -> Result<NewRow, DomainError> + Send,
{
    fn next_row(&mut self) -> Result<NewRow, DomainError> {
        self()
    }
}

/// Users named after a random entry of the `names` pool
#[derive(Debug, Clone)]
pub struct UserRowGenerator {
    pools: Arc<ReferencePools>,
}

impl UserRowGenerator {
    pub fn new(pools: Arc<ReferencePools>) -> Self {
        Self { pools }
    }
}

impl RowGenerator for UserRowGenerator {
    fn next_row(&mut self) -> Result<NewRow, DomainError> {
        let name = pick(&self.pools.names, "names")?;

        Ok(NewUser { name: name.clone() }.into())
    }
}

/// Articles owned by a random committed user, titled "<shoe> <element>"
#[derive(Debug, Clone)]
pub struct ArticleRowGenerator {
    pools: Arc<ReferencePools>,
    user_ids: Vec<UserId>,
}

impl ArticleRowGenerator {
    /// `user_ids` must come from a read made after the users were committed
    pub fn new(pools: Arc<ReferencePools>, user_ids: Vec<UserId>) -> Self {
        Self { pools, user_ids }
    }
}

impl RowGenerator for ArticleRowGenerator {
    fn next_row(&mut self) -> Result<NewRow, DomainError> {
        let user_id = pick(&self.user_ids, "user ids")?;
        let shoe = pick(&self.pools.shoes, "shoes")?;
        let element = pick(&self.pools.chemical_elements, "chemical_elements")?;

        Ok(NewArticle {
            user_id: *user_id,
            title: format!("{} {}", shoe, element),
            text: None,
        }
        .into())
    }
}
