//! Transactional batch-write port

use async_trait::async_trait;

use super::row::NewRow;
use crate::domain::DomainError;
use crate::domain::user::UserId;

/// Store that accepts batched writes inside a transaction
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Opens a transaction. Nothing written through it is visible to other
    /// readers until `commit` succeeds.
    async fn begin(&self) -> Result<Box<dyn BatchTransaction>, DomainError>;

    /// Ids of every committed user, read outside any loader transaction
    async fn fetch_user_ids(&self) -> Result<Vec<UserId>, DomainError>;
}

/// An open write transaction with a buffer of queued statements
#[async_trait]
pub trait BatchTransaction: Send {
    /// Appends a statement to the pending batch without any round trip
    fn queue(&mut self, row: NewRow);

    /// Number of statements waiting for the next `submit_batch`
    fn queued(&self) -> usize;

    /// Sends the pending statements as one round trip and empties the buffer
    async fn submit_batch(&mut self) -> Result<(), DomainError>;

    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}
