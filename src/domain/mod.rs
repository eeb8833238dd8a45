//! Domain layer - entities, errors and the ports the services depend on

pub mod cache;
pub mod error;
pub mod loader;
pub mod user;

pub use cache::{Cache, CacheExt, CacheKey, CachedValue};
pub use error::DomainError;
pub use loader::{
    ArticleRowGenerator, BatchStore, BatchTransaction, NewArticle, NewRow, NewUser,
    ReferencePools, RowGenerator, UserRowGenerator,
};
pub use user::{Article, ArticleId, User, UserId, UserRepository, UserStore};
