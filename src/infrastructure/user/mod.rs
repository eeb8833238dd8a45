//! User infrastructure module
//!
//! Repository implementations over a [`UserStore`](crate::domain::user::UserStore):
//! a plain one that enforces row cardinality and a cache-aside decorator.

mod cached_repository;
mod single_flight;
mod store_repository;

pub use cached_repository::{CacheTtlConfig, CachedRepositoryConfig, CachedUserRepository};
pub use single_flight::SingleFlight;
pub use store_repository::StoreUserRepository;
