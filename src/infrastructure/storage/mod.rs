//! Storage infrastructure - store implementations

mod factory;
mod in_memory;
mod postgres;

pub use factory::{StorageConfig, StorageFactory, StorageType, Stores};
pub use in_memory::{BatchRecord, InMemoryStore, InMemoryTransaction, InjectedFailure};
pub use postgres::{PostgresBatchTransaction, PostgresConfig, PostgresStore};
