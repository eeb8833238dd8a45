//! Infrastructure layer - store, cache and loader implementations

pub mod cache;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;
pub mod user;
