//! Observability infrastructure - metric recording

mod metrics;

pub use metrics::{record_bulk_batch, record_cache_request, CacheOutcome};
