//! Metric recording helpers
//!
//! Only the `metrics` facade is used here. Without an installed recorder
//! every call is a no-op.

use std::time::Duration;

use metrics::{counter, histogram};

/// Outcome of a cache lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    /// A cached "no such row" marker
    NegativeHit,
    Miss,
    Error,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::NegativeHit => "negative_hit",
            CacheOutcome::Miss => "miss",
            CacheOutcome::Error => "error",
        }
    }
}

/// Record a cache lookup for one key shape (`user`, `users-name`, ...)
pub fn record_cache_request(shape: &'static str, outcome: CacheOutcome) {
    let labels = [("shape", shape), ("result", outcome.as_str())];

    counter!("cache_requests_total", &labels).increment(1);
}

/// Record one submitted loader batch
pub fn record_bulk_batch(table: &'static str, rows: usize, duration: Duration) {
    let labels = [("table", table)];

    counter!("bulk_load_batches_total", &labels).increment(1);
    counter!("bulk_load_rows_total", &labels).increment(rows as u64);
    histogram!("bulk_load_batch_duration_seconds", &labels).record(duration.as_secs_f64());
}
