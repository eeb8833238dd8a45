//! Collapses concurrent loads of the same key into one

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::domain::DomainError;

type Flight<T> = Arc<OnceCell<Result<T, DomainError>>>;

/// Table of in-flight loads keyed by cache key
///
/// The first caller for a key runs the load; callers arriving while it is
/// running await the same result. The entry is removed once the load
/// finishes, so a later call starts a fresh flight.
#[derive(Debug)]
pub struct SingleFlight<T> {
    flights: Mutex<HashMap<String, Flight<T>>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            flights: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run<F, Fut>(&self, key: &str, load: F) -> Result<T, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let flight = {
            let mut flights = self
                .flights
                .lock()
                .map_err(|_| DomainError::cache("single-flight table lock poisoned"))?;
            Arc::clone(flights.entry(key.to_string()).or_default())
        };

        let result = flight.get_or_init(load).await.clone();

        if let Ok(mut flights) = self.flights.lock() {
            if flights
                .get(key)
                .is_some_and(|current| Arc::ptr_eq(current, &flight))
            {
                flights.remove(key);
            }
        }

        result
    }

    /// Number of loads currently running
    pub fn in_flight(&self) -> usize {
        self.flights.lock().map(|f| f.len()).unwrap_or(0)
    }
}
