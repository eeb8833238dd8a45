//! Reference data the synthetic rows are drawn from

use std::path::Path;

use serde::Deserialize;

use super::random::random_index;
use crate::domain::DomainError;

/// Candidate strings per category, loaded once before a job starts and
/// read-only afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReferencePools {
    pub names: Vec<String>,
    pub chemical_elements: Vec<String>,
    pub shoes: Vec<String>,
}

impl ReferencePools {
    /// Reads the pools from a JSON file. A missing or malformed file aborts
    /// the job before any transaction is opened.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::configuration(format!(
                "Failed to read the data file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, DomainError> {
        serde_json::from_str(contents).map_err(|e| {
            DomainError::configuration(format!("Failed to parse the data file: {}", e))
        })
    }
}

/// Uniformly random element of `pool`; an empty pool is a generation failure
pub fn pick<'a, T>(pool: &'a [T], category: &str) -> Result<&'a T, DomainError> {
    let idx = random_index(pool.len())?;

    pool.get(idx).ok_or_else(|| {
        DomainError::generation(format!("reference pool '{}' is empty", category))
    })
}
