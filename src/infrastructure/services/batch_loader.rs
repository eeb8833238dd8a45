//! Transactional bulk loader for synthetic users and articles

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::domain::loader::{
    ArticleRowGenerator, BatchStore, BatchTransaction, ReferencePools, RowGenerator,
    UserRowGenerator,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_bulk_batch;

/// `[loader]` configuration section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Rows per round trip
    pub batch_size: usize,
    pub users: usize,
    pub articles: usize,
    /// JSON file holding the `names`, `chemical_elements` and `shoes` pools
    pub data_file: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            users: 4000,
            articles: 10000,
            data_file: PathBuf::from("data/reference.json"),
        }
    }
}

/// Outcome of one committed phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub table: &'static str,
    pub rows: usize,
    pub batches: usize,
    #[serde(with = "millis")]
    pub elapsed: Duration,
}

/// Outcome of a full users-then-articles job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub users: LoadReport,
    pub articles: LoadReport,
}

mod millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}

/// Writes generated rows in fixed-size batches, one transaction per phase
pub struct BatchLoader {
    store: Arc<dyn BatchStore>,
    batch_size: usize,
}

impl std::fmt::Debug for BatchLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLoader")
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl BatchLoader {
    pub fn new(store: Arc<dyn BatchStore>) -> Self {
        Self {
            store,
            batch_size: LoaderConfig::default().batch_size,
        }
    }

    /// A zero batch size is treated as one row per batch
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Generates `count` rows into `table` inside one transaction
    ///
    /// The transaction is committed only if every row was generated and
    /// every batch accepted; on any failure it is rolled back and the
    /// failure returned.
    pub async fn write_batches(
        &self,
        table: &'static str,
        count: usize,
        generator: &mut dyn RowGenerator,
    ) -> Result<LoadReport, DomainError> {
        let started = Instant::now();
        let mut tx = self.store.begin().await?;

        match self.fill(&mut *tx, table, count, generator).await {
            Ok(batches) => {
                tx.commit().await?;

                let report = LoadReport {
                    table,
                    rows: count,
                    batches,
                    elapsed: started.elapsed(),
                };
                info!(
                    table,
                    rows = report.rows,
                    batches = report.batches,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "Bulk load committed"
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    error!(table, error = %rollback_error, "Failed to roll back bulk load");
                }
                error!(table, error = %e, "Bulk load aborted");
                Err(e)
            }
        }
    }

    async fn fill(
        &self,
        tx: &mut dyn BatchTransaction,
        table: &'static str,
        count: usize,
        generator: &mut dyn RowGenerator,
    ) -> Result<usize, DomainError> {
        let mut batches = 0;

        for _ in 0..count {
            tx.queue(generator.next_row()?);

            if tx.queued() == self.batch_size {
                self.submit(tx, table, batches + 1).await?;
                batches += 1;
            }
        }

        if tx.queued() > 0 {
            self.submit(tx, table, batches + 1).await?;
            batches += 1;
        }

        Ok(batches)
    }

    async fn submit(
        &self,
        tx: &mut dyn BatchTransaction,
        table: &'static str,
        batch: usize,
    ) -> Result<(), DomainError> {
        let rows = tx.queued();
        let started = Instant::now();

        tx.submit_batch().await?;

        let elapsed = started.elapsed();
        debug!(table, batch, rows, elapsed_ms = elapsed.as_millis() as u64, "Batch submitted");
        record_bulk_batch(table, rows, elapsed);
        Ok(())
    }

    /// Users phase, a fresh read of committed user ids, then articles phase
    ///
    /// The phases commit independently: an articles failure leaves the
    /// committed users in place.
    pub async fn seed(
        &self,
        users: usize,
        articles: usize,
        pools: Arc<ReferencePools>,
    ) -> Result<SeedReport, DomainError> {
        let mut user_rows = UserRowGenerator::new(Arc::clone(&pools));
        let users = self.write_batches("users", users, &mut user_rows).await?;

        let user_ids = self.store.fetch_user_ids().await?;
        debug!(owners = user_ids.len(), "Fetched committed user ids");

        let mut article_rows = ArticleRowGenerator::new(pools, user_ids);
        let articles = self
            .write_batches("articles", articles, &mut article_rows)
            .await?;

        Ok(SeedReport { users, articles })
    }
}
