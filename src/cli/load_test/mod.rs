//! Load-test command - concurrent `users-by-name` lookups for a fixed time

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::domain::loader::{pick, ReferencePools};
use crate::domain::UserRepository;

use super::seed::{load_pools, JobArgs};

/// Arguments for the load-test command
#[derive(Args, Clone, Debug)]
pub struct LoadTestArgs {
    /// Concurrent workers
    #[arg(long, default_value_t = 50)]
    pub workers: usize,

    /// How long the workers keep issuing lookups
    #[arg(long, default_value_t = 10)]
    pub duration_secs: u64,

    /// Seed the store before the run (needed with `--store memory`)
    #[arg(long)]
    pub seed: bool,

    #[command(flatten)]
    pub job: JobArgs,
}

#[derive(Debug, Serialize)]
struct LoadTestReport {
    workers: usize,
    operations: u64,
    failures: u64,
    elapsed_ms: u64,
    qps: u64,
}

/// Issues lookups of random names until `deadline`; failed lookups are
/// counted and skipped
async fn worker(
    users: Arc<dyn UserRepository>,
    pools: Arc<ReferencePools>,
    deadline: Instant,
    operations: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
) {
    while Instant::now() < deadline {
        let result = match pick(&pools.names, "names") {
            Ok(name) => users.get_users_by_name(name).await.map(|_| ()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => operations.fetch_add(1, Ordering::Relaxed),
            Err(e) => {
                debug!(error = %e, "Lookup failed");
                failures.fetch_add(1, Ordering::Relaxed)
            }
        };
        tokio::task::yield_now().await;
    }
}

/// Run the load-test command
pub async fn run(config: &AppConfig, args: LoadTestArgs) -> anyhow::Result<()> {
    let config = args.job.apply(config.clone());
    let pools = load_pools(&config).await?;

    let state = crate::create_app_state(&config).await?;
    if args.seed {
        state.stores.ensure_schema().await?;
        state
            .loader
            .seed(config.loader.users, config.loader.articles, pools.clone())
            .await?;
    }

    let operations = Arc::new(AtomicU64::new(0));
    let failures = Arc::new(AtomicU64::new(0));
    let started = Instant::now();
    let deadline = started + Duration::from_secs(args.duration_secs);

    info!(workers = args.workers, duration_secs = args.duration_secs, "Starting load test");

    let handles: Vec<_> = (0..args.workers)
        .map(|_| {
            tokio::spawn(worker(
                state.users.clone(),
                pools.clone(),
                deadline,
                operations.clone(),
                failures.clone(),
            ))
        })
        .collect();

    for handle in handles {
        handle.await?;
    }
    state.stores.close().await;

    let elapsed = started.elapsed();
    let operations = operations.load(Ordering::Relaxed);
    let report = LoadTestReport {
        workers: args.workers,
        operations,
        failures: failures.load(Ordering::Relaxed),
        elapsed_ms: elapsed.as_millis() as u64,
        qps: qps(operations, elapsed),
    };

    super::print_json(&report)
}

fn qps(operations: u64, elapsed: Duration) -> u64 {
    match elapsed.as_secs() {
        0 => operations,
        secs => operations / secs,
    }
}
