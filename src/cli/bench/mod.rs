//! Bench command - repeats the bulk load and reports throughput

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::services::SeedReport;

use super::seed::{load_pools, JobArgs};

/// Arguments for the bench command
#[derive(Args, Clone, Debug)]
pub struct BenchArgs {
    /// Number of full seed runs
    #[arg(long, default_value_t = 3)]
    pub iterations: usize,

    #[command(flatten)]
    pub job: JobArgs,
}

#[derive(Debug, Serialize)]
struct BenchSummary {
    iterations: usize,
    rows: usize,
    elapsed_ms: u64,
    rows_per_sec: f64,
    runs: Vec<SeedReport>,
}

impl BenchSummary {
    fn new(runs: Vec<SeedReport>) -> Self {
        let rows = runs
            .iter()
            .map(|r| r.users.rows + r.articles.rows)
            .sum::<usize>();
        let elapsed = runs
            .iter()
            .map(|r| r.users.elapsed + r.articles.elapsed)
            .sum::<std::time::Duration>();
        let secs = elapsed.as_secs_f64();

        Self {
            iterations: runs.len(),
            rows,
            elapsed_ms: elapsed.as_millis() as u64,
            rows_per_sec: if secs > 0.0 { rows as f64 / secs } else { 0.0 },
            runs,
        }
    }
}

/// Run the bench command
pub async fn run(config: &AppConfig, args: BenchArgs) -> anyhow::Result<()> {
    let config = args.job.apply(config.clone());
    let pools = load_pools(&config).await?;

    let state = crate::create_app_state(&config).await?;
    state.stores.ensure_schema().await?;

    let mut runs = Vec::with_capacity(args.iterations);
    for iteration in 1..=args.iterations {
        let report = match state
            .loader
            .seed(config.loader.users, config.loader.articles, pools.clone())
            .await
        {
            Ok(report) => report,
            Err(e) => {
                state.stores.close().await;
                return Err(e.into());
            }
        };

        info!(
            iteration,
            users_ms = report.users.elapsed.as_millis() as u64,
            articles_ms = report.articles.elapsed.as_millis() as u64,
            "Bench iteration finished"
        );
        runs.push(report);
    }
    state.stores.close().await;

    super::print_json(&BenchSummary::new(runs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::services::LoadReport;
    use std::time::Duration;

    fn report(rows: usize, millis: u64) -> LoadReport {
        LoadReport {
            table: "users",
            rows,
            batches: 1,
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_summary_throughput() {
        let run = SeedReport {
            users: report(100, 250),
            articles: report(300, 750),
        };

        let summary = BenchSummary::new(vec![run, run]);

        assert_eq!(summary.iterations, 2);
        assert_eq!(summary.rows, 800);
        assert_eq!(summary.elapsed_ms, 2000);
        assert!((summary.rows_per_sec - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_without_runs() {
        let summary = BenchSummary::new(Vec::new());
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.rows_per_sec, 0.0);
    }
}
