//! CLI module for articles-cache
//!
//! Provides subcommands for loading data and reading it back:
//! - `seed`: bulk load users then articles
//! - `bench`: repeat the bulk load and report throughput
//! - `load-test`: concurrent name lookups through the cache
//! - `get-user`, `users-by-name`, `user-articles`, `list-users`: single reads

pub mod bench;
pub mod load_test;
pub mod query;
pub mod seed;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::cache::CacheType;
use crate::infrastructure::logging;
use crate::infrastructure::storage::StorageType;

/// articles-cache - cached user/article reads and transactional bulk loading
#[derive(Parser)]
#[command(name = "articles-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides applied on top of the loaded configuration
#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Store backend (memory, postgres)
    #[arg(long, global = true)]
    pub store: Option<StorageType>,

    /// Cache backend (memory, redis, tiered)
    #[arg(long, global = true)]
    pub cache: Option<CacheType>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the schema and load synthetic users and articles
    Seed(seed::SeedArgs),

    /// Run the bulk load repeatedly and report rows per second
    Bench(bench::BenchArgs),

    /// Hammer `users-by-name` lookups from concurrent workers
    LoadTest(load_test::LoadTestArgs),

    /// Fetch one user by id
    GetUser(query::UserIdArgs),

    /// Fetch every user with the given name
    UsersByName(query::NameArgs),

    /// Fetch the articles of a user
    UserArticles(query::UserIdArgs),

    /// Fetch every user, bypassing the cache
    ListUsers,
}

/// Loads `.env` and the configuration, applies the overrides and starts
/// logging
pub fn prepare(global: &GlobalArgs) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load()?;
    apply_overrides(&mut config, global);
    logging::init_logging(&config.logging);

    Ok(config)
}

fn apply_overrides(config: &mut AppConfig, global: &GlobalArgs) {
    if let Some(store) = global.store {
        config.database.backend = store;
    }
    if let Some(cache) = global.cache {
        config.cache.backend.backend = cache;
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_command() {
        let cli = Cli::parse_from([
            "articles-cache",
            "--store",
            "memory",
            "users-by-name",
            "Ann",
        ]);

        assert_eq!(cli.global.store, Some(StorageType::Memory));
        assert!(matches!(cli.command, Command::UsersByName(ref args) if args.name == "Ann"));
    }

    #[test]
    fn test_global_flag_after_subcommand() {
        let cli = Cli::parse_from(["articles-cache", "list-users", "--cache", "tiered"]);

        assert_eq!(cli.global.cache, Some(CacheType::Tiered));
        assert!(matches!(cli.command, Command::ListUsers));
    }

    #[test]
    fn test_invalid_store_rejected() {
        let result = Cli::try_parse_from(["articles-cache", "--store", "sqlite", "list-users"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            &GlobalArgs {
                store: Some(StorageType::Memory),
                cache: Some(CacheType::Redis),
            },
        );

        assert_eq!(config.database.backend, StorageType::Memory);
        assert_eq!(config.cache.backend.backend, CacheType::Redis);
    }
}
