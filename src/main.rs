use clap::Parser;
use articles_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::prepare(&cli.global)?;

    match cli.command {
        Command::Seed(args) => cli::seed::run(&config, args).await,
        Command::Bench(args) => cli::bench::run(&config, args).await,
        Command::LoadTest(args) => cli::load_test::run(&config, args).await,
        Command::GetUser(args) => cli::query::get_user(&config, args).await,
        Command::UsersByName(args) => cli::query::users_by_name(&config, args).await,
        Command::UserArticles(args) => cli::query::user_articles(&config, args).await,
        Command::ListUsers => cli::query::list_users(&config).await,
    }
}
