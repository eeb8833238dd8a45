//! Seed command - creates the schema and bulk loads users then articles

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::ReferencePools;

/// Arguments for the seed command
#[derive(Args, Clone, Debug, Default)]
pub struct SeedArgs {
    #[command(flatten)]
    pub job: JobArgs,
}

/// Loader settings shared by `seed` and `bench`; each overrides `[loader]`
#[derive(Args, Clone, Debug, Default)]
pub struct JobArgs {
    /// Number of users to insert
    #[arg(long)]
    pub users: Option<usize>,

    /// Number of articles to insert
    #[arg(long)]
    pub articles: Option<usize>,

    /// Rows per submitted batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Reference data file with names, chemical elements and shoes
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}

impl JobArgs {
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        let loader = &mut config.loader;
        if let Some(users) = self.users {
            loader.users = users;
        }
        if let Some(articles) = self.articles {
            loader.articles = articles;
        }
        if let Some(batch_size) = self.batch_size {
            loader.batch_size = batch_size;
        }
        if let Some(data_file) = &self.data_file {
            loader.data_file = data_file.clone();
        }
        config
    }
}

/// Loads the reference pools named by `[loader].data_file`
pub async fn load_pools(config: &AppConfig) -> anyhow::Result<Arc<ReferencePools>> {
    let pools = ReferencePools::load(&config.loader.data_file).await?;
    info!(
        names = pools.names.len(),
        chemical_elements = pools.chemical_elements.len(),
        shoes = pools.shoes.len(),
        "Reference data loaded"
    );
    Ok(Arc::new(pools))
}

/// Run the seed command
pub async fn run(config: &AppConfig, args: SeedArgs) -> anyhow::Result<()> {
    let config = args.job.apply(config.clone());
    let pools = load_pools(&config).await?;

    let state = crate::create_app_state(&config).await?;
    state.stores.ensure_schema().await?;

    let result = state
        .loader
        .seed(config.loader.users, config.loader.articles, pools)
        .await;
    state.stores.close().await;

    super::print_json(&result?)
}
