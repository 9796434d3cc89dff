mod collect;
mod export;
mod upload;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::collect::CollectArgs;

#[derive(Debug, Parser)]
#[command(name = "spicedb")]
#[command(about = "Collect spice variant pricing from vendor storefronts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape vendors and export one CSV of normalized variants
    Collect(CollectArgs),
    /// List vendors in the registry
    Vendors,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = spicedb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Collect(args)) => collect::run_collect(&config, &args).await?,
        Some(Commands::Vendors) => collect::list_vendors(&config)?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}
