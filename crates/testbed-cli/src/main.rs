mod harvest;
mod inspect;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "testbed")]
#[command(about = "Harvest Stack Overflow questions into a snapshot file")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every configured category and write a snapshot.
    Harvest(HarvestArgs),
    /// List configured categories and the search filters derived from them.
    Categories {
        /// Categories file (defaults to `TESTBED_CATEGORIES_PATH`).
        #[arg(long)]
        categories: Option<PathBuf>,
    },
    /// Print totals and the category distribution of a snapshot file.
    Inspect {
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
pub(crate) struct HarvestArgs {
    /// Categories file (defaults to `TESTBED_CATEGORIES_PATH`).
    #[arg(long)]
    categories: Option<PathBuf>,

    /// Snapshot destination (defaults to `TESTBED_SNAPSHOT_PATH`).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Harvest only the named category. Repeatable.
    #[arg(long = "only", value_name = "NAME")]
    only: Vec<String>,

    /// Stop fetching after this many seconds and write what was gathered.
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Print the categories that would be harvested without calling the API.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = testbed_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Harvest(args) => harvest::run_harvest(&config, args).await?,
        Commands::Categories { categories } => {
            let path = categories.unwrap_or_else(|| config.categories_path.clone());
            inspect::print_categories(&path)?;
        }
        Commands::Inspect { path } => inspect::print_snapshot(&path)?,
    }

    Ok(())
}
