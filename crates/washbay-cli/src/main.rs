mod db;
mod nearby;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "washbay-cli")]
#[command(about = "Washbay store directory command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Validate a YAML stores file and upsert it into the database
    Seed {
        /// Defaults to `WASHBAY_STORES_PATH`
        #[arg(long)]
        file: Option<PathBuf>,
        /// Validate only; do not touch the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a nearby-store search and print the ranked results
    Nearby(NearbyArgs),
}

#[derive(Debug, clap::Args)]
struct NearbyArgs {
    #[arg(long, allow_negative_numbers = true)]
    latitude: f64,
    #[arg(long, allow_negative_numbers = true)]
    longitude: f64,
    #[arg(long, default_value_t = 5000.0)]
    max_distance_m: f64,
    #[arg(long, default_value_t = 0.0)]
    min_rating: f64,
    #[arg(long, default_value_t = 20)]
    limit: u32,
    #[arg(long)]
    open_now: bool,
    #[arg(long)]
    available_only: bool,
    /// Case-insensitive service name fragment; repeatable
    #[arg(long = "service")]
    services: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("washbay-cli: run with --help to list commands");
        return Ok(());
    };

    // A dry-run seed only reads the stores file, so it must work without DATABASE_URL.
    if let Commands::Seed {
        file,
        dry_run: true,
    } = command
    {
        init_tracing("info")?;
        let path = file.unwrap_or_else(washbay_core::stores_path_from_env);
        let count = db::check_seed(&path)?;
        println!(
            "{count} store(s) in {} are valid; dry run, nothing written",
            path.display()
        );
        return Ok(());
    }

    let config = washbay_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    match command {
        Commands::Migrate => db::run_migrate(&config).await,
        Commands::Seed { file, .. } => {
            let path = file.unwrap_or_else(|| config.stores_path.clone());
            db::run_seed(&config, &path).await
        }
        Commands::Nearby(args) => nearby::run_nearby(&config, args).await,
    }
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[cfg(test)]
mod tests;
