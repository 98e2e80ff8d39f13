use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use ctis_scraper::api::{CtisClient, GeocodingClient};
use ctis_scraper::config::ScraperConfig;
use ctis_scraper::db;
use ctis_scraper::{geocode, scrape};

#[derive(Parser)]
#[command(name = "ctis-scraper")]
#[command(about = "Scrapes the EU CTIS portal into a local SQLite database")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/ctis-scraper/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Environment profile (prod or dev)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile all trials from the CTIS portal into the database
    Scrape {
        /// Clear previously scraped trial data first; locations and run
        /// history survive
        #[arg(long)]
        fresh: bool,
    },
    /// Geocode stored locations that have never been attempted
    UpdateCoordinates {
        /// Maximum number of locations to attempt this run
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = ScraperConfig::load(cli.config.as_ref(), cli.env.as_deref())?;
    info!(env = %config.env, db = %config.db_path.display(), "loaded config");

    let mut conn = db::open_or_create(&config.db_path)?;
    db::migrations::migrate(&conn)?;

    match cli.command {
        Commands::Scrape { fresh } => {
            let client = CtisClient::new(
                &config.api.base_url,
                config.api.page_size,
                config.api.timeout(),
            )?;
            scrape::run(&mut conn, &client, fresh).await?;
        }
        Commands::UpdateCoordinates { limit } => {
            let client = GeocodingClient::new(
                &config.geocoding.base_url,
                config.geocoding.contact.as_deref(),
                config.api.timeout(),
            )?;
            geocode::run(&conn, &client, limit, config.geocoding.delay()).await?;
        }
    }

    Ok(())
}
