// src/bin/cli.rs

//! eventscout CLI
//!
//! Local execution entry point for scraping and syncing event listings.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eventscout::{
    error::Result,
    models::Config,
    pipeline::{self, Syncer},
    storage::{EventStore, LocalStore},
};

/// eventscout - Event Listing Scraper
#[derive(Parser, Debug)]
#[command(
    name = "eventscout",
    version,
    about = "Scrapes What's On Sydney listings and syncs them to a local store"
)]
struct Cli {
    /// Path to storage directory containing config and data files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a full pass: scrape the page and reconcile against the store
    Sync,

    /// Scrape only; print candidates without touching the store
    Scrape,

    /// Validate configuration
    Validate,

    /// Show stored record counts by status
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("eventscout starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    config.validate()?;

    let config = Arc::new(config);
    let store = LocalStore::new(&cli.storage_dir);

    match cli.command {
        Command::Sync => {
            let syncer = Syncer::new(Arc::clone(&config), Arc::new(store));
            let outcome = syncer.try_sync().await?;
            log::info!(
                "Pass finished: {} added, {} updated, {} unchanged ({} total)",
                outcome.added,
                outcome.updated,
                outcome.unchanged,
                outcome.total()
            );
        }

        Command::Scrape => {
            let candidates = pipeline::run_scrape(&config).await?;
            log::info!("Scraped {} candidates (dry run):", candidates.len());
            for candidate in &candidates {
                println!(
                    "{}  {}  [{}]",
                    &candidate.fingerprint[..12],
                    candidate.event.title,
                    candidate.event.source_url
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!("Config OK: source {} ({})", config.source.name, config.source.url);
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let events = store.load_all().await?;
            let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
            for event in &events {
                *by_status.entry(event.status.as_str()).or_default() += 1;
            }

            log::info!("{} stored events", events.len());
            for (status, count) in by_status {
                log::info!("  {}: {}", status, count);
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
