//! Spindex main entry point
//!
//! Command-line interface for the crawl-and-index search service.

use clap::Parser;
use spindex::config::load_config;
use spindex::supervisor;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Spindex: a crawl-and-index search service
///
/// Crawls the web breadth-first from a seed URL, indexes term frequencies
/// into PostgreSQL, and serves ranked multi-term queries over HTTP.
#[derive(Parser, Debug)]
#[command(name = "spindex")]
#[command(version)]
#[command(about = "A crawl-and-index search service", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(value_name = "CONFIG", default_value = "config.ini")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Seed URL: {}, max depth: {}, frontend port: {}",
        config.spider.start_url,
        config.spider.max_depth,
        config.searcher.port
    );

    supervisor::run(config).await?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("spindex=info,warn"),
            1 => EnvFilter::new("spindex=debug,info"),
            2 => EnvFilter::new("spindex=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
