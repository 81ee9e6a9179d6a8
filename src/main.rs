//! Giferator-Disco main entry point
//!
//! Scans one range of candidate IDs and writes the discoveries to a gzip file:
//!
//! ```text
//! giferator-disco 0 100 myfile.txt.gz
//! ```

use anyhow::Context;
use clap::Parser;
use giferator_disco::config::{load_config_with_hash, Config, ScanMode};
use giferator_disco::crawler::run_scan;
use giferator_disco::output::log_statistics;
use giferator_disco::range::ScanRange;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Giferator-Disco: find live IDs in a numeric range
///
/// Probes every ID in [START, END] against the configured endpoint and writes
/// one `kind:value` line per discovery into a gzip-compressed OUTPUT file.
/// Exits non-zero if any ID keeps failing past the retry budget.
#[derive(Parser, Debug)]
#[command(name = "giferator-disco")]
#[command(version)]
#[command(about = "Discover live IDs in a numeric range", long_about = None)]
struct Cli {
    /// First ID to probe (inclusive)
    #[arg(value_name = "START")]
    start: u64,

    /// Last ID to probe (inclusive, must be >= START)
    #[arg(value_name = "END")]
    end: u64,

    /// Output file, truncated and written as gzip (e.g. myfile.txt.gz)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Only record which IDs exist (`gif:<id>` lines)
    #[arg(long)]
    existence_only: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let range = ScanRange::new(cli.start, cli.end)?;

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if cli.existence_only {
        config.output.mode = ScanMode::Existence;
    }

    tracing::info!(
        "Starting {} {} -> {}",
        range.start(),
        range.end(),
        cli.output.display()
    );

    let stats = run_scan(&config, range, &cli.output, config_hash)
        .await
        .with_context(|| format!("scan of range {} failed", range))?;

    log_statistics(&stats);
    tracing::info!("Done");

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("giferator_disco=info,warn"),
            1 => EnvFilter::new("giferator_disco=debug,info"),
            2 => EnvFilter::new("giferator_disco=trace,debug"),
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
