//! Pagehaul main entry point
//!
//! This is the command-line interface for the pagehaul catalog harvester.

use clap::Parser;
use pagehaul::checkpoint::CheckpointStore;
use pagehaul::config::load_config_with_hash;
use pagehaul::harvest::run_harvest;
use pagehaul::sink::{RecordSink, SqliteSink};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Pagehaul: a crash-safe paginated catalog harvester
///
/// Pagehaul walks a paginated API catalog under a bounded concurrency
/// budget, retries transient failures with backoff, checkpoints progress so
/// interrupted runs resume without re-fetching completed pages, and drains
/// outstanding failures before declaring success.
#[derive(Parser, Debug)]
#[command(name = "pagehaul")]
#[command(version = "0.3.0")]
#[command(about = "A crash-safe paginated catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume from an existing checkpoint (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a fresh harvest, ignoring any existing checkpoint
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the sink database and checkpoint, then exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config, config_hash, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagehaul=info,warn"),
            1 => EnvFilter::new("pagehaul=debug,info"),
            2 => EnvFilter::new("pagehaul=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the harvest plan
fn handle_dry_run(config: &pagehaul::config::Config) {
    println!("=== Pagehaul Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Items per page: {}", config.source.per_page);
    for (key, value) in &config.source.params {
        println!("  Param: {}={}", key, value);
    }

    println!("\nHarvester:");
    println!("  Concurrency: {}", config.harvester.concurrency);
    println!("  Batch size: {}", config.harvester.batch_size);
    println!(
        "  Checkpoint every {} batches",
        config.harvester.checkpoint_interval
    );
    println!("  Max attempts per page: {}", config.harvester.max_attempts);
    println!(
        "  Request timeout: {}s",
        config.harvester.request_timeout_secs
    );
    println!("  Backoff unit: {}ms", config.harvester.backoff_unit_ms);
    println!("  Batch pause: {}ms", config.harvester.batch_pause_ms);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.harvester_name);
    println!("  Version: {}", config.user_agent.harvester_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Checkpoint: {}", config.output.checkpoint_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows sink and checkpoint statistics
fn handle_stats(config: &pagehaul::config::Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let sink = SqliteSink::new(Path::new(&config.output.database_path))?;
    println!("Records persisted: {}", sink.record_count()?);

    let store = CheckpointStore::new(&config.output.checkpoint_path);
    match store.load() {
        Some(snapshot) => {
            println!("\nCheckpoint: {}", config.output.checkpoint_path);
            println!("  Saved at: {}", snapshot.saved_at);
            println!("  Completed pages: {}", snapshot.completed_pages.len());
            println!("  Failed pages: {}", snapshot.failed_pages.len());
            println!("  Total catalog items: {}", snapshot.total_units);
            println!("\nAn interrupted harvest can be resumed by rerunning.");
        }
        None => {
            println!("\nNo checkpoint present (no harvest in progress).");
        }
    }

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: pagehaul::config::Config,
    config_hash: String,
    fresh: bool,
) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh harvest (ignoring any checkpoint)");
    } else {
        tracing::info!("Starting harvest (will resume if a checkpoint exists)");
    }

    let report = run_harvest(config, config_hash, !fresh).await?;

    println!(
        "Harvest {}: {} records from {}/{} pages in {:?}",
        if report.is_success() { "completed" } else { "partial" },
        report.scraped_count,
        report.completed_pages,
        report.total_pages,
        report.elapsed
    );

    if !report.failed_pages.is_empty() {
        let preview: Vec<u32> = report.failed_pages.iter().copied().take(10).collect();
        tracing::warn!(
            "{} pages failed: {:?}...",
            report.failed_pages.len(),
            preview
        );
        tracing::warn!("Rerun the harvester to retry failed pages");
    }

    Ok(())
}
