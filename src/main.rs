//! Listing Harvest main entry point
//!
//! This is the command-line interface for the Listing Harvest crawler.

use clap::Parser;
use listing_harvest::config::{load_config_with_hash, Config};
use listing_harvest::crawler::{crawl, user_agent_string, CrawlSummary};
use listing_harvest::storage::{
    JsonLinesSink, ListingSink, RunStatus, SinkSet, SqliteListingStore, Storage,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Listing Harvest: a polite rental-listing crawler
///
/// Walks paginated search results at a fixed pace, extracts one record per
/// listing card and upserts them into SQLite (and optionally JSON lines).
#[derive(Parser, Debug)]
#[command(name = "listing-harvest")]
#[command(version)]
#[command(about = "A polite rental-listing crawler", long_about = None)]
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

    /// Validate config and show the seed URL without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Override the configured request budget
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_requests: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(max) = cli.max_requests {
        config.crawler.max_requests = Some(max);
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvest=info,warn"),
            1 => EnvFilter::new("listing_harvest=debug,info"),
            2 => EnvFilter::new("listing_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows where the crawl would start
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let seed = config.search.seed_url()?;

    println!("=== Listing Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Minimum delay: {}ms", config.crawler.minimum_delay_ms);
    match config.crawler.max_requests {
        Some(max) => println!("  Max requests: {}", max),
        None => println!("  Max requests: unlimited"),
    }
    match config.crawler.max_duration_secs {
        Some(secs) => println!("  Max duration: {}s", secs),
        None => println!("  Max duration: unlimited"),
    }
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Obey robots.txt: {}", config.crawler.obey_robots);

    println!("\nUser Agent:");
    println!("  {}", user_agent_string(&config.user_agent));

    println!("\nScope:");
    println!("  Pattern: {}", config.scope.pattern);
    println!("  Listing prefix: {}", config.scope.listing_prefix);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(path) = &config.output.jsonl_path {
        println!("  JSON lines: {}", path);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", seed);

    Ok(())
}

/// Handles the --stats mode: shows run and listing counts from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let store = SqliteListingStore::new(Path::new(&config.output.database_path))?;

    println!("=== Harvest Statistics ===\n");
    println!("  Runs: {}", store.count_runs()?);
    println!("  Listings stored: {}", store.count_listings()?);

    if let Some(run) = store.get_latest_run()? {
        println!("\nLatest Run (#{}):", run.id);
        println!("  Status: {}", run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!("  Pages fetched: {}", run.pages_fetched);
        println!("  Records emitted: {}", run.records_emitted);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = SqliteListingStore::new(Path::new(&config.output.database_path))?;
    let run_id = store.create_run(config_hash)?;
    tracing::info!("Starting run {}", run_id);

    let mut jsonl = match &config.output.jsonl_path {
        Some(path) => Some(JsonLinesSink::new(BufWriter::new(File::create(path)?))),
        None => None,
    };

    let result = {
        let mut sinks = SinkSet::new().with(&mut store);
        if let Some(jsonl) = jsonl.as_mut() {
            sinks = sinks.with(jsonl as &mut dyn ListingSink);
        }
        crawl(config, &mut sinks).await
    };

    match result {
        Ok(summary) => {
            store.finish_run(
                run_id,
                RunStatus::Completed,
                summary.pages_fetched,
                summary.records_emitted,
            )?;
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            store.finish_run(run_id, RunStatus::Failed, 0, 0)?;
            Err(e.into())
        }
    }
}

fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!("  Fetch failures: {}", summary.total_fetch_failures());
    println!("  Records emitted: {}", summary.records_emitted);
    println!("  Sink failures: {}", summary.sink_failures);

    if !summary.fetch_failures.is_empty() {
        println!("\nDropped URLs:");
        for (kind, count) in &summary.fetch_failures {
            println!("  {}: {}", kind, count);
        }
    }

    if !summary.skipped.is_empty() {
        println!("\nSkipped Cards:");
        for (reason, count) in &summary.skipped {
            println!("  {}: {}", reason, count);
        }
    }

    if let Some(reason) = summary.stop_reason {
        println!("\nStopped: {}", reason.as_str());
    }
}
