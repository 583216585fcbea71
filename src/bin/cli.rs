//! MTG Deal Finder CLI
//!
//! Reads a want-list file (one card per line), searches the enabled
//! stores, and reports the best offer per card.

use std::path::PathBuf;

use clap::Parser;
use mtg_deal_finder::{
    cache::ResultCache,
    error::Result,
    models::{Card, Config},
    output, pipeline,
};

/// Find the best prices for Magic: The Gathering cards.
#[derive(Parser, Debug)]
#[command(name = "mtg-deal-finder", version)]
struct Cli {
    /// Path to text file with card list (one card per line),
    /// e.g. "Brainstorm x4" or "Counterspell (7ED)"
    input: Option<PathBuf>,

    /// Output CSV file path
    #[arg(short, long, default_value = "results.csv")]
    out: PathBuf,

    /// Comma-separated list of stores to search (default: all)
    #[arg(long, value_delimiter = ',')]
    stores: Option<Vec<String>>,

    /// Selection strategy
    #[arg(long)]
    strategy: Option<String>,

    /// Minimum acceptable condition (mint, nm, lp, mp, played, hp, damaged)
    #[arg(long)]
    min_quality: Option<String>,

    /// Apply the checkout discount for discount-eligible stores
    #[arg(long)]
    discount: bool,

    /// Disable the 24h result cache
    #[arg(long)]
    no_cache: bool,

    /// Delete all cached results and exit
    #[arg(long)]
    clear_cache: bool,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Read and parse the want-list, skipping blank and malformed lines.
fn read_cards(path: &PathBuf) -> Result<Vec<Card>> {
    let content = std::fs::read_to_string(path)?;

    let mut cards = Vec::new();
    let mut skipped = 0usize;
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match Card::parse(line) {
            Ok(card) => cards.push(card),
            Err(e) => {
                log::warn!("Skipping line: {e}");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} malformed line(s)");
    }
    Ok(cards)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // CLI flags override the config file.
    if cli.stores.is_some() {
        config.search.stores = cli.stores.clone();
    }
    if let Some(strategy) = &cli.strategy {
        config.search.strategy = strategy.clone();
    }
    if cli.min_quality.is_some() {
        config.search.min_quality = cli.min_quality.clone();
    }
    if cli.discount {
        config.search.apply_discount = true;
    }
    if cli.no_cache {
        config.search.use_cache = false;
    }

    // Resolve before any network activity: unknown stores, strategies,
    // or quality labels are fatal here.
    let options = config.resolve()?;

    if cli.clear_cache {
        let cache = ResultCache::new(config.cache.resolve_dir());
        let removed = cache.clear().await?;
        log::info!("Removed {removed} cached result(s)");
        return Ok(());
    }

    let Some(input) = &cli.input else {
        log::info!("No want-list given. Pass a text file with one card per line:");
        log::info!("  Lightning Bolt");
        log::info!("  Counterspell (7ED)");
        log::info!("  Brainstorm x4");
        log::info!("See --help for options.");
        return Ok(());
    };

    log::info!("Reading cards from {}", input.display());
    let cards = read_cards(input)?;
    log::info!(
        "Searching {} card(s) across {} store(s) with strategy {}",
        cards.len(),
        options.enabled_stores.len(),
        options.strategy
    );

    let reports = pipeline::run(&config, &options, &cards).await?;

    print!("{}", output::render_table(&reports));
    output::write_csv(&reports, &cli.out).await?;

    Ok(())
}
