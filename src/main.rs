//! Flibusta scraper main entry point
//!
//! This is the command-line interface for crawling catalogue searches and,
//! optionally, every series and author they turn up.

use anyhow::{bail, Context};
use clap::Parser;
use flibusta_scraper::config::load_config_or_default;
use flibusta_scraper::output::{
    detailed_filename, print_detailed_summary, print_search_summary, search_filename,
    write_json_into,
};
use flibusta_scraper::Crawler;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Flibusta scraper: a polite crawler for a paginated book catalogue
///
/// Searches the catalogue, collects series, authors, books and download
/// links from every results page, and writes them as JSON. A deep crawl
/// then follows each series and author to their own listings.
#[derive(Parser, Debug)]
#[command(name = "flibusta-scraper")]
#[command(version = "1.0.0")]
#[command(about = "A polite crawler for a paginated book catalogue", long_about = None)]
struct Cli {
    /// Search query; prompted for when omitted
    #[arg(value_name = "QUERY")]
    query: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Process at most this many pages of every listing
    #[arg(short, long, value_name = "N")]
    max_pages: Option<u32>,

    /// Follow every series and author found by the search
    #[arg(long, conflicts_with = "no_deep")]
    deep: bool,

    /// Skip the deep crawl without asking
    #[arg(long, conflicts_with = "deep")]
    no_deep: bool,

    /// Directory for result files, overriding the configuration
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

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

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_config_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from: {}", path.display());
    }

    let query = match cli.query.clone() {
        Some(query) => query,
        None => prompt("Search query: ")?,
    };
    if query.trim().is_empty() {
        bail!("Search query is empty");
    }

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    let crawler = Crawler::new(&config)?;
    println!("Search URL: {}", crawler.site().search_url(&query, 0)?);

    handle_crawl(&crawler, &cli, &query, &output_dir).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("flibusta_scraper=info,warn"),
            1 => EnvFilter::new("flibusta_scraper=debug,info"),
            2 => EnvFilter::new("flibusta_scraper=trace,debug"),
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

/// Runs the search crawl, then the deep crawl if requested
async fn handle_crawl(
    crawler: &Crawler,
    cli: &Cli,
    query: &str,
    output_dir: &Path,
) -> anyhow::Result<()> {
    let result = match crawler.crawl_search(query, cli.max_pages).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            return Err(e.into());
        }
    };

    print_search_summary(&result);
    let path = write_json_into(output_dir, &search_filename(query), &result)
        .context("Failed to write search results")?;
    println!("Results saved to: {}", path.display());

    if result.series.is_empty() && result.authors.is_empty() {
        tracing::info!("No series or authors to follow");
        return Ok(());
    }

    let deep = if cli.deep {
        true
    } else if cli.no_deep {
        false
    } else {
        confirm(&format!(
            "Crawl {} series and {} authors in detail? [y/N]: ",
            result.series.len(),
            result.authors.len()
        ))?
    };
    if !deep {
        return Ok(());
    }

    let details = crawler.crawl_details(&result, cli.max_pages).await;
    print_detailed_summary(&details);
    let path = write_json_into(output_dir, &detailed_filename(query), &details)
        .context("Failed to write detailed results")?;
    println!("Detailed results saved to: {}", path.display());

    Ok(())
}

/// Reads one trimmed line from stdin after printing `message`
fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Asks a yes/no question; anything but y/yes (or д/да) means no
fn confirm(message: &str) -> anyhow::Result<bool> {
    let answer = prompt(message)?.to_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes" | "д" | "да"))
}
