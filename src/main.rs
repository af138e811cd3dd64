// src/main.rs
// =============================================================================
// This is the entry point of the site-crawler CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr, so stdout stays clean for the results)
// 3. Build a Crawler and run it to completion
// 4. Print the discovered URLs, as plain lines or JSON
// 5. Exit with proper code (0 = success, 2 = error)
// =============================================================================

mod cli;

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use site_crawler::{CrawlStats, Crawler};

// Shape of the --json output
#[derive(Debug, Serialize)]
struct CrawlReport<'a> {
    root: &'a str,
    urls: &'a BTreeSet<String>,
    stats: CrawlStats,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("site_crawler={default_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let crawler = Crawler::with_config(&cli.root_url, cli.crawler_config())
        .with_context(|| format!("cannot crawl {}", cli.root_url))?;

    crawler.scrape().await?;

    let urls = crawler.urls();
    if cli.json {
        let report = CrawlReport {
            root: crawler.root_url(),
            urls: &urls,
            stats: crawler.stats(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for url in &urls {
            println!("{}", url);
        }
    }

    Ok(())
}
