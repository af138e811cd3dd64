// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things). Every flag maps onto a
// field of CrawlerConfig, so the defaults here mirror the library defaults.
// =============================================================================

use std::time::Duration;

use clap::Parser;

use site_crawler::config::{CrawlerConfig, DEFAULT_MAX_CONCURRENT_FETCHES};

#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawl every page reachable on a website's host",
    long_about = "site-crawler starts from a root URL, follows every link that stays on the \
                  same host, and prints the set of URLs it found. Links to other hosts, \
                  including subdomains, are never followed."
)]
pub struct Cli {
    /// Root URL to start from (e.g., https://example.com)
    ///
    /// Must be absolute and contain a host
    pub root_url: String,

    /// Maximum number of pages fetched at the same time
    ///
    /// 1 crawls sequentially
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_FETCHES)]
    pub max_concurrent_fetches: usize,

    /// Per-request timeout in seconds (0 disables it, not recommended)
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Output results in JSON format instead of a plain list
    #[arg(long)]
    pub json: bool,

    /// Log every fetched page (same as RUST_LOG=debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig::default()
            .with_max_concurrent_fetches(self.max_concurrent_fetches)
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
    }
}
