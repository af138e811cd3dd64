// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Concurrent crawling from a root URL, bounded by a ticket pool
// - Same-host restriction (doesn't crawl external sites or subdomains)
// - Each URL is fetched at most once
// - Stops exactly when there is nothing left to fetch
//
// Submodules:
// - visited: concurrent set of claimed URLs
// - frontier: queue of claimed URLs waiting for a worker
// - pending: outstanding-work counter that signals the end of the crawl
// - engine: the Crawler that ties them together
// =============================================================================

mod engine;
mod frontier;
mod pending;
mod visited;

// Re-export the crawler and its public types
pub use engine::{CrawlState, CrawlStats, Crawler};
