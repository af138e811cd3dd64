// src/lib.rs
// =============================================================================
// site-crawler: discover every page reachable on a single host.
//
// Start from a root URL, follow <a href> links, keep only links on the
// root's host, and return the set of URLs found. Pages are fetched
// concurrently up to a configurable ceiling.
//
// Module map:
// - config: CrawlerConfig (concurrency ceiling, request timeout)
// - error: CrawlError and FetchError
// - normalize: href resolution and the same-host check
// - fetch: PageFetcher trait, reqwest implementation, href extraction
// - crawl: the crawl engine
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod normalize;

pub use config::CrawlerConfig;
pub use crawl::{CrawlState, CrawlStats, Crawler};
pub use error::{CrawlError, FetchError};
pub use fetch::{HttpFetcher, PageFetcher};
