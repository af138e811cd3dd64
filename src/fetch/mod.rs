// src/fetch/mod.rs
// =============================================================================
// The crawl engine's view of the outside world.
//
// Submodules:
// - http: PageFetcher implementation backed by reqwest
// - html: pulls raw href values out of an HTML document
//
// The engine only depends on the PageFetcher trait, so tests can swap the
// network for an in-memory map of pages.
//
// Rust concepts:
// - Trait objects and BoxFuture: async functions in a trait that can be
//   stored behind an Arc and called from many tasks
// =============================================================================

mod html;
mod http;

use futures::future::BoxFuture;

use crate::error::FetchError;

pub use html::extract_hrefs;
pub use http::HttpFetcher;

/// Capability to download a page.
///
/// Implementations must be shareable between worker tasks. The engine wraps
/// every call in the configured per-request timeout, so an implementation
/// that never returns is still bounded.
pub trait PageFetcher: Send + Sync + 'static {
    /// Downloads `url` and returns its body as text.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>>;
}
