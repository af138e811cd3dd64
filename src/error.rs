// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// There are two families of errors:
// - CrawlError: things that stop a crawl from ever starting (bad root URL,
//   bad config, HTTP client could not be built) or misuse of the lifecycle
// - FetchError: things that go wrong for ONE page during a crawl. These are
//   never fatal; the engine logs them and treats the page as having no links
//
// We use `thiserror` so each variant gets a Display implementation from the
// #[error(...)] attribute.
// =============================================================================

use thiserror::Error;

/// Errors returned when constructing or starting a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The root URL did not parse, or parsed without a host component.
    #[error("invalid root URL '{url}': {reason}")]
    InvalidRootUrl { url: String, reason: String },

    #[error("invalid crawler configuration: {0}")]
    InvalidConfig(String),

    /// `scrape()` was called on a crawler that has already run.
    #[error("crawl has already been started on this instance")]
    AlreadyStarted,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Errors for a single fetch. Recovered locally by the crawl engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {0}")]
    Status(u16),

    /// The response body could not be read or decoded.
    #[error("unreadable body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = error.status() {
            FetchError::Status(status.as_u16())
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error.to_string())
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}
