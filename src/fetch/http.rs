// src/fetch/http.rs
// =============================================================================
// This module downloads pages over HTTP.
//
// Key functionality:
// - One reqwest Client per crawl, shared by every worker (connection pooling)
// - Per-request timeout taken from CrawlerConfig (none when zero)
// - Non-2xx responses become FetchError::Status so the engine treats the
//   page exactly like a transport failure: logged, no children
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - FutureExt::boxed: turns an `async move` block into a BoxFuture so it fits
//   the object-safe PageFetcher trait
// =============================================================================

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;

use super::PageFetcher;
use crate::error::{CrawlError, FetchError};

// Identifies the crawler to the servers it visits
const USER_AGENT: &str = concat!("site-crawler/", env!("CARGO_PKG_VERSION"));

/// PageFetcher backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the HTTP client.
    //
    // Parameters:
    //   timeout: per-request timeout, or None for no timeout at all
    pub fn new(timeout: Option<Duration>) -> Result<Self, CrawlError> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| CrawlError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // text() consumes the response, so the connection goes back to the
        // pool whether or not the body decodes
        let body = response.text().await?;
        Ok(body)
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        self.get(url).boxed()
    }
}
