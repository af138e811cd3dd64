// src/config.rs
// =============================================================================
// Crawler configuration.
//
// Two knobs:
// - max_concurrent_fetches: how many pages may be in flight at once
//   (1 means the crawl is effectively sequential)
// - request_timeout: per-request timeout. Zero disables it, which is not
//   recommended: a stuck server would then stall the crawl forever
//
// The CLI maps its flags onto this struct; library users build one with
// the `with_*` setters starting from `CrawlerConfig::default()`.
// =============================================================================

use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::CrawlError;

/// Default ceiling on simultaneous in-flight fetches.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 1000;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerConfig {
    pub max_concurrent_fetches: usize,
    pub request_timeout: Duration,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CrawlerConfig {
    pub fn with_max_concurrent_fetches(mut self, amount: usize) -> Self {
        self.max_concurrent_fetches = amount;
        self
    }

    /// Sets the per-request timeout. `Duration::ZERO` means no timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The timeout to apply, or None when timeouts are disabled.
    pub fn timeout(&self) -> Option<Duration> {
        if self.request_timeout.is_zero() {
            None
        } else {
            Some(self.request_timeout)
        }
    }

    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.max_concurrent_fetches == 0 {
            return Err(CrawlError::InvalidConfig(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        // The ticket pool is a tokio Semaphore, which panics above this
        if self.max_concurrent_fetches > Semaphore::MAX_PERMITS {
            return Err(CrawlError::InvalidConfig(format!(
                "max_concurrent_fetches must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        Ok(())
    }
}
