// src/crawl/visited.rs
// =============================================================================
// The set of URLs that have been claimed for fetching.
//
// A URL goes into the frontier only if this set accepted it first, so
// mark_if_new() is the one place that decides "fetch this exactly once".
// DashSet shards its locks internally, which lets hundreds of worker tasks
// insert at the same time without a global mutex and without callers doing
// any locking of their own.
// =============================================================================

use std::collections::BTreeSet;

use dashmap::DashSet;

#[derive(Debug, Default)]
pub(crate) struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts `url` if absent. Returns true only for the caller that
    /// inserted it first.
    pub(crate) fn mark_if_new(&self, url: &str) -> bool {
        // Cheap read first so already-seen links do not allocate
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    pub(crate) fn len(&self) -> usize {
        self.urls.len()
    }

    /// Copies the current contents. While a crawl is running this is only a
    /// point-in-time view.
    pub(crate) fn snapshot(&self) -> BTreeSet<String> {
        self.urls.iter().map(|url| url.key().clone()).collect()
    }
}
