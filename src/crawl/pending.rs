// src/crawl/pending.rs
// =============================================================================
// Pending-work counter with a completion signal.
//
// The count is the number of URLs that have been claimed but whose page has
// not been fully processed yet. It is raised when a URL is claimed and
// lowered when the worker for that URL finishes, after all of the page's
// children have already been claimed. So the count can only reach zero when
// the frontier is empty and nothing is in flight: that is the end of the
// crawl.
//
// Reaching zero wakes everyone waiting in drained(). There is no polling.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct PendingWork {
    count: AtomicUsize,
    drained: Notify,
}

impl PendingWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks one unit of work finished. Returns true when this call brought
    /// the count to zero.
    pub fn complete(&self) -> bool {
        let previous = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        match previous {
            Ok(1) => {
                self.drained.notify_waiters();
                true
            }
            Ok(_) => false,
            Err(_) => {
                tracing::error!("pending work completed more times than it was added");
                false
            }
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Resolves once the count is zero.
    pub async fn drained(&self) {
        loop {
            // Register before checking, so a notify_waiters() that lands
            // between the check and the await is not missed
            let notified = self.drained.notified();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Returns a guard that calls complete() when dropped, including when
    /// the worker holding it panics.
    pub fn completion_guard(self: &Arc<Self>) -> CompletionGuard {
        CompletionGuard {
            pending: Arc::clone(self),
        }
    }
}

#[derive(Debug)]
pub struct CompletionGuard {
    pending: Arc<PendingWork>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.pending.complete();
    }
}
