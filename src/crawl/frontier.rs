// src/crawl/frontier.rs
// =============================================================================
// The frontier: URLs that have been claimed but not yet handed to a worker.
//
// It is an unbounded tokio mpsc channel:
// - FrontierSender is cloned into every worker, so any page can push the
//   children it discovers (many producers)
// - FrontierReceiver is owned by the dispatch loop, which hands each URL to
//   exactly one worker task
//
// Unbounded matters: a worker pushing children must never block waiting for
// the dispatcher, because the dispatcher may itself be waiting for that
// worker's concurrency ticket. A bounded channel could deadlock there.
// =============================================================================

use tokio::sync::mpsc;

pub fn channel() -> (FrontierSender, FrontierReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FrontierSender { tx }, FrontierReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct FrontierSender {
    tx: mpsc::UnboundedSender<String>,
}

impl FrontierSender {
    /// Queues a URL. Hands the URL back if the receiver is gone.
    pub fn push(&self, url: String) -> Result<(), String> {
        self.tx.send(url).map_err(|err| err.0)
    }
}

#[derive(Debug)]
pub struct FrontierReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl FrontierReceiver {
    /// Waits for the next URL. None once every sender is dropped and the
    /// queue is empty.
    pub async fn pop(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Rejects further pushes. URLs already queued can still be popped.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
