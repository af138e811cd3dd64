// src/crawl/engine.rs
// =============================================================================
// The crawl engine.
//
// How it works:
// 1. The root URL is marked visited, counted as pending work, and queued
// 2. The dispatch loop pops URLs from the frontier. For each one it takes a
//    concurrency ticket (waiting if the ceiling is reached) and spawns a
//    worker task that owns the ticket
// 3. A worker fetches the page, extracts hrefs, resolves them against the
//    page URL, drops off-host ones, and claims the rest. Claiming a URL
//    means: win the visited-set insert, count it, push it to the frontier
// 4. When the worker is done (success, failure, timeout, even panic) its
//    completion guard lowers the pending count and the ticket is released
// 5. When the pending count hits zero the dispatch loop stops, waits for
//    every spawned task to exit, and the crawl is Done
//
// Lifecycle: Idle -> Running -> Draining -> Done
//
// Rust concepts:
// - Arc: shared ownership of the context between worker tasks
// - tokio::select!: wait on "next URL" and "all work finished" at once
// - Semaphore + OwnedSemaphorePermit: the ticket moves into the task and is
//   released when the task drops it
// - JoinSet: keeps every spawned worker so none outlives the crawl
// =============================================================================

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use super::frontier::{self, FrontierSender};
use super::pending::PendingWork;
use super::visited::VisitedSet;
use crate::config::CrawlerConfig;
use crate::error::{CrawlError, FetchError};
use crate::fetch::{extract_hrefs, HttpFetcher, PageFetcher};
use crate::normalize::{resolve, root_host, same_domain};

/// Where a crawler is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    /// Constructed, `scrape()` not called yet.
    Idle,
    /// Root seeded, workers fetching.
    Running,
    /// Pending work reached zero; waiting for worker tasks to exit.
    Draining,
    /// Every task has exited. `urls()` is final.
    Done,
}

impl TryFrom<u8> for CrawlState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CrawlState::Idle),
            1 => Ok(CrawlState::Running),
            2 => Ok(CrawlState::Draining),
            3 => Ok(CrawlState::Done),
            other => Err(other),
        }
    }
}

/// Counters for one crawl. Owned by the crawler instance, never global.
#[derive(Debug, Default)]
struct StatsCounters {
    pages_fetched: AtomicUsize,
    fetch_failures: AtomicUsize,
    links_found: AtomicUsize,
}

/// Point-in-time copy of a crawler's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CrawlStats {
    /// Pages downloaded successfully.
    pub pages_fetched: usize,
    /// Pages that failed (transport error, timeout, bad status, panic).
    pub fetch_failures: usize,
    /// Raw hrefs extracted, before resolution and filtering.
    pub links_found: usize,
    /// Distinct same-host URLs claimed, the root included.
    pub urls_discovered: usize,
}

/// Same-host concurrent crawler.
///
/// ```no_run
/// # async fn run() -> Result<(), site_crawler::CrawlError> {
/// let crawler = site_crawler::Crawler::new("https://monzo.com")?;
/// crawler.scrape().await?;
/// for url in crawler.urls() {
///     println!("{url}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Crawler<F: PageFetcher = HttpFetcher> {
    root_url: String,
    host: String,
    config: CrawlerConfig,
    fetcher: Arc<F>,
    visited: Arc<VisitedSet>,
    stats: Arc<StatsCounters>,
    state: AtomicU8,
    finished: Notify,
}

impl Crawler<HttpFetcher> {
    /// Crawler for `root_url` with the default configuration.
    pub fn new(root_url: &str) -> Result<Self, CrawlError> {
        Self::with_config(root_url, CrawlerConfig::default())
    }

    /// Crawler for `root_url` fetching over HTTP with `config`.
    pub fn with_config(root_url: &str, config: CrawlerConfig) -> Result<Self, CrawlError> {
        // Check the cheap things before building an HTTP client
        parse_root(root_url)?;
        config.validate()?;
        let fetcher = HttpFetcher::new(config.timeout())?;
        Self::with_fetcher(root_url, config, fetcher)
    }
}

impl<F: PageFetcher> Crawler<F> {
    /// Crawler that downloads pages through a custom `fetcher`.
    pub fn with_fetcher(root_url: &str, config: CrawlerConfig, fetcher: F) -> Result<Self, CrawlError> {
        let host = parse_root(root_url)?;
        config.validate()?;

        Ok(Self {
            root_url: root_url.to_string(),
            host,
            config,
            fetcher: Arc::new(fetcher),
            visited: Arc::new(VisitedSet::new()),
            stats: Arc::new(StatsCounters::default()),
            state: AtomicU8::new(CrawlState::Idle as u8),
            finished: Notify::new(),
        })
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// The host every crawled URL must match.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn state(&self) -> CrawlState {
        match CrawlState::try_from(self.state.load(Ordering::SeqCst)) {
            Ok(state) => state,
            // Never report an unknown value as finished
            Err(value) => {
                error!(value, "unknown crawl state");
                CrawlState::Running
            }
        }
    }

    /// URLs discovered so far. Complete once `scrape()` has returned; a
    /// best-effort snapshot while it is still running.
    pub fn urls(&self) -> BTreeSet<String> {
        self.visited.snapshot()
    }

    pub fn stats(&self) -> CrawlStats {
        CrawlStats {
            pages_fetched: self.stats.pages_fetched.load(Ordering::SeqCst),
            fetch_failures: self.stats.fetch_failures.load(Ordering::SeqCst),
            links_found: self.stats.links_found.load(Ordering::SeqCst),
            urls_discovered: self.visited.len(),
        }
    }

    /// Waits until the crawl reaches `Done`. Meant to be awaited alongside a
    /// running `scrape()`; returns at once if the crawl already finished.
    pub async fn wait(&self) {
        loop {
            let notified = self.finished.notified();
            if self.state() == CrawlState::Done {
                return;
            }
            notified.await;
        }
    }

    /// Crawls every same-host page reachable from the root and returns when
    /// the frontier is exhausted and no fetch is in flight.
    ///
    /// Per-page failures are logged and never abort the crawl. A crawler runs
    /// once; a second call fails with `CrawlError::AlreadyStarted`.
    pub async fn scrape(&self) -> Result<(), CrawlError> {
        self.state
            .compare_exchange(
                CrawlState::Idle as u8,
                CrawlState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map_err(|_| CrawlError::AlreadyStarted)?;

        info!(
            root = %self.root_url,
            host = %self.host,
            max_concurrent_fetches = self.config.max_concurrent_fetches,
            "crawl started"
        );

        let (frontier_tx, mut frontier_rx) = frontier::channel();
        let tickets = Arc::new(Semaphore::new(self.config.max_concurrent_fetches));
        let ctx = Arc::new(WorkerContext {
            host: self.host.clone(),
            timeout: self.config.timeout(),
            fetcher: Arc::clone(&self.fetcher),
            visited: Arc::clone(&self.visited),
            stats: Arc::clone(&self.stats),
            frontier: frontier_tx,
            pending: Arc::new(PendingWork::new()),
        });

        ctx.claim(self.root_url.clone());

        let mut workers = JoinSet::new();
        loop {
            tokio::select! {
                biased;

                () = ctx.pending.drained() => break,

                Some(result) = workers.join_next(), if !workers.is_empty() => {
                    log_worker_exit(result);
                }

                next = frontier_rx.pop() => {
                    // ctx holds a sender, so the channel cannot close here
                    let Some(url) = next else { break };

                    // Admission control: waits while the ceiling is reached
                    let ticket = match Arc::clone(&tickets).acquire_owned().await {
                        Ok(ticket) => ticket,
                        Err(err) => {
                            error!(error = %err, "concurrency tickets closed, stopping dispatch");
                            break;
                        }
                    };

                    let ctx = Arc::clone(&ctx);
                    workers.spawn(async move { ctx.process(url, ticket).await });
                }
            }
        }

        self.state.store(CrawlState::Draining as u8, Ordering::SeqCst);
        frontier_rx.close();
        while let Some(result) = workers.join_next().await {
            log_worker_exit(result);
        }
        drop(ctx);

        self.state.store(CrawlState::Done as u8, Ordering::SeqCst);
        self.finished.notify_waiters();

        let stats = self.stats();
        info!(
            urls = stats.urls_discovered,
            fetched = stats.pages_fetched,
            failed = stats.fetch_failures,
            "crawl finished"
        );
        Ok(())
    }
}

// State shared by the dispatch loop and every worker for one crawl
struct WorkerContext<F: PageFetcher> {
    host: String,
    timeout: Option<Duration>,
    fetcher: Arc<F>,
    visited: Arc<VisitedSet>,
    stats: Arc<StatsCounters>,
    frontier: FrontierSender,
    pending: Arc<PendingWork>,
}

impl<F: PageFetcher> WorkerContext<F> {
    // Claims a URL for fetching. Only the first claim of a URL succeeds.
    //
    // The URL is counted before it is pushed: once pushed it may be popped,
    // fetched and completed by another task at any moment, and that
    // completion must not be able to take the count to zero early.
    fn claim(&self, url: String) -> bool {
        if !self.visited.mark_if_new(&url) {
            return false;
        }

        self.pending.add();
        if let Err(url) = self.frontier.push(url) {
            warn!(%url, "frontier closed, dropping url");
            self.pending.complete();
            return false;
        }
        true
    }

    // One fetch-and-extract cycle
    async fn process(&self, url: String, _ticket: OwnedSemaphorePermit) {
        // Dropped before the ticket, on every exit path
        let _done = self.pending.completion_guard();

        debug!(%url, "fetching");
        let body = match self.fetch(&url).await {
            Ok(body) => body,
            Err(err) => {
                self.stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
                warn!(%url, error = %err, "fetch failed");
                return;
            }
        };
        self.stats.pages_fetched.fetch_add(1, Ordering::Relaxed);

        let hrefs = extract_hrefs(&body);
        drop(body);
        self.stats.links_found.fetch_add(hrefs.len(), Ordering::Relaxed);

        let mut claimed = 0usize;
        for href in hrefs {
            let absolute = resolve(&href, &url);
            if absolute.is_empty() || !same_domain(&absolute, &self.host) {
                continue;
            }
            if self.claim(absolute) {
                claimed += 1;
            }
        }
        debug!(%url, new_urls = claimed, "page processed");
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetcher.fetch(url))
                .await
                .unwrap_or(Err(FetchError::Timeout)),
            None => self.fetcher.fetch(url).await,
        }
    }
}

fn parse_root(root_url: &str) -> Result<String, CrawlError> {
    root_host(root_url).ok_or_else(|| CrawlError::InvalidRootUrl {
        url: root_url.to_string(),
        reason: "expected an absolute URL with a host".to_string(),
    })
}

fn log_worker_exit(result: Result<(), JoinError>) {
    if let Err(err) = result {
        if err.is_panic() {
            error!(error = %err, "worker panicked");
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why can the pending count not hit zero too early?
//    - A page's own unit of work is still counted while it claims its
//      children, and each child is counted before it is pushed. So between
//      "root claimed" and "last page done" the count is always >= 1
//
// 2. Why is the ticket acquired in the dispatch loop and not in the worker?
//    - That way the number of spawned-but-unfinished tasks is bounded by the
//      ceiling too, not just the number of active fetches
//
// 3. Why can the dispatch loop block on a ticket without deadlocking?
//    - Workers never wait on the dispatcher: the frontier is unbounded, so
//      they always run to the end and drop their ticket
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{BoxFuture, FutureExt};
    use std::collections::HashMap;
    use std::sync::Mutex;

    // In-memory site: URL -> HTML. Unknown URLs fail with 404.
    #[derive(Default)]
    struct StubFetcher {
        pages: HashMap<String, String>,
        delay: Duration,
        panic_on: Option<String>,
        calls: Mutex<HashMap<String, usize>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl StubFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
                ..Self::default()
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> HashMap<String, usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PageFetcher for StubFetcher {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
            async move {
                *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);

                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                self.in_flight.fetch_sub(1, Ordering::SeqCst);

                if self.panic_on.as_deref() == Some(url) {
                    panic!("stub asked to panic on {url}");
                }
                self.pages.get(url).cloned().ok_or(FetchError::Status(404))
            }
            .boxed()
        }
    }

    fn crawler(root: &str, fetcher: StubFetcher) -> Crawler<StubFetcher> {
        Crawler::with_fetcher(root, CrawlerConfig::default(), fetcher).unwrap()
    }

    fn set(urls: &[&str]) -> BTreeSet<String> {
        urls.iter().map(|url| url.to_string()).collect()
    }

    #[test]
    fn test_new_rejects_hostless_roots() {
        for root in ["com", "/a", "ww.bb.cc"] {
            assert!(
                matches!(Crawler::new(root), Err(CrawlError::InvalidRootUrl { .. })),
                "{root} should be rejected"
            );
        }
        assert!(Crawler::new("https://monzo.com").is_ok());
    }

    #[test]
    fn test_new_rejects_zero_concurrency() {
        let config = CrawlerConfig::default().with_max_concurrent_fetches(0);
        assert!(matches!(
            Crawler::with_config("https://monzo.com", config),
            Err(CrawlError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_rejects_ceiling_above_semaphore_limit() {
        let config = CrawlerConfig::default().with_max_concurrent_fetches(usize::MAX);
        assert!(matches!(
            Crawler::with_fetcher("https://monzo.com/", config, StubFetcher::default()),
            Err(CrawlError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_state_decoding() {
        for state in [
            CrawlState::Idle,
            CrawlState::Running,
            CrawlState::Draining,
            CrawlState::Done,
        ] {
            assert_eq!(CrawlState::try_from(state as u8), Ok(state));
        }
        assert_eq!(CrawlState::try_from(4), Err(4));
        assert_eq!(CrawlState::try_from(u8::MAX), Err(u8::MAX));
    }

    #[test]
    fn test_unknown_state_is_not_done() {
        let crawler = crawler("https://monzo.com/", StubFetcher::default());
        crawler.state.store(42, Ordering::SeqCst);
        assert_eq!(crawler.state(), CrawlState::Running);
    }

    #[test]
    fn test_fresh_crawler_is_idle() {
        let crawler = crawler("https://monzo.com/", StubFetcher::default());
        assert_eq!(crawler.state(), CrawlState::Idle);
        assert_eq!(crawler.host(), "monzo.com");
        assert!(crawler.urls().is_empty());
    }

    #[tokio::test]
    async fn test_single_page_fixture() {
        let fixture = r#"
            <html><body>
              <a href="/about">About</a>
              <a href="careers/">Careers</a>
              <a href="https://monzo.com/blog">Blog</a>
              <a href="https://google.com/search">Off-site</a>
              <a href="https://www.monzo.com/help">Subdomain</a>
              <a>No href</a>
              <a href="http://exa mple.com/">Malformed</a>
              <a href="mailto:help@monzo.com">Mail</a>
              <a href="/about">About again</a>
              <a href="https://monzo.com/">Home</a>
            </body></html>
        "#;
        let crawler = crawler(
            "https://monzo.com/",
            StubFetcher::new(&[("https://monzo.com/", fixture)]),
        );

        crawler.scrape().await.unwrap();

        assert_eq!(
            crawler.urls(),
            set(&[
                "https://monzo.com/",
                "https://monzo.com/about",
                "https://monzo.com/careers/",
                "https://monzo.com/blog",
            ])
        );
        let stats = crawler.stats();
        assert_eq!(stats.pages_fetched, 1);
        assert_eq!(stats.fetch_failures, 3);
        assert_eq!(stats.links_found, 9);
        assert_eq!(stats.urls_discovered, 4);
        assert_eq!(crawler.state(), CrawlState::Done);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_each_url_fetched_once() {
        // Every page links to every other page and to itself
        let all = r#"
            <a href="/">home</a><a href="/a">a</a><a href="/b">b</a>
            <a href="/c">c</a><a href="https://monzo.com/a">a abs</a>
        "#;
        let fetcher = StubFetcher::new(&[
            ("https://monzo.com/", all),
            ("https://monzo.com/a", all),
            ("https://monzo.com/b", all),
            ("https://monzo.com/c", all),
        ])
        .with_delay(Duration::from_millis(5));
        let crawler = crawler("https://monzo.com/", fetcher);

        crawler.scrape().await.unwrap();

        let calls = crawler.fetcher.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls.values().all(|&count| count == 1), "{calls:?}");
        assert_eq!(crawler.stats().fetch_failures, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_results_stay_on_root_host() {
        let fetcher = StubFetcher::new(&[
            (
                "https://monzo.com/",
                r#"<a href="/x">x</a><a href="https://other.com/">o</a>"#,
            ),
            (
                "https://monzo.com/x",
                r#"<a href="https://monzo.com:8443/y">y</a><a href="//cdn.monzo.com/z">z</a>"#,
            ),
        ]);
        let crawler = crawler("https://monzo.com/", fetcher);

        crawler.scrape().await.unwrap();

        let urls = crawler.urls();
        assert_eq!(urls.len(), 3);
        for url in urls {
            assert_eq!(root_host(&url).as_deref(), Some("monzo.com"), "{url}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_ceiling() {
        let links: String = (0..40)
            .map(|i| format!("<a href=\"/page/{i}\">{i}</a>"))
            .collect();
        let fetcher = StubFetcher::new(&[("https://monzo.com/", links.as_str())])
            .with_delay(Duration::from_millis(10));
        let config = CrawlerConfig::default().with_max_concurrent_fetches(3);
        let crawler = Crawler::with_fetcher("https://monzo.com/", config, fetcher).unwrap();

        crawler.scrape().await.unwrap();

        let max = crawler.fetcher.max_in_flight.load(Ordering::SeqCst);
        assert!((1..=3).contains(&max), "observed {max} concurrent fetches");
        assert_eq!(crawler.urls().len(), 41);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sequential_when_ceiling_is_one() {
        let fetcher = StubFetcher::new(&[
            ("https://monzo.com/", r#"<a href="/a">a</a><a href="/b">b</a>"#),
            ("https://monzo.com/a", r#"<a href="/c">c</a>"#),
        ])
        .with_delay(Duration::from_millis(5));
        let config = CrawlerConfig::default().with_max_concurrent_fetches(1);
        let crawler = Crawler::with_fetcher("https://monzo.com/", config, fetcher).unwrap();

        crawler.scrape().await.unwrap();

        assert_eq!(crawler.fetcher.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(crawler.urls().len(), 4);
    }

    #[tokio::test]
    async fn test_root_without_links_terminates_without_leaks() {
        let fetcher = StubFetcher::new(&[("https://monzo.com/", "<p>nothing here</p>")]);
        let crawler = crawler("https://monzo.com/", fetcher);

        tokio::time::timeout(Duration::from_secs(5), crawler.scrape())
            .await
            .expect("crawl hung")
            .unwrap();

        assert_eq!(crawler.urls(), set(&["https://monzo.com/"]));
        assert_eq!(crawler.state(), CrawlState::Done);
        // Every worker and the shared context are gone
        assert_eq!(Arc::strong_count(&crawler.fetcher), 1);
        assert_eq!(Arc::strong_count(&crawler.visited), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_tasks_left_after_crawl() {
        let metrics = tokio::runtime::Handle::current().metrics();
        let baseline = metrics.num_alive_tasks();

        let links: String = (0..20)
            .map(|i| format!("<a href=\"/page/{i}\">{i}</a>"))
            .collect();
        let fetcher = StubFetcher::new(&[("https://monzo.com/", links.as_str())])
            .with_delay(Duration::from_millis(5));
        let crawler = crawler("https://monzo.com/", fetcher);

        crawler.scrape().await.unwrap();
        assert_eq!(crawler.urls().len(), 21);

        // Task bookkeeping can lag the join by a moment
        let settled = tokio::time::timeout(Duration::from_secs(5), async {
            while metrics.num_alive_tasks() != baseline {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await;
        assert!(
            settled.is_ok(),
            "{} tasks alive, expected {baseline}",
            metrics.num_alive_tasks()
        );
    }

    #[tokio::test]
    async fn test_zero_timeout_crawls_without_limit() {
        let fetcher = StubFetcher::new(&[
            ("https://monzo.com/", r#"<a href="/a">a</a>"#),
            ("https://monzo.com/a", r#"<a href="/b">b</a>"#),
        ])
        .with_delay(Duration::from_millis(30));
        let config = CrawlerConfig::default().with_request_timeout(Duration::ZERO);
        let crawler = Crawler::with_fetcher("https://monzo.com/", config, fetcher).unwrap();

        crawler.scrape().await.unwrap();

        assert_eq!(
            crawler.urls(),
            set(&[
                "https://monzo.com/",
                "https://monzo.com/a",
                "https://monzo.com/b",
            ])
        );
        let stats = crawler.stats();
        assert_eq!(stats.pages_fetched, 2);
        assert_eq!(stats.fetch_failures, 1);
    }

    #[tokio::test]
    async fn test_failed_root_is_a_leaf() {
        let crawler = crawler("https://monzo.com/", StubFetcher::default());

        crawler.scrape().await.unwrap();

        assert_eq!(crawler.urls(), set(&["https://monzo.com/"]));
        assert_eq!(crawler.stats().fetch_failures, 1);
        assert_eq!(crawler.stats().pages_fetched, 0);
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out() {
        let fetcher = StubFetcher::new(&[("https://monzo.com/", r#"<a href="/a">a</a>"#)])
            .with_delay(Duration::from_secs(30));
        let config = CrawlerConfig::default().with_request_timeout(Duration::from_millis(50));
        let crawler = Crawler::with_fetcher("https://monzo.com/", config, fetcher).unwrap();

        tokio::time::timeout(Duration::from_secs(5), crawler.scrape())
            .await
            .expect("per-request timeout was not applied")
            .unwrap();

        assert_eq!(crawler.stats().fetch_failures, 1);
        assert_eq!(crawler.urls().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_worker_panic_does_not_hang_crawl() {
        let mut fetcher = StubFetcher::new(&[(
            "https://monzo.com/",
            r#"<a href="/boom">boom</a><a href="/fine">fine</a>"#,
        )]);
        fetcher.panic_on = Some("https://monzo.com/boom".to_string());
        let crawler = crawler("https://monzo.com/", fetcher);

        tokio::time::timeout(Duration::from_secs(5), crawler.scrape())
            .await
            .expect("crawl hung after worker panic")
            .unwrap();

        assert_eq!(crawler.urls().len(), 3);
        assert_eq!(crawler.state(), CrawlState::Done);
    }

    #[tokio::test]
    async fn test_second_scrape_is_rejected() {
        let crawler = crawler("https://monzo.com/", StubFetcher::default());
        crawler.scrape().await.unwrap();
        assert!(matches!(
            crawler.scrape().await,
            Err(CrawlError::AlreadyStarted)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_wait_returns_after_scrape() {
        let fetcher = StubFetcher::new(&[("https://monzo.com/", r#"<a href="/a">a</a>"#)])
            .with_delay(Duration::from_millis(20));
        let crawler = crawler("https://monzo.com/", fetcher);

        let (scraped, ()) = tokio::join!(crawler.scrape(), crawler.wait());
        scraped.unwrap();

        assert_eq!(crawler.state(), CrawlState::Done);
        // Already done: returns immediately
        tokio::time::timeout(Duration::from_secs(1), crawler.wait())
            .await
            .unwrap();
    }
}
