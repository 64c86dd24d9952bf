//! Crawl scheduler and worker pool
//!
//! The spider owns a FIFO task queue, the set of URLs already handled in
//! this process run, and a pool of workers. Workers pop tasks, download and
//! index the page, persist the result, and feed extracted links back as new
//! tasks one level deeper. A URL is processed at most once per run: the
//! check-and-insert against the processed set is a single critical section.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::links::extract_links;
use crate::indexer;
use crate::storage::Store;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

/// Consecutive idle samples required before the crawl counts as finished
const QUIESCENCE_SAMPLES: u32 = 3;

/// One unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u32,
}

/// Snapshot of the spider's counters
#[derive(Debug, Clone, Copy, Default)]
pub struct SpiderStats {
    pub downloaded: u64,
    pub indexed: u64,
    pub active_workers: usize,
    pub shutdown: bool,
    pub queue_size: usize,
}

/// State shared between the spider handle and its workers
struct Shared {
    queue: Mutex<VecDeque<CrawlTask>>,
    processed: Mutex<HashSet<String>>,
    notify: Notify,
    shutdown: AtomicBool,
    downloaded: AtomicU64,
    indexed: AtomicU64,
    active_workers: AtomicUsize,
    max_depth: u32,
    fetcher: Fetcher,
    store: Arc<dyn Store>,
}

/// Breadth-first crawl driver
pub struct Spider {
    shared: Arc<Shared>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl Spider {
    pub fn new(store: Arc<dyn Store>, fetcher: Fetcher, max_depth: u32) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::new()),
                processed: Mutex::new(HashSet::new()),
                notify: Notify::new(),
                shutdown: AtomicBool::new(false),
                downloaded: AtomicU64::new(0),
                indexed: AtomicU64::new(0),
                active_workers: AtomicUsize::new(0),
                max_depth,
                fetcher,
                store,
            }),
            shutdown_tx,
            shutdown_rx,
            workers: Vec::new(),
        }
    }

    /// Default worker count: host parallelism, never below 2
    pub fn default_worker_count() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2)
            .max(2)
    }

    /// Adds a task to the queue and wakes one waiting worker
    ///
    /// Rejected (returning false) when the depth exceeds the configured
    /// maximum or the URL was already handled in this run.
    pub fn enqueue(&self, url: impl Into<String>, depth: u32) -> bool {
        self.shared.enqueue(url.into(), depth)
    }

    /// Spawns the worker pool
    pub fn start(&mut self, worker_count: usize) {
        tracing::info!(
            "Starting spider: {} workers, max depth {}",
            worker_count,
            self.shared.max_depth
        );

        for id in 0..worker_count {
            let shared = Arc::clone(&self.shared);
            let shutdown_rx = self.shutdown_rx.clone();
            self.workers
                .push(tokio::spawn(worker_loop(shared, shutdown_rx, id)));
        }
    }

    /// Requests shutdown, wakes all workers, and joins them
    ///
    /// Workers drain the remaining queue before exiting; in-flight
    /// downloads run to their timeout.
    pub async fn stop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(true);

        for handle in self.workers.drain(..) {
            let _ = handle.await;
        }

        let stats = self.stats();
        tracing::info!(
            "Spider stopped: {} downloaded, {} indexed",
            stats.downloaded,
            stats.indexed
        );
    }

    /// Snapshot of counters and queue length
    pub fn stats(&self) -> SpiderStats {
        // Workers increment active_workers while holding the queue lock,
        // so sampling both under it yields a consistent pair
        let queue = self.shared.queue.lock();
        SpiderStats {
            downloaded: self.shared.downloaded.load(Ordering::Relaxed),
            indexed: self.shared.indexed.load(Ordering::Relaxed),
            active_workers: self.shared.active_workers.load(Ordering::SeqCst),
            shutdown: self.shared.shutdown.load(Ordering::SeqCst),
            queue_size: queue.len(),
        }
    }

    /// Whether any worker is currently processing a task
    pub fn running(&self) -> bool {
        self.shared.active_workers.load(Ordering::SeqCst) > 0
    }

    /// Waits until the queue stays empty and all workers stay idle
    ///
    /// The idle condition must hold for several consecutive samples so a
    /// transient lull between a pop and the resulting link fan-out is not
    /// misread as completion.
    pub async fn wait_for_quiescence(&self, interval: Duration) {
        let mut idle_samples = 0;
        while idle_samples < QUIESCENCE_SAMPLES {
            tokio::time::sleep(interval).await;
            let stats = self.stats();
            if stats.queue_size == 0 && stats.active_workers == 0 {
                idle_samples += 1;
            } else {
                idle_samples = 0;
            }
        }
    }
}

impl Shared {
    fn enqueue(&self, url: String, depth: u32) -> bool {
        if depth > self.max_depth {
            return false;
        }

        {
            let processed = self.processed.lock();
            if processed.contains(&url) {
                return false;
            }
        }

        self.queue.lock().push_back(CrawlTask { url, depth });
        self.notify.notify_one();
        true
    }

    /// Handles one task; every failure is logged and abandons the URL
    async fn process(&self, task: CrawlTask) {
        // Claim the URL. The insert doubles as the membership test, so two
        // workers holding the same URL cannot both proceed. The claim is
        // not rolled back on failure: a URL is attempted once per run.
        if !self.processed.lock().insert(task.url.clone()) {
            tracing::debug!("Skipping already-processed URL: {}", task.url);
            return;
        }

        match self.store.url_exists(&task.url).await {
            Ok(true) => {
                tracing::debug!("Already persisted in an earlier run: {}", task.url);
                return;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Store lookup failed for {}: {}", task.url, e);
                return;
            }
        }

        tracing::debug!("Processing [{}] {}", task.depth, task.url);

        let body = match self.fetcher.download(&task.url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Download failed for {}: {}", task.url, e);
                return;
            }
        };
        self.downloaded.fetch_add(1, Ordering::Relaxed);

        let page = match indexer::index(&body, &task.url) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Indexing failed for {}: {}", task.url, e);
                return;
            }
        };
        self.indexed.fetch_add(1, Ordering::Relaxed);

        let doc_id = match self
            .store
            .upsert_document(&task.url, &page.title, &page.clean_content)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Failed to save document {}: {}", task.url, e);
                return;
            }
        };

        if !page.term_frequencies.is_empty() {
            if let Err(e) = self.store.upsert_postings(doc_id, &page.term_frequencies).await {
                tracing::error!("Failed to save postings for {}: {}", task.url, e);
                return;
            }
        }

        if task.depth < self.max_depth {
            let links = extract_links(&body, &task.url);
            tracing::debug!("Found {} links on {}", links.len(), task.url);
            for link in links {
                self.enqueue(link, task.depth + 1);
            }
        }
    }
}

/// One worker: pop, process, repeat; exit once shutdown is set and the
/// queue has drained
async fn worker_loop(shared: Arc<Shared>, mut shutdown_rx: watch::Receiver<bool>, id: usize) {
    loop {
        let task = {
            let mut queue = shared.queue.lock();
            let task = queue.pop_front();
            if task.is_some() {
                shared.active_workers.fetch_add(1, Ordering::SeqCst);
            }
            task
        };

        match task {
            Some(task) => {
                shared.process(task).await;
                shared.active_workers.fetch_sub(1, Ordering::SeqCst);
            }
            None => {
                if shared.shutdown.load(Ordering::SeqCst) {
                    break;
                }
                tokio::select! {
                    _ = shared.notify.notified() => {}
                    _ = shutdown_rx.changed() => {}
                }
            }
        }
    }

    tracing::debug!("Worker {} exiting", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpiderConfig;
    use crate::storage::{DocumentSummary, SearchResult, StoreResult, StoreStats};
    use async_trait::async_trait;

    /// Store stub for scheduler-only tests; nothing is persisted
    struct NullStore;

    #[async_trait]
    impl Store for NullStore {
        async fn ensure_schema(&self) -> StoreResult<()> {
            Ok(())
        }
        async fn upsert_document(&self, _: &str, _: &str, _: &str) -> StoreResult<i64> {
            Ok(1)
        }
        async fn upsert_postings(&self, _: i64, _: &[(String, u32)]) -> StoreResult<()> {
            Ok(())
        }
        async fn url_exists(&self, _: &str) -> StoreResult<bool> {
            Ok(false)
        }
        async fn doc_id_for(&self, _: &str) -> StoreResult<Option<i64>> {
            Ok(None)
        }
        async fn term_id_for(&self, _: &str) -> StoreResult<Option<i64>> {
            Ok(None)
        }
        async fn search(&self, _: &[String], _: usize) -> StoreResult<Vec<SearchResult>> {
            Ok(Vec::new())
        }
        async fn list_documents(&self) -> StoreResult<Vec<DocumentSummary>> {
            Ok(Vec::new())
        }
        async fn terms_of(&self, _: i64) -> StoreResult<Vec<(String, u32)>> {
            Ok(Vec::new())
        }
        async fn delete_document(&self, _: i64) -> StoreResult<()> {
            Ok(())
        }
        async fn wipe_all(&self) -> StoreResult<()> {
            Ok(())
        }
        async fn stats(&self) -> StoreResult<StoreStats> {
            Ok(StoreStats::default())
        }
    }

    fn test_spider(max_depth: u32) -> Spider {
        let config = SpiderConfig {
            start_url: "http://example.com/".to_string(),
            max_depth,
            run_spider: true,
            wipe_on_start: false,
            verify_tls: true,
        };
        let fetcher = Fetcher::new(&config).unwrap();
        Spider::new(Arc::new(NullStore), fetcher, max_depth)
    }

    #[tokio::test]
    async fn test_enqueue_accepts_within_depth() {
        let spider = test_spider(2);
        assert!(spider.enqueue("http://example.com/a", 0));
        assert!(spider.enqueue("http://example.com/b", 2));
        assert_eq!(spider.stats().queue_size, 2);
    }

    #[tokio::test]
    async fn test_enqueue_rejects_beyond_depth() {
        let spider = test_spider(2);
        assert!(!spider.enqueue("http://example.com/deep", 3));
        assert_eq!(spider.stats().queue_size, 0);
    }

    #[tokio::test]
    async fn test_enqueue_rejects_processed_url() {
        let spider = test_spider(2);
        spider
            .shared
            .processed
            .lock()
            .insert("http://example.com/seen".to_string());

        assert!(!spider.enqueue("http://example.com/seen", 0));
        assert!(spider.enqueue("http://example.com/new", 0));
    }

    #[tokio::test]
    async fn test_stats_snapshot_initial() {
        let spider = test_spider(1);
        let stats = spider.stats();
        assert_eq!(stats.downloaded, 0);
        assert_eq!(stats.indexed, 0);
        assert_eq!(stats.active_workers, 0);
        assert!(!stats.shutdown);
        assert_eq!(stats.queue_size, 0);
        assert!(!spider.running());
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let mut spider = test_spider(1);
        spider.stop().await;
        assert!(spider.stats().shutdown);
    }

    #[tokio::test]
    async fn test_workers_drain_queue_and_exit_on_stop() {
        let mut spider = test_spider(0);
        // Unresolvable host: downloads fail fast and are abandoned
        spider.enqueue("http://spindex-test.invalid/a", 0);
        spider.enqueue("http://spindex-test.invalid/b", 0);

        spider.start(2);
        spider.wait_for_quiescence(Duration::from_millis(20)).await;

        let stats = spider.stats();
        assert_eq!(stats.queue_size, 0);
        assert_eq!(stats.active_workers, 0);

        spider.stop().await;
        assert!(!spider.running());
    }
}
