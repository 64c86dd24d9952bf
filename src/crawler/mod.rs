//! Crawler module: fetching, link extraction, and the crawl scheduler
//!
//! The spider drives a bounded-depth breadth-first traversal: workers pop
//! queued URLs, the fetcher downloads them, the indexer distills them, the
//! store persists them, and extracted links feed back into the queue.

mod fetcher;
mod links;
mod spider;

pub use fetcher::{FetchError, Fetcher};
pub use links::extract_links;
pub use spider::{CrawlTask, Spider, SpiderStats};
