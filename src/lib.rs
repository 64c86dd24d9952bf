//! Spindex: a small crawl-and-index search service
//!
//! This crate implements a breadth-first web spider that downloads pages,
//! extracts per-term frequencies, persists them into a relational store,
//! and an HTTP frontend that answers multi-term queries against that store
//! ranked by aggregate term frequency.

pub mod config;
pub mod crawler;
pub mod indexer;
pub mod search;
pub mod storage;
pub mod supervisor;

use thiserror::Error;

/// Main error type for spindex operations
#[derive(Debug, Error)]
pub enum SpindexError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Index error: {0}")]
    Index(#[from] indexer::IndexError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for spindex operations
pub type Result<T> = std::result::Result<T, SpindexError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Fetcher, Spider};
pub use indexer::{index, PageIndex};
pub use storage::{PgStore, SearchResult, Store};
