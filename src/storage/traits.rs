//! Store trait and error types
//!
//! The trait is the seam between the crawl/search code and the relational
//! backend; tests substitute an in-memory implementation through it.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    /// Sum of the document's frequencies over the matched query terms
    pub relevance: i64,
}

/// One row of the document listing
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub id: i64,
    pub url: String,
    pub title: String,
}

/// Row counts across the three tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub documents: i64,
    pub terms: i64,
    pub postings: i64,
}

/// Durable mapping of documents to terms with frequencies
///
/// Term text is case-folded by the caller before it reaches the store; the
/// store treats it as an opaque key. Implementations must be safe to share
/// between the crawl workers and the search frontend. Errors always
/// surface; the store never retries on its own.
#[async_trait]
pub trait Store: Send + Sync {
    /// Idempotently creates the tables and their constraints
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// Inserts a document or updates title and content in place
    ///
    /// Returns the document id. On conflict the existing id and
    /// `created_at` are preserved.
    async fn upsert_document(&self, url: &str, title: &str, content: &str) -> StoreResult<i64>;

    /// Writes term frequencies for one document in a single transaction
    ///
    /// Each term is found or inserted, then its posting is inserted or
    /// updated with the new frequency (last write wins).
    async fn upsert_postings(&self, doc_id: i64, postings: &[(String, u32)]) -> StoreResult<()>;

    /// Whether a document with this URL is already persisted
    async fn url_exists(&self, url: &str) -> StoreResult<bool>;

    /// Document id for a URL, if any
    async fn doc_id_for(&self, url: &str) -> StoreResult<Option<i64>>;

    /// Term id for a term text, if any
    async fn term_id_for(&self, term: &str) -> StoreResult<Option<i64>>;

    /// Multi-term AND search ranked by summed frequency
    ///
    /// Returns documents containing *every* term of the de-duplicated
    /// input, scored by the sum of the matched frequencies, ordered by
    /// score descending, capped at `limit`. Empty input yields an empty
    /// result.
    async fn search(&self, terms: &[String], limit: usize) -> StoreResult<Vec<SearchResult>>;

    /// All documents, ordered by id ascending
    async fn list_documents(&self) -> StoreResult<Vec<DocumentSummary>>;

    /// Terms of one document with frequencies, ordered by frequency descending
    async fn terms_of(&self, doc_id: i64) -> StoreResult<Vec<(String, u32)>>;

    /// Deletes a document; its postings go with it
    async fn delete_document(&self, doc_id: i64) -> StoreResult<()>;

    /// Truncates documents, terms, and postings
    async fn wipe_all(&self) -> StoreResult<()>;

    /// Row counts for documents, terms, and postings
    async fn stats(&self) -> StoreResult<StoreStats>;
}
