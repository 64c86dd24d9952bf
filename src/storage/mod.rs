//! Storage module: the durable side of the service
//!
//! Three tables: documents, words, and the posting table joining them with
//! per-document frequencies. The `Store` trait is the only surface the
//! crawler and the frontend see; `PgStore` is the PostgreSQL backend.

mod postgres;
mod schema;
mod traits;

pub use postgres::PgStore;
pub use schema::SCHEMA_SQL;
pub use traits::{DocumentSummary, SearchResult, Store, StoreError, StoreResult, StoreStats};
