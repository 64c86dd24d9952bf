//! PostgreSQL store implementation
//!
//! Concurrency discipline: read-only operations take the shared side of an
//! `RwLock`, mutations take the exclusive side. Each operation runs on its
//! own pooled connection and commits before the lock is released, so a
//! reader never observes a half-applied mutation of the same operation.

use crate::config::DatabaseConfig;
use crate::storage::schema::SCHEMA_SQL;
use crate::storage::traits::{
    DocumentSummary, SearchResult, Store, StoreError, StoreResult, StoreStats,
};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::Row;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Maximum pooled connections; workers and the frontend share the pool
const MAX_CONNECTIONS: u32 = 10;

/// PostgreSQL-backed store
pub struct PgStore {
    pool: PgPool,
    lock: RwLock<()>,
}

impl PgStore {
    /// Connects to the database described by the configuration
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(StoreError::Connect)?;

        tracing::info!("Connected to database '{}' on {}", config.name, config.host);

        Ok(Self {
            pool,
            lock: RwLock::new(()),
        })
    }

    /// Builds a store from an existing pool (used by the ignored DB tests)
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            lock: RwLock::new(()),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        let _guard = self.lock.write().await;

        let mut tx = self.pool.begin().await?;
        for statement in SCHEMA_SQL {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!("Schema ensured");
        Ok(())
    }

    async fn upsert_document(&self, url: &str, title: &str, content: &str) -> StoreResult<i64> {
        let _guard = self.lock.write().await;

        let row = sqlx::query(
            "INSERT INTO documents (url, title, content)
             VALUES ($1, $2, $3)
             ON CONFLICT (url) DO UPDATE SET title = EXCLUDED.title, content = EXCLUDED.content
             RETURNING id",
        )
        .bind(url)
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        let id: i32 = row.get("id");
        Ok(i64::from(id))
    }

    async fn upsert_postings(&self, doc_id: i64, postings: &[(String, u32)]) -> StoreResult<()> {
        let _guard = self.lock.write().await;

        let mut tx = self.pool.begin().await?;

        for (term, frequency) in postings {
            let row = sqlx::query(
                "INSERT INTO words (word) VALUES ($1)
                 ON CONFLICT (word) DO UPDATE SET word = EXCLUDED.word
                 RETURNING id",
            )
            .bind(term)
            .fetch_one(&mut *tx)
            .await?;
            let word_id: i32 = row.get("id");

            sqlx::query(
                "INSERT INTO document_words (document_id, word_id, frequency)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (document_id, word_id) DO UPDATE SET frequency = EXCLUDED.frequency",
            )
            .bind(doc_id as i32)
            .bind(word_id)
            .bind(*frequency as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn url_exists(&self, url: &str) -> StoreResult<bool> {
        let _guard = self.lock.read().await;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM documents WHERE url = $1)")
                .bind(url)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn doc_id_for(&self, url: &str) -> StoreResult<Option<i64>> {
        let _guard = self.lock.read().await;

        let id: Option<i32> = sqlx::query_scalar("SELECT id FROM documents WHERE url = $1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id.map(i64::from))
    }

    async fn term_id_for(&self, term: &str) -> StoreResult<Option<i64>> {
        let _guard = self.lock.read().await;

        let id: Option<i32> = sqlx::query_scalar("SELECT id FROM words WHERE word = $1")
            .bind(term)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id.map(i64::from))
    }

    async fn search(&self, terms: &[String], limit: usize) -> StoreResult<Vec<SearchResult>> {
        // De-duplicate the input preserving user order; the AND condition
        // counts distinct matched terms against this set's size
        let mut seen = HashSet::new();
        let distinct: Vec<String> = terms
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();

        if distinct.is_empty() {
            return Ok(Vec::new());
        }
        let term_count = distinct.len() as i64;

        let _guard = self.lock.read().await;

        let rows = sqlx::query(
            "SELECT d.url, d.title, SUM(dw.frequency)::BIGINT AS relevance
             FROM documents d
             JOIN document_words dw ON d.id = dw.document_id
             JOIN words w ON dw.word_id = w.id
             WHERE w.word = ANY($1)
             GROUP BY d.id, d.url, d.title
             HAVING COUNT(DISTINCT w.word) = $2
             ORDER BY relevance DESC, d.id
             LIMIT $3",
        )
        .bind(distinct)
        .bind(term_count)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let results = rows
            .into_iter()
            .map(|row| {
                let title: Option<String> = row.get("title");
                SearchResult {
                    url: row.get("url"),
                    title: title.unwrap_or_default(),
                    relevance: row.get("relevance"),
                }
            })
            .collect();

        Ok(results)
    }

    async fn list_documents(&self) -> StoreResult<Vec<DocumentSummary>> {
        let _guard = self.lock.read().await;

        let rows = sqlx::query("SELECT id, url, title FROM documents ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let documents = rows
            .into_iter()
            .map(|row| {
                let id: i32 = row.get("id");
                let title: Option<String> = row.get("title");
                DocumentSummary {
                    id: i64::from(id),
                    url: row.get("url"),
                    title: title.unwrap_or_default(),
                }
            })
            .collect();

        Ok(documents)
    }

    async fn terms_of(&self, doc_id: i64) -> StoreResult<Vec<(String, u32)>> {
        let _guard = self.lock.read().await;

        let rows = sqlx::query(
            "SELECT w.word, dw.frequency
             FROM words w
             JOIN document_words dw ON w.id = dw.word_id
             WHERE dw.document_id = $1
             ORDER BY dw.frequency DESC",
        )
        .bind(doc_id as i32)
        .fetch_all(&self.pool)
        .await?;

        let terms = rows
            .into_iter()
            .map(|row| {
                let frequency: i32 = row.get("frequency");
                (row.get("word"), frequency as u32)
            })
            .collect();

        Ok(terms)
    }

    async fn delete_document(&self, doc_id: i64) -> StoreResult<()> {
        let _guard = self.lock.write().await;

        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(doc_id as i32)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn wipe_all(&self) -> StoreResult<()> {
        let _guard = self.lock.write().await;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM document_words").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM documents").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM words").execute(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!("Store wiped");
        Ok(())
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        let _guard = self.lock.read().await;

        let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        let terms: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await?;
        let postings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM document_words")
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreStats {
            documents,
            terms,
            postings,
        })
    }
}
