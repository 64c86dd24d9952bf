//! Shared test support: an in-memory `Store` implementation
//!
//! Behaves like the PostgreSQL store for everything the crawl and frontend
//! tests observe: upsert semantics, AND search with summed-frequency
//! ranking, and cascade on delete. A `failing()` variant errors on every
//! operation to exercise 500 paths.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use spindex::storage::{
    DocumentSummary, SearchResult, Store, StoreError, StoreResult, StoreStats,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct DocRecord {
    id: i64,
    title: String,
    content: String,
}

#[derive(Default)]
struct Inner {
    next_doc_id: i64,
    next_term_id: i64,
    docs: HashMap<String, DocRecord>,
    terms: HashMap<String, i64>,
    postings: HashMap<(i64, i64), u32>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            fail: false,
        }
    }

    /// A store whose every operation fails
    pub fn failing() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            fail: true,
        }
    }

    fn check(&self) -> StoreResult<()> {
        if self.fail {
            Err(StoreError::Sql(sqlx::Error::PoolClosed))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        self.check()
    }

    async fn upsert_document(&self, url: &str, title: &str, content: &str) -> StoreResult<i64> {
        self.check()?;
        let mut inner = self.inner.lock();
        if let Some(doc) = inner.docs.get_mut(url) {
            doc.title = title.to_string();
            doc.content = content.to_string();
            return Ok(doc.id);
        }
        inner.next_doc_id += 1;
        let id = inner.next_doc_id;
        inner.docs.insert(
            url.to_string(),
            DocRecord {
                id,
                title: title.to_string(),
                content: content.to_string(),
            },
        );
        Ok(id)
    }

    async fn upsert_postings(&self, doc_id: i64, postings: &[(String, u32)]) -> StoreResult<()> {
        self.check()?;
        let mut inner = self.inner.lock();
        for (term, frequency) in postings {
            let term_id = match inner.terms.get(term).copied() {
                Some(id) => id,
                None => {
                    inner.next_term_id += 1;
                    let id = inner.next_term_id;
                    inner.terms.insert(term.clone(), id);
                    id
                }
            };
            inner.postings.insert((doc_id, term_id), *frequency);
        }
        Ok(())
    }

    async fn url_exists(&self, url: &str) -> StoreResult<bool> {
        self.check()?;
        Ok(self.inner.lock().docs.contains_key(url))
    }

    async fn doc_id_for(&self, url: &str) -> StoreResult<Option<i64>> {
        self.check()?;
        Ok(self.inner.lock().docs.get(url).map(|d| d.id))
    }

    async fn term_id_for(&self, term: &str) -> StoreResult<Option<i64>> {
        self.check()?;
        Ok(self.inner.lock().terms.get(term).copied())
    }

    async fn search(&self, terms: &[String], limit: usize) -> StoreResult<Vec<SearchResult>> {
        self.check()?;

        let mut seen = HashSet::new();
        let distinct: Vec<&String> = terms.iter().filter(|t| seen.insert(t.as_str())).collect();
        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        let inner = self.inner.lock();
        let term_ids: Vec<Option<i64>> = distinct
            .iter()
            .map(|t| inner.terms.get(t.as_str()).copied())
            .collect();

        // A term unknown to the store can match nothing
        if term_ids.iter().any(|id| id.is_none()) {
            return Ok(Vec::new());
        }

        let mut hits: Vec<(i64, SearchResult)> = Vec::new();
        for (url, doc) in &inner.docs {
            let mut relevance: i64 = 0;
            let mut matches_all = true;
            for term_id in term_ids.iter().flatten() {
                match inner.postings.get(&(doc.id, *term_id)) {
                    Some(frequency) => relevance += i64::from(*frequency),
                    None => {
                        matches_all = false;
                        break;
                    }
                }
            }
            if matches_all {
                hits.push((
                    doc.id,
                    SearchResult {
                        url: url.clone(),
                        title: doc.title.clone(),
                        relevance,
                    },
                ));
            }
        }

        hits.sort_by(|a, b| b.1.relevance.cmp(&a.1.relevance).then(a.0.cmp(&b.0)));
        Ok(hits.into_iter().map(|(_, r)| r).take(limit).collect())
    }

    async fn list_documents(&self) -> StoreResult<Vec<DocumentSummary>> {
        self.check()?;
        let inner = self.inner.lock();
        let mut documents: Vec<DocumentSummary> = inner
            .docs
            .iter()
            .map(|(url, doc)| DocumentSummary {
                id: doc.id,
                url: url.clone(),
                title: doc.title.clone(),
            })
            .collect();
        documents.sort_by_key(|d| d.id);
        Ok(documents)
    }

    async fn terms_of(&self, doc_id: i64) -> StoreResult<Vec<(String, u32)>> {
        self.check()?;
        let inner = self.inner.lock();
        let id_to_term: HashMap<i64, &String> =
            inner.terms.iter().map(|(t, id)| (*id, t)).collect();
        let mut terms: Vec<(String, u32)> = inner
            .postings
            .iter()
            .filter(|((d, _), _)| *d == doc_id)
            .filter_map(|((_, term_id), freq)| {
                id_to_term.get(term_id).map(|t| ((*t).clone(), *freq))
            })
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(terms)
    }

    async fn delete_document(&self, doc_id: i64) -> StoreResult<()> {
        self.check()?;
        let mut inner = self.inner.lock();
        inner.docs.retain(|_, doc| doc.id != doc_id);
        inner.postings.retain(|(d, _), _| *d != doc_id);
        Ok(())
    }

    async fn wipe_all(&self) -> StoreResult<()> {
        self.check()?;
        let mut inner = self.inner.lock();
        inner.docs.clear();
        inner.terms.clear();
        inner.postings.clear();
        Ok(())
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        self.check()?;
        let inner = self.inner.lock();
        Ok(StoreStats {
            documents: inner.docs.len() as i64,
            terms: inner.terms.len() as i64,
            postings: inner.postings.len() as i64,
        })
    }
}
