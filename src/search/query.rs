//! Search query parsing
//!
//! Raw form input is tokenized on whitespace, stripped of punctuation
//! (keeping `-`), and pushed through the same normalization the indexer
//! applies to page tokens, so Cyrillic queries case-fold identically to the
//! stored terms.

use crate::indexer;
use thiserror::Error;

/// Upper bound on terms per query
pub const MAX_QUERY_TERMS: usize = 4;

/// Rejected query input, surfaced to the client as 400 Bad Request
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Empty search query")]
    Empty,

    #[error("No valid search terms in query")]
    NoValidTerms,

    #[error("Too many search terms in query (maximum {MAX_QUERY_TERMS})")]
    TooManyTerms,
}

/// Parses a raw query string into normalized search terms
///
/// Tokens survive iff, after punctuation stripping and normalization, they
/// are 3..=32 bytes long and contain at least one letter. More than
/// [`MAX_QUERY_TERMS`] surviving tokens is an input error.
pub fn parse_query(raw: &str) -> Result<Vec<String>, QueryError> {
    if raw.trim().is_empty() {
        return Err(QueryError::Empty);
    }

    let mut terms = Vec::new();
    for token in raw.split_whitespace() {
        let stripped: String = token
            .chars()
            .filter(|c| !(c.is_ascii_punctuation() && *c != '-'))
            .collect();

        let normalized = indexer::normalize_token(&stripped);
        if indexer::is_valid_term(&normalized) {
            terms.push(normalized);
        }
    }

    if terms.is_empty() {
        return Err(QueryError::NoValidTerms);
    }

    if terms.len() > MAX_QUERY_TERMS {
        return Err(QueryError::TooManyTerms);
    }

    Ok(terms)
}
