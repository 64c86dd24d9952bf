//! HTTP fetcher implementation
//!
//! One GET per call: follow redirects, enforce timeouts, and accept only a
//! final `200 OK`. Anything else is a `FetchError` and the page is skipped.

use crate::config::SpiderConfig;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of redirect hops to follow
const MAX_REDIRECTS: usize = 10;

/// Connect timeout for a single request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total timeout for a single request, body download included
const TOTAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors produced while downloading a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("Failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Downloads pages over HTTP(S)
///
/// Holds a single configured client; no state is retained between calls,
/// so one `Fetcher` can be shared by any number of workers.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Builds a fetcher from the spider configuration
    ///
    /// The client identifies itself with a distinct crawler User-Agent and
    /// follows up to 10 redirects. Certificate verification is controlled
    /// by `verifyTls` and defaults to on.
    pub fn new(config: &SpiderConfig) -> Result<Self, FetchError> {
        let user_agent = format!("SpindexBot/{}", env!("CARGO_PKG_VERSION"));

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(TOTAL_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(!config.verify_tls)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }

    /// Performs a single GET and returns the response body
    ///
    /// Redirects are followed transparently; the *final* response must be
    /// `200 OK`. Any other status, or any transport failure (refused
    /// connection, timeout, TLS error), is a `FetchError`.
    pub async fn download(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?;

        tracing::debug!("Downloaded {} ({} bytes)", url, body.len());
        Ok(body)
    }
}
