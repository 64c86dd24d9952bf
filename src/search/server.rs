//! HTTP search frontend
//!
//! Wire contract: the form is served on GET `/`, `/search`, and
//! `/index.html`; POST `/search` takes an `application/x-www-form-urlencoded`
//! body and reads only its `query` field. Bad query input is a 400, a store
//! failure is a 500, everything else is 404/405. Every response carries
//! `Connection: close`.
//!
//! The frontend is read-only with respect to the store and never touches
//! the crawler's state.

use crate::search::pages::{render_error, render_results, render_search_page};
use crate::search::query::parse_query;
use crate::storage::Store;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

/// Maximum number of results returned per query
const RESULT_LIMIT: usize = 10;

#[derive(Clone)]
struct AppState {
    store: Arc<dyn Store>,
}

/// The POST body; any other fields are ignored
#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    query: String,
}

/// Builds the frontend router around a store handle
pub fn build_router(store: Arc<dyn Store>) -> Router {
    Router::new()
        .route("/", get(search_page))
        .route("/index.html", get(search_page))
        .route("/search", get(search_page).post(search))
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONNECTION,
            HeaderValue::from_static("close"),
        ))
        .with_state(AppState { store })
}

/// Binds the frontend listener
///
/// Split from [`serve`] so a port conflict surfaces as a fatal startup
/// error instead of dying inside a background task.
pub async fn bind(port: u16) -> std::io::Result<tokio::net::TcpListener> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Search frontend listening on http://localhost:{}", port);
    Ok(listener)
}

/// Serves the frontend until `shutdown` resolves
///
/// In-flight responses complete before the server exits.
pub async fn serve(
    listener: tokio::net::TcpListener,
    store: Arc<dyn Store>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, build_router(store))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn search_page() -> Html<String> {
    Html(render_search_page())
}

async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> (StatusCode, Html<String>) {
    let terms = match parse_query(&form.query) {
        Ok(terms) => terms,
        Err(e) => {
            tracing::debug!("Rejected query '{}': {}", form.query, e);
            return (StatusCode::BAD_REQUEST, Html(render_error(&e.to_string())));
        }
    };

    match state.store.search(&terms, RESULT_LIMIT).await {
        Ok(results) => {
            tracing::info!("Query '{}' matched {} document(s)", form.query, results.len());
            (StatusCode::OK, Html(render_results(&form.query, &results)))
        }
        Err(e) => {
            tracing::error!("Search failed for '{}': {}", form.query, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_error("Search backend failure")),
            )
        }
    }
}

async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(render_error("404 Not Found")))
}
