//! Search frontend: query parsing, HTML pages, HTTP server

mod pages;
mod query;
mod server;

pub use pages::{render_error, render_results, render_search_page};
pub use query::{parse_query, QueryError, MAX_QUERY_TERMS};
pub use server::{bind, build_router, serve};
