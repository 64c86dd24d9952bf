//! HTML rendering for the search frontend
//!
//! Three pages: the seed search form, the result listing, and a generic
//! error page. Everything user- or crawl-supplied is escaped before it is
//! interpolated.

use crate::storage::SearchResult;

const PAGE_HEADER: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Spindex Search</title>
<style>
body { font-family: sans-serif; max-width: 720px; margin: 2em auto; color: #222; }
.search-form { margin: 1.5em 0; }
.search-input { width: 70%; padding: 0.5em; font-size: 1em; }
.search-button { padding: 0.5em 1.2em; font-size: 1em; }
.result { margin: 1.2em 0; }
.result-title a { font-size: 1.1em; }
.result-url { color: #060; font-size: 0.9em; }
.result-relevance { color: #666; font-size: 0.85em; }
.error { color: #a00; }
.back-link { display: inline-block; margin-top: 1em; }
</style>
</head>
<body>
"#;

const PAGE_FOOTER: &str = "</body>\n</html>\n";

/// The seed search form
pub fn render_search_page() -> String {
    let mut html = String::from(PAGE_HEADER);
    html.push_str(
        r#"<h1>Spindex Search</h1>
<form method="POST" action="/search" class="search-form">
<input type="text" name="query" placeholder="Enter a search query..." class="search-input" required>
<button type="submit" class="search-button">Search</button>
</form>
<p>Up to 4 words per query, 3 characters minimum each.</p>
"#,
    );
    html.push_str(PAGE_FOOTER);
    html
}

/// The result listing for a query
pub fn render_results(query: &str, results: &[SearchResult]) -> String {
    let escaped_query = escape_html(query);

    let mut html = String::from(PAGE_HEADER);
    html.push_str(&format!(
        r#"<h1>Search results</h1>
<form method="POST" action="/search" class="search-form">
<input type="text" name="query" value="{}" class="search-input">
<button type="submit" class="search-button">Search</button>
</form>
<a href="/" class="back-link">&larr; New search</a>
"#,
        escaped_query
    ));

    if results.is_empty() {
        html.push_str(&format!(
            "<h2>Nothing found</h2>\n<p>No documents match \"{}\".</p>\n",
            escaped_query
        ));
    } else {
        html.push_str(&format!("<h2>Found {} result(s)</h2>\n", results.len()));

        for (position, result) in results.iter().enumerate() {
            let url = escape_html(&result.url);
            let title = escape_html(&result.title);
            html.push_str(&format!(
                r#"<div class="result">
<div class="result-title"><a href="{url}" target="_blank">{title}</a></div>
<div class="result-url">{url}</div>
<div class="result-relevance">Relevance: {} | Result #{}</div>
</div>
"#,
                result.relevance,
                position + 1,
            ));
        }
    }

    html.push_str(PAGE_FOOTER);
    html
}

/// A generic error page with a way back to the form
pub fn render_error(message: &str) -> String {
    let mut html = String::from(PAGE_HEADER);
    html.push_str(&format!(
        r#"<div class="error">
<h2>Error</h2>
<p>{}</p>
<a href="/" class="back-link">&larr; Back to search</a>
</div>
"#,
        escape_html(message)
    ));
    html.push_str(PAGE_FOOTER);
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
