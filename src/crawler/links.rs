//! Outbound link extraction
//!
//! Anchors are pulled out of the HTML with a tolerant parser; hrefs are then
//! resolved against the page URL with plain string rules rather than full
//! RFC 3986 joining. The output of this module feeds straight back into the
//! crawl queue, so every returned URL is absolute.

use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracts outbound links from an HTML body, resolved against `base_url`
///
/// Filtering and resolution rules:
/// - empty, fragment-only (`#...`), `javascript:`, `mailto:` and `tel:`
///   hrefs are discarded;
/// - hrefs containing `://` are taken as-is;
/// - root-relative hrefs (`/path`) are joined to the scheme+authority of
///   `base_url`;
/// - all other hrefs are joined to `base_url` up to and including its last
///   `/`;
/// - fragments are stripped from the result;
/// - a result that still lacks a scheme and does not begin with `/` gets an
///   `http://` prefix;
/// - duplicates are dropped, keeping first-seen order.
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let origin = base_origin(base_url);

    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(h) => h,
            None => continue,
        };

        if let Some(link) = resolve_href(href, base_url, &origin) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    links
}

/// Scheme+authority prefix of a URL, e.g. `http://example.com`
///
/// A base without `://` gets an `http://` prefix instead.
fn base_origin(base_url: &str) -> String {
    match base_url.find("://") {
        Some(proto) => {
            let rest = &base_url[proto + 3..];
            match rest.find('/') {
                Some(slash) => base_url[..proto + 3 + slash].to_string(),
                None => base_url.to_string(),
            }
        }
        None => format!("http://{}", base_url),
    }
}

/// Resolves one href to an absolute URL, or None if it must be skipped
fn resolve_href(href: &str, base_url: &str, origin: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let mut link = if href.contains("://") {
        href.to_string()
    } else if href.starts_with('/') {
        if let Some(stripped) = origin.strip_suffix('/') {
            format!("{}{}", stripped, href)
        } else {
            format!("{}{}", origin, href)
        }
    } else {
        // Join to the base up to and including its last '/'
        match base_url.rfind('/') {
            Some(last_slash) => format!("{}{}", &base_url[..=last_slash], href),
            None => format!("{}/{}", origin, href),
        }
    };

    if let Some(anchor) = link.find('#') {
        link.truncate(anchor);
    }

    if !link.contains("://") && !link.starts_with('/') {
        link = format!("http://{}", link);
    }

    Some(link)
}
