//! HTML indexing pipeline
//!
//! Turns a raw HTML body into a title, a cleaned plain-text content string,
//! and a term-frequency table. The pipeline is pure: no state is shared
//! between calls, so any number of workers may index concurrently.
//!
//! Tokens survive normalization iff they are 3..=32 bytes long and contain
//! at least one letter. Lowercasing covers ASCII `A-Z` and Cyrillic `А-Я`
//! (plus `Ё`→`ё`); everything else passes through unchanged.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

/// Minimum term length in bytes, after normalization
const MIN_TERM_LEN: usize = 3;

/// Maximum term length in bytes, after normalization
const MAX_TERM_LEN: usize = 32;

/// Errors produced by the indexing pipeline
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Invalid text-processing pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result of indexing one page
#[derive(Debug, Clone)]
pub struct PageIndex {
    /// Page title, never empty (falls back to the URL, then "Untitled")
    pub title: String,

    /// Cleaned plain-text content as stored on the document
    pub clean_content: String,

    /// Normalized terms with occurrence counts, sorted by count descending
    pub term_frequencies: Vec<(String, u32)>,
}

/// Compiled regular expressions for the cleaning pipeline
struct Patterns {
    script: Regex,
    style: Regex,
    tag: Regex,
    control_ws: Regex,
    punct: Regex,
    spaces: Regex,
    title: Regex,
    h1: Regex,
}

fn patterns() -> Result<&'static Patterns, IndexError> {
    static PATTERNS: OnceCell<Patterns> = OnceCell::new();
    PATTERNS.get_or_try_init(|| {
        Ok(Patterns {
            script: Regex::new(r"(?is)<script\b[^>]*>.*?</script>")?,
            style: Regex::new(r"(?is)<style\b[^>]*>.*?</style>")?,
            tag: Regex::new(r"<[^>]*>")?,
            control_ws: Regex::new(r"[\t\n\r]+")?,
            punct: Regex::new(r"[^a-zA-Z0-9\sа-яА-ЯёЁ]")?,
            spaces: Regex::new(r"\s+")?,
            title: Regex::new(r"(?is)<title[^>]*>(.*?)</title>")?,
            h1: Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>")?,
        })
    })
}

/// Indexes one page: title extraction, HTML cleaning, term counting
pub fn index(html: &str, url: &str) -> Result<PageIndex, IndexError> {
    let patterns = patterns()?;

    let title = extract_title(patterns, html, url);
    let clean_content = clean_html(patterns, html);
    let term_frequencies = count_terms(&clean_content);

    Ok(PageIndex {
        title,
        clean_content,
        term_frequencies,
    })
}

/// Extracts a page title with a fallback chain
///
/// First non-empty of: `<title>` inner text, `<h1>` inner text, the last
/// path segment of the URL with any query string stripped, "Untitled".
fn extract_title(patterns: &Patterns, html: &str, url: &str) -> String {
    for re in [&patterns.title, &patterns.h1] {
        if let Some(captures) = re.captures(html) {
            let inner = inner_text(patterns, &captures[1]);
            if !inner.is_empty() {
                return inner;
            }
        }
    }

    let segment = match url.rfind('/') {
        Some(slash) => &url[slash + 1..],
        None => url,
    };
    let segment = segment.split('?').next().unwrap_or("");
    if !segment.is_empty() {
        return segment.to_string();
    }

    "Untitled".to_string()
}

/// Strips tags from an HTML fragment and collapses whitespace
fn inner_text(patterns: &Patterns, fragment: &str) -> String {
    let text = patterns.tag.replace_all(fragment, " ");
    patterns.spaces.replace_all(&text, " ").trim().to_string()
}

/// Reduces an HTML body to plain text
///
/// Removes script/style/title blocks, decodes the five most common
/// entities, strips the remaining tags, drops punctuation while keeping
/// Latin and Cyrillic letters and digits, and collapses whitespace. The
/// title is carried on the document separately, so its text does not
/// count toward body term frequencies.
fn clean_html(patterns: &Patterns, html: &str) -> String {
    let text = patterns.script.replace_all(html, " ");
    let text = patterns.style.replace_all(&text, " ");
    let text = patterns.title.replace_all(&text, " ");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"");

    let text = patterns.tag.replace_all(&text, " ");
    let text = patterns.control_ws.replace_all(&text, " ");
    let text = patterns.punct.replace_all(&text, " ");
    let text = patterns.spaces.replace_all(&text, " ");

    text.trim().to_string()
}

/// Lowercases a token: ASCII `A-Z`, Cyrillic `А-Я`, `Ё`→`ё`
///
/// Other characters pass through unchanged.
pub fn normalize_token(token: &str) -> String {
    token
        .chars()
        .map(|c| match c {
            'A'..='Z' => c.to_ascii_lowercase(),
            'А'..='Я' => char::from_u32(c as u32 + 0x20).unwrap_or(c),
            'Ё' => 'ё',
            _ => c,
        })
        .collect()
}

/// Whether a normalized token is kept as a term
///
/// Kept iff the byte length is within [3, 32] and at least one character is
/// a letter.
pub fn is_valid_term(token: &str) -> bool {
    (MIN_TERM_LEN..=MAX_TERM_LEN).contains(&token.len())
        && token.chars().any(|c| c.is_alphabetic())
}

/// Counts normalized term occurrences in cleaned text
///
/// The result is sorted by frequency descending; ties break on the term
/// text so the output is deterministic.
fn count_terms(text: &str) -> Vec<(String, u32)> {
    let mut counts: HashMap<String, u32> = HashMap::new();

    for token in text.split_whitespace() {
        let normalized = normalize_token(token);
        if is_valid_term(&normalized) {
            *counts.entry(normalized).or_insert(0) += 1;
        }
    }

    let mut result: Vec<(String, u32)> = counts.into_iter().collect();
    result.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_title_tag() {
        let idx = index("<html><title>Hello</title><body>x</body></html>", "http://a/b").unwrap();
        assert_eq!(idx.title, "Hello");
    }

    #[test]
    fn test_title_inner_tags_stripped() {
        let idx = index(
            "<title>  A <b>bold</b>\n title </title>",
            "http://a/b",
        )
        .unwrap();
        assert_eq!(idx.title, "A bold title");
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let idx = index("<h1>Heading</h1><p>body</p>", "http://a/b").unwrap();
        assert_eq!(idx.title, "Heading");
    }

    #[test]
    fn test_title_falls_back_to_url_segment() {
        let idx = index("<p>no headings</p>", "http://a/docs/page.html?x=1").unwrap();
        assert_eq!(idx.title, "page.html");
    }

    #[test]
    fn test_title_falls_back_to_untitled() {
        let idx = index("<p>no headings</p>", "http://a.example/").unwrap();
        assert_eq!(idx.title, "Untitled");
    }

    #[test]
    fn test_script_and_style_contents_removed() {
        let idx = index(
            "<script>var skipme = 1;</script><style>p { color: red }</style><p>keep this</p>",
            "http://a/b",
        )
        .unwrap();
        assert_eq!(idx.clean_content, "keep this");
    }

    #[test]
    fn test_entities_decoded() {
        let idx = index("<p>fish&nbsp;&amp;&nbsp;chips</p>", "http://a/b").unwrap();
        // '&' itself is punctuation, so it is stripped after decoding
        assert_eq!(idx.clean_content, "fish chips");
    }

    #[test]
    fn test_punctuation_stripped_digits_kept() {
        let idx = index("<p>one, two! 42 three.</p>", "http://a/b").unwrap();
        assert_eq!(idx.clean_content, "one two 42 three");
    }

    #[test]
    fn test_cyrillic_survives_cleaning() {
        let idx = index("<p>Привет, мир!</p>", "http://a/b").unwrap();
        assert_eq!(idx.clean_content, "Привет мир");
    }

    #[test]
    fn test_term_counting_is_case_folded() {
        let idx = index(
            "<html><title>Hello</title><body>Foo foo BAR.</body></html>",
            "http://a/b",
        )
        .unwrap();
        assert_eq!(
            idx.term_frequencies,
            vec![("foo".to_string(), 2), ("bar".to_string(), 1)]
        );
    }

    #[test]
    fn test_cyrillic_lowercased() {
        assert_eq!(normalize_token("Привет"), "привет");
        assert_eq!(normalize_token("ЁЖИК"), "ёжик");
    }

    #[test]
    fn test_short_and_long_tokens_rejected() {
        assert!(!is_valid_term("ab"));
        assert!(is_valid_term("abc"));
        assert!(is_valid_term(&"a".repeat(32)));
        assert!(!is_valid_term(&"a".repeat(33)));
    }

    #[test]
    fn test_letterless_tokens_rejected() {
        assert!(!is_valid_term("12345"));
        assert!(is_valid_term("a1234"));
        assert!(is_valid_term("привет"));
    }

    #[test]
    fn test_term_length_is_bytes() {
        // Two Cyrillic characters are four bytes, so "яд" passes the
        // 3-byte floor even though it is only two letters
        assert!(is_valid_term("яд"));
    }

    #[test]
    fn test_empty_input_yields_empty_terms() {
        let idx = index("", "http://a/b").unwrap();
        assert!(idx.term_frequencies.is_empty());
        assert!(idx.clean_content.is_empty());
    }

    #[test]
    fn test_frequencies_sorted_descending() {
        let idx = index(
            "<p>delta delta delta echo echo foxtrot</p>",
            "http://a/b",
        )
        .unwrap();
        let freqs: Vec<u32> = idx.term_frequencies.iter().map(|(_, f)| *f).collect();
        assert_eq!(freqs, vec![3, 2, 1]);
    }
}
