// src/services/links.rs

//! URL discovery in the catalog and link check outcomes.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[.*?\]\((https?://[^\s<>)]+)\)").expect("inline link pattern is a valid regex")
});
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>]+").expect("bare URL pattern is a valid regex"));

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', ')'];

/// Unique URLs in document order: inline link targets first, then bare URLs.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    let inline = INLINE_LINK
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION).to_string());

    let bare = BARE_URL.find_iter(text).map(|m| {
        let before = text[..m.start()].chars().next_back();
        strip_enclosing(m.as_str(), before)
            .trim_end_matches(TRAILING_PUNCTUATION)
            .to_string()
    });

    for url in inline.chain(bare) {
        if !url.is_empty() && seen.insert(url.clone()) {
            urls.push(url);
        }
    }
    urls
}

/// Drop a closing bracket that pairs with the character before the URL.
fn strip_enclosing(url: &str, before: Option<char>) -> &str {
    let closing = match before {
        Some('(') => ')',
        Some('[') => ']',
        Some('{') => '}',
        _ => return url,
    };
    url.strip_suffix(closing).unwrap_or(url)
}

/// 1-based number of the first line containing `url`, 0 when absent.
pub fn line_number(text: &str, url: &str) -> usize {
    text.split('\n')
        .position(|line| line.contains(url))
        .map_or(0, |index| index + 1)
}

/// URLs, or fragments such as domains, whose findings are tolerated.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    entries: Vec<String>,
}

impl IgnoreList {
    pub fn new(entries: &[String]) -> Self {
        Self {
            entries: entries
                .iter()
                .filter(|entry| !entry.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Exact or substring match.
    pub fn matches(&self, url: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| url == entry.as_str() || url.contains(entry.as_str()))
    }
}

/// Outcome of checking one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Ok,
    Redirected { final_url: String },
    Failed { error: String },
}

/// A checked URL with its position in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResult {
    /// 1-based position in extraction order
    pub index: usize,
    pub url: String,
    pub line: usize,
    pub status: LinkStatus,
    /// Matched the ignore list for its kind of finding
    pub ignored: bool,
}

impl LinkResult {
    pub fn is_redirect(&self) -> bool {
        matches!(self.status, LinkStatus::Redirected { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, LinkStatus::Failed { .. })
    }
}
