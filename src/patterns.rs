use regex::Regex;
use std::sync::LazyLock;

/// Four dot-separated groups of 1-3 digits. Octet ranges are not checked.
const ADDRESS_PATTERN: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";

/// An upper-case method token (HTTP or WebDAV) followed by an absolute path
/// or an absolute URL as sent to proxies, quoted or bare.
const REQUEST_PATTERN: &str =
    r#"\b([A-Z][A-Z_-]{1,15}) +(/[^\s"]*|[a-zA-Z][a-zA-Z0-9+.-]*://[^\s"]*)"#;

static ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ADDRESS_PATTERN).expect("address pattern is a valid regex"));

static REQUEST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(REQUEST_PATTERN).expect("request pattern is a valid regex"));

/// Finds IPv4-shaped substrings in free-form text.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressMatcher;

impl AddressMatcher {
    /// Lazily yields every address-shaped substring, left to right.
    pub fn find_addresses<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        ADDRESS_REGEX.find_iter(text).map(|m| m.as_str())
    }

    pub fn first_address<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.find_addresses(text).next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLine<'t> {
    pub method: &'t str,
    pub path: &'t str,
    /// Byte offset just past the path; the status follows somewhere after it.
    pub end: usize,
}

/// Finds `METHOD /path` request lines embedded in a log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMatcher;

impl RequestMatcher {
    pub fn find<'t>(&self, text: &'t str) -> Option<RequestLine<'t>> {
        let captures = REQUEST_REGEX.captures(text)?;
        let method = captures.get(1)?;
        let path = captures.get(2)?;
        Some(RequestLine {
            method: method.as_str(),
            path: path.as_str(),
            end: path.end(),
        })
    }
}
