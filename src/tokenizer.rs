//! Turns one raw log line into a [`LogRecord`].
//!
//! Two layouts are understood:
//!
//! - columnar lines such as `10.0.0.1 /home 200`, where the first three
//!   whitespace-separated tokens are address, endpoint and status;
//! - free-text lines such as combined access-log entries
//!   (`192.168.1.1 - - [..] "POST /login HTTP/1.1" 401 128`), where the
//!   address, request path and status are located by pattern.
//!
//! Tokenizing never fails. Anything that cannot be determined is left `None`.

use crate::config::{AnalysisConfig, LineFormat};
use crate::patterns::{AddressMatcher, RequestLine, RequestMatcher};

/// Lines with fewer whitespace tokens than this carry no fields.
pub const MIN_TOKENS: usize = 3;

pub const SUCCESS_LITERAL: &str = "success";

/// Punctuation stripped from free-text tokens before they are inspected.
const TOKEN_TRIM: &[char] = &['"', '\'', '[', ']', '(', ')', ',', ';', ':', '.'];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRecord {
    pub source_address: Option<String>,
    pub endpoint: Option<String>,
    pub status: Option<String>,
    /// The raw line contained the configured auth endpoint marker.
    pub auth_attempt: bool,
}

impl LogRecord {
    pub fn is_empty(&self) -> bool {
        self.source_address.is_none() && self.endpoint.is_none() && self.status.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct LineTokenizer {
    format: LineFormat,
    failure_literal: Option<String>,
    auth_marker: Option<String>,
    addresses: AddressMatcher,
    requests: RequestMatcher,
}

impl LineTokenizer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            format: config.line_format,
            failure_literal: config.failure_literal.clone(),
            auth_marker: config.auth_endpoint_marker.clone(),
            addresses: AddressMatcher,
            requests: RequestMatcher,
        }
    }

    pub fn tokenize(&self, line: &str) -> LogRecord {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.split_whitespace().nth(MIN_TOKENS - 1).is_none() {
            return LogRecord::default();
        }

        let mut record = match self.format {
            LineFormat::Columnar => columnar(line),
            LineFormat::FreeText => self.free_text(line, self.requests.find(line)),
            LineFormat::Auto => match self.requests.find(line) {
                Some(request) => self.free_text(line, Some(request)),
                // e.g. a combined-log line with a `"-"` request field
                None if looks_like_access_log(line) => self.free_text(line, None),
                None => columnar(line),
            },
        };

        record.auth_attempt = self
            .auth_marker
            .as_deref()
            .is_some_and(|marker| line.contains(marker));
        record
    }

    fn free_text(&self, line: &str, request: Option<RequestLine<'_>>) -> LogRecord {
        let source_address = self.addresses.first_address(line).map(str::to_string);
        let endpoint = request.map(|r| r.path.to_string());

        // The status follows the request when there is one.
        let tail = request.map_or(line, |r| &line[r.end..]);
        let status = numeric_status(tail)
            .map(str::to_string)
            .or_else(|| self.status_word(line));

        LogRecord {
            source_address,
            endpoint,
            status,
            auth_attempt: false,
        }
    }

    fn status_word(&self, line: &str) -> Option<String> {
        let failure = self.failure_literal.as_deref();
        line.split_whitespace()
            .map(|token| token.trim_matches(TOKEN_TRIM))
            .find_map(|token| {
                if failure.is_some_and(|word| token.eq_ignore_ascii_case(word)) {
                    failure.map(str::to_string)
                } else if token.eq_ignore_ascii_case(SUCCESS_LITERAL) {
                    Some(SUCCESS_LITERAL.to_string())
                } else {
                    None
                }
            })
    }
}

fn columnar(line: &str) -> LogRecord {
    let mut tokens = line.split_whitespace().map(str::to_string);
    LogRecord {
        source_address: tokens.next(),
        endpoint: tokens.next(),
        status: tokens.next(),
        auth_attempt: false,
    }
}

/// Quoted request fields and bracketed timestamps never occur in the
/// positional layout.
fn looks_like_access_log(line: &str) -> bool {
    line.contains('"') || (line.contains('[') && line.contains(']'))
}

/// First standalone three-digit token, e.g. the `401` in `HTTP/1.1" 401 128`.
fn numeric_status(text: &str) -> Option<&str> {
    text.split_whitespace()
        .map(|token| token.trim_matches(TOKEN_TRIM))
        .find(|token| token.len() == 3 && token.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> LineTokenizer {
        LineTokenizer::new(&AnalysisConfig::default())
    }

    fn tokenizer_with(format: LineFormat) -> LineTokenizer {
        LineTokenizer::new(&AnalysisConfig {
            line_format: format,
            ..AnalysisConfig::default()
        })
    }

    #[test]
    fn columnar_fields_by_position() {
        let record = tokenizer().tokenize("10.0.0.1 /home 200");
        assert_eq!(record.source_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(record.endpoint.as_deref(), Some("/home"));
        assert_eq!(record.status.as_deref(), Some("200"));
        assert!(!record.auth_attempt);
    }

    #[test]
    fn columnar_literal_status() {
        let record = tokenizer().tokenize("192.168.1.7 /login failed\n");
        assert_eq!(record.status.as_deref(), Some("failed"));
        assert_eq!(record.endpoint.as_deref(), Some("/login"));
    }

    #[test]
    fn short_lines_yield_nothing() {
        for line in ["", "   ", "10.0.0.1", "10.0.0.1 /home", "\r\n"] {
            let record = tokenizer().tokenize(line);
            assert!(record.is_empty(), "line {line:?} produced {record:?}");
        }
    }

    #[test]
    fn combined_log_line() {
        let line = r#"203.0.113.5 - - [03/Dec/2024:10:12:34 +0000] "POST /login HTTP/1.1" 401 128 "Invalid credentials""#;
        let record = tokenizer().tokenize(line);
        assert_eq!(record.source_address.as_deref(), Some("203.0.113.5"));
        assert_eq!(record.endpoint.as_deref(), Some("/login"));
        assert_eq!(record.status.as_deref(), Some("401"));
        assert!(record.auth_attempt);
    }

    #[test]
    fn bare_request_line() {
        let record = tokenizer().tokenize("10.0.0.5 POST /login 401");
        assert_eq!(record.source_address.as_deref(), Some("10.0.0.5"));
        assert_eq!(record.endpoint.as_deref(), Some("/login"));
        assert_eq!(record.status.as_deref(), Some("401"));
        assert!(record.auth_attempt);
    }

    #[test]
    fn status_taken_after_request() {
        // The 404 ahead of the request is not the status.
        let record = tokenizer().tokenize(r#"10.1.1.1 - 404 "GET /about HTTP/1.1" 200 10"#);
        assert_eq!(record.status.as_deref(), Some("200"));
    }

    #[test]
    fn webdav_and_proxy_requests() {
        let record = tokenizer().tokenize(
            r#"10.0.0.8 - - [03/Dec/2024:10:12:34 +0000] "PROPFIND /dav HTTP/1.1" 207 0"#,
        );
        assert_eq!(record.endpoint.as_deref(), Some("/dav"));
        assert_eq!(record.status.as_deref(), Some("207"));

        let record = tokenizer().tokenize(
            r#"10.0.0.8 - - [03/Dec/2024:10:12:34 +0000] "GET http://ex.com/x HTTP/1.1" 200 5"#,
        );
        assert_eq!(record.source_address.as_deref(), Some("10.0.0.8"));
        assert_eq!(record.endpoint.as_deref(), Some("http://ex.com/x"));
        assert_eq!(record.status.as_deref(), Some("200"));
    }

    #[test]
    fn unrecognized_request_leaves_endpoint_unset() {
        let record =
            tokenizer().tokenize(r#"10.0.0.8 - - [03/Dec/2024:10:12:34 +0000] "-" 400 0"#);
        assert_eq!(record.source_address.as_deref(), Some("10.0.0.8"));
        assert_eq!(record.endpoint, None);
        assert_eq!(record.status.as_deref(), Some("400"));

        let record = tokenizer().tokenize(
            r#"10.0.0.9 - - [03/Dec/2024:10:12:35 +0000] "\x16\x03\x01" 400 0"#,
        );
        assert_eq!(record.endpoint, None);
        assert_eq!(record.status.as_deref(), Some("400"));
    }

    #[test]
    fn free_text_literal_fallback() {
        let record =
            tokenizer_with(LineFormat::FreeText).tokenize("sshd: login FAILED for admin from 10.9.8.7");
        assert_eq!(record.source_address.as_deref(), Some("10.9.8.7"));
        assert_eq!(record.endpoint, None);
        assert_eq!(record.status.as_deref(), Some("failed"));
    }

    #[test]
    fn free_text_success_word() {
        let record =
            tokenizer_with(LineFormat::FreeText).tokenize("login success for bob from 10.9.8.7");
        assert_eq!(record.status.as_deref(), Some("success"));
    }

    #[test]
    fn free_text_without_address() {
        let record = tokenizer_with(LineFormat::FreeText).tokenize("GET /health from probe");
        assert_eq!(record.source_address, None);
        assert_eq!(record.endpoint.as_deref(), Some("/health"));
        assert_eq!(record.status, None);
    }

    #[test]
    fn forced_columnar_ignores_request_line() {
        let record = tokenizer_with(LineFormat::Columnar).tokenize("10.0.0.5 POST /login 401");
        assert_eq!(record.endpoint.as_deref(), Some("POST"));
        assert_eq!(record.status.as_deref(), Some("/login"));
        assert!(record.auth_attempt);
    }

    #[test]
    fn marker_disabled() {
        let tokenizer = LineTokenizer::new(&AnalysisConfig {
            auth_endpoint_marker: None,
            ..AnalysisConfig::default()
        });
        assert!(!tokenizer.tokenize("10.0.0.5 POST /login 401").auth_attempt);
    }
}
