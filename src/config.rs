use clap::ValueEnum;
use std::collections::BTreeSet;

use crate::error::AnalysisError;

pub const DEFAULT_FAILURE_CODE: &str = "401";
pub const DEFAULT_FAILURE_LITERAL: &str = "failed";
pub const DEFAULT_AUTH_MARKER: &str = "POST /login";
pub const DEFAULT_SUSPICIOUS_THRESHOLD: u64 = 3;

/// How a failed status is turned into a failed-authentication count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FailureRule {
    /// A failure status code or the failure literal is enough.
    #[default]
    StatusOnly,
    /// The line must also hit the auth endpoint marker (e.g. `POST /login` and `401`).
    AuthEndpoint,
}

/// Which field-extraction rules the tokenizer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LineFormat {
    /// Free-text rules when a request line is present, columnar otherwise.
    #[default]
    Auto,
    /// `<address> <endpoint> <status>` by whitespace position.
    Columnar,
    /// Fields embedded in free text, found by pattern.
    FreeText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub failure_status_codes: BTreeSet<String>,
    pub failure_literal: Option<String>,
    pub auth_endpoint_marker: Option<String>,
    pub suspicious_threshold: u64,
    pub failure_rule: FailureRule,
    pub line_format: LineFormat,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            failure_status_codes: BTreeSet::from([DEFAULT_FAILURE_CODE.to_string()]),
            failure_literal: Some(DEFAULT_FAILURE_LITERAL.to_string()),
            auth_endpoint_marker: Some(DEFAULT_AUTH_MARKER.to_string()),
            suspicious_threshold: DEFAULT_SUSPICIOUS_THRESHOLD,
            failure_rule: FailureRule::default(),
            line_format: LineFormat::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.suspicious_threshold == 0 {
            return Err(AnalysisError::InvalidConfig(
                "suspicious threshold must be at least 1".to_string(),
            ));
        }

        if let Some(code) = self
            .failure_status_codes
            .iter()
            .find(|code| code.is_empty() || code.chars().any(char::is_whitespace))
        {
            return Err(AnalysisError::InvalidConfig(format!(
                "failure status code {code:?} must be a single non-empty token"
            )));
        }

        if matches!(self.failure_literal.as_deref(), Some("")) {
            return Err(AnalysisError::InvalidConfig(
                "failure literal must not be empty".to_string(),
            ));
        }

        if matches!(self.auth_endpoint_marker.as_deref(), Some("")) {
            return Err(AnalysisError::InvalidConfig(
                "auth endpoint marker must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
