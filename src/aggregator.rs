use std::collections::{BTreeSet, HashMap};

use crate::config::{AnalysisConfig, FailureRule};
use crate::tokenizer::LogRecord;

/// Counts per key, iterated in the order keys were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: &str, count: u64) {
        match self.index.get(key) {
            Some(&slot) => self.entries[slot].1 += count,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), count));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    /// Adds every entry of `other`; keys new to `self` keep `other`'s order.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (key, count) in other.iter() {
            self.add(key, count);
        }
    }
}

impl<'a> FromIterator<&'a str> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = &'a str>>(keys: I) -> Self {
        let mut table = FrequencyTable::new();
        for key in keys {
            table.increment(key);
        }
        table
    }
}

/// Decides whether a record counts as a failed authentication.
#[derive(Debug, Clone)]
pub struct FailureMatcher {
    status_codes: BTreeSet<String>,
    literal: Option<String>,
    rule: FailureRule,
    marker_configured: bool,
}

impl FailureMatcher {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            status_codes: config.failure_status_codes.clone(),
            literal: config.failure_literal.clone(),
            rule: config.failure_rule,
            marker_configured: config.auth_endpoint_marker.is_some(),
        }
    }

    pub fn is_failed_status(&self, status: &str) -> bool {
        self.status_codes.contains(status)
            || self
                .literal
                .as_deref()
                .is_some_and(|literal| status.eq_ignore_ascii_case(literal))
    }

    pub fn is_failure(&self, record: &LogRecord) -> bool {
        let failed = record
            .status
            .as_deref()
            .is_some_and(|status| self.is_failed_status(status));

        match self.rule {
            FailureRule::StatusOnly => failed,
            // Without a marker there is nothing to conjoin with.
            FailureRule::AuthEndpoint => failed && (record.auth_attempt || !self.marker_configured),
        }
    }
}

/// The running aggregates of one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub by_source: FrequencyTable,
    pub by_endpoint: FrequencyTable,
    pub failed_by_source: FrequencyTable,
    pub lines_read: u64,
    /// Lines that contributed to no table.
    pub lines_skipped: u64,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, record: &LogRecord, failures: &FailureMatcher) {
        self.lines_read += 1;

        if record.is_empty() {
            self.lines_skipped += 1;
            return;
        }

        if let Some(source) = record.source_address.as_deref() {
            self.by_source.increment(source);

            if failures.is_failure(record) {
                tracing::debug!(
                    action = "detect",
                    component = "failed_login",
                    source_address = source,
                    status = ?record.status,
                    "Found failed authentication attempt"
                );
                self.failed_by_source.increment(source);
            }
        }

        if let Some(endpoint) = record.endpoint.as_deref() {
            self.by_endpoint.increment(endpoint);
        }
    }

    /// Combines a later chunk's aggregates into this one.
    pub fn merge(mut self, other: Tables) -> Tables {
        self.by_source.merge(&other.by_source);
        self.by_endpoint.merge(&other.by_endpoint);
        self.failed_by_source.merge(&other.failed_by_source);
        self.lines_read += other.lines_read;
        self.lines_skipped += other.lines_skipped;
        self
    }
}
