use crate::aggregator::{FrequencyTable, Tables};
use crate::classifier::{classify, SuspiciousSource};
use crate::error::AnalysisError;
use crate::report::{self, EndpointCount};

/// Frozen outcome of one analysis pass. Built once the whole input is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub by_source: FrequencyTable,
    pub by_endpoint: FrequencyTable,
    pub failed_by_source: FrequencyTable,
    pub ranked_by_source: Vec<(String, u64)>,
    pub ranked_endpoints: Vec<(String, u64)>,
    pub suspicious_sources: Vec<SuspiciousSource>,
    pub suspicious_threshold: u64,
    pub lines_read: u64,
    pub lines_skipped: u64,
}

impl Tables {
    pub fn freeze(self, suspicious_threshold: u64) -> AnalysisResult {
        AnalysisResult {
            ranked_by_source: report::rank(&self.by_source),
            ranked_endpoints: report::rank(&self.by_endpoint),
            suspicious_sources: classify(&self.failed_by_source, suspicious_threshold),
            suspicious_threshold,
            by_source: self.by_source,
            by_endpoint: self.by_endpoint,
            failed_by_source: self.failed_by_source,
            lines_read: self.lines_read,
            lines_skipped: self.lines_skipped,
        }
    }
}

impl AnalysisResult {
    pub fn most_accessed_endpoint(&self) -> Result<EndpointCount, AnalysisError> {
        report::most_accessed(&self.by_endpoint)
    }

    pub fn least_accessed_endpoint(&self) -> Result<EndpointCount, AnalysisError> {
        report::least_accessed(&self.by_endpoint)
    }
}
