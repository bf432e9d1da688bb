use serde::Serialize;

use crate::aggregator::FrequencyTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspiciousSource {
    pub source_address: String,
    pub failed_attempts: u64,
}

/// Every source whose failed-authentication count reaches `threshold`,
/// in first-seen order.
pub fn classify(failed_by_source: &FrequencyTable, threshold: u64) -> Vec<SuspiciousSource> {
    failed_by_source
        .iter()
        .filter(|&(_, count)| count >= threshold)
        .map(|(source, count)| SuspiciousSource {
            source_address: source.to_string(),
            failed_attempts: count,
        })
        .collect()
}
