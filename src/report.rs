//! Ranked and extremal views over the frequency tables.

use serde::Serialize;

use crate::aggregator::FrequencyTable;
use crate::error::AnalysisError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointCount {
    pub endpoint: String,
    pub count: u64,
}

/// Entries sorted by count, highest first. Ties keep first-seen order.
pub fn rank(table: &FrequencyTable) -> Vec<(String, u64)> {
    let mut ranked: Vec<(String, u64)> = table
        .iter()
        .map(|(key, count)| (key.to_string(), count))
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

pub fn top(ranked: &[(String, u64)], n: usize) -> &[(String, u64)] {
    &ranked[..n.min(ranked.len())]
}

/// The `n` lowest entries, least accessed first. Ties keep first-seen order,
/// so the first entry agrees with [`least_accessed`].
pub fn bottom(ranked: &[(String, u64)], n: usize) -> Vec<(String, u64)> {
    let mut lowest = ranked.to_vec();
    lowest.sort_by(|a, b| a.1.cmp(&b.1));
    lowest.truncate(n);
    lowest
}

pub fn most_accessed(by_endpoint: &FrequencyTable) -> Result<EndpointCount, AnalysisError> {
    extremal(by_endpoint, |count, best| count > best)
}

pub fn least_accessed(by_endpoint: &FrequencyTable) -> Result<EndpointCount, AnalysisError> {
    extremal(by_endpoint, |count, best| count < best)
}

/// First endpoint, in first-seen order, that no later entry strictly beats.
fn extremal(
    by_endpoint: &FrequencyTable,
    beats: impl Fn(u64, u64) -> bool,
) -> Result<EndpointCount, AnalysisError> {
    let mut entries = by_endpoint.iter();
    let first = entries
        .next()
        .ok_or(AnalysisError::EmptyInput { table: "endpoint" })?;

    let (endpoint, count) = entries.fold(first, |best, candidate| {
        if beats(candidate.1, best.1) {
            candidate
        } else {
            best
        }
    });

    Ok(EndpointCount {
        endpoint: endpoint.to_string(),
        count,
    })
}
