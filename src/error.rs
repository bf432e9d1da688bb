//! Errors that cross the analysis boundary.
//!
//! Per-line parsing problems are never reported here: a malformed line just
//! yields absent fields and is left out of the affected tables.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A most/least view was requested over a table with no entries.
    #[error("no data: the {table} table is empty")]
    EmptyInput { table: &'static str },

    /// The log source could not be opened or read.
    #[error("could not read log file '{}': {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
