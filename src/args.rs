use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::{
    AnalysisConfig, FailureRule, LineFormat, DEFAULT_AUTH_MARKER, DEFAULT_FAILURE_CODE,
    DEFAULT_FAILURE_LITERAL, DEFAULT_SUSPICIOUS_THRESHOLD,
};

#[derive(Parser, Debug)]
#[command(
    name = "logsift",
    about = "Analyze a server access log for request counts, endpoint usage and failed logins",
    version,
    long_about = None
)]
pub struct Args {
    /// Log file to analyze
    #[arg(value_name = "LOG_FILE")]
    pub log_file: PathBuf,

    /// Failed logins at or above this count mark a source as suspicious
    #[arg(short = 'n', long, default_value_t = DEFAULT_SUSPICIOUS_THRESHOLD)]
    pub threshold: u64,

    /// Status code counted as a failed login (repeatable)
    #[arg(long = "failure-code", value_name = "CODE", default_values_t = [DEFAULT_FAILURE_CODE.to_string()])]
    pub failure_codes: Vec<String>,

    /// Status word counted as a failed login
    #[arg(long, default_value = DEFAULT_FAILURE_LITERAL)]
    pub failure_literal: String,

    /// Do not treat any status word as a failed login
    #[arg(long)]
    pub no_failure_literal: bool,

    /// Text marking a request to the authentication endpoint
    #[arg(long, default_value = DEFAULT_AUTH_MARKER)]
    pub auth_marker: String,

    /// Do not look for an auth endpoint marker at all
    #[arg(long)]
    pub no_auth_marker: bool,

    /// Whether a failed status alone counts, or only on the auth endpoint
    #[arg(long, value_enum, default_value_t = FailureRule::StatusOnly)]
    pub failure_rule: FailureRule,

    /// Field layout of the log lines
    #[arg(short, long, value_enum, default_value_t = LineFormat::Auto)]
    pub format: LineFormat,

    /// CSV file for the results
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip writing the CSV file
    #[arg(long)]
    pub no_csv: bool,

    /// Number of top sources and endpoints to display
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Number of least accessed endpoints to display
    #[arg(long)]
    pub bottom: Option<usize>,

    /// Number of worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Mask source addresses in console output
    #[arg(long)]
    pub redact: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            failure_status_codes: self.failure_codes.iter().cloned().collect::<BTreeSet<_>>(),
            failure_literal: (!self.no_failure_literal).then(|| self.failure_literal.clone()),
            auth_endpoint_marker: (!self.no_auth_marker).then(|| self.auth_marker.clone()),
            suspicious_threshold: self.threshold,
            failure_rule: self.failure_rule,
            line_format: self.format,
        }
    }
}
