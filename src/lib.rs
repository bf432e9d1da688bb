pub mod aggregator;
pub mod analysis;
pub mod args;
pub mod classifier;
pub mod config;
pub mod error;
pub mod output;
pub mod patterns;
pub mod report;
pub mod stats;
pub mod tokenizer;
pub mod utils;

pub use aggregator::{FailureMatcher, FrequencyTable, Tables};
pub use analysis::{analyze, analyze_log_file, analyze_parallel};
pub use args::Args;
pub use classifier::{classify, SuspiciousSource};
pub use config::{AnalysisConfig, FailureRule, LineFormat};
pub use error::AnalysisError;
pub use report::EndpointCount;
pub use stats::AnalysisResult;
pub use tokenizer::{LineTokenizer, LogRecord};
