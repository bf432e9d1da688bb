use anyhow::{Context, Result};
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregator::{FailureMatcher, Tables};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::stats::AnalysisResult;
use crate::tokenizer::LineTokenizer;

/// Single pass over `lines` in input order.
pub fn analyze<I, S>(lines: I, config: &AnalysisConfig) -> AnalysisResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let start_time = Instant::now();
    info!(action = "start", component = "log_analysis", "Starting log analysis");

    let tables = fold_lines(lines, config);
    freeze(tables, config, start_time)
}

/// Tokenizes ordered chunks on a rayon pool and merges the partial tables
/// in chunk order, so the result matches [`analyze`] exactly.
pub fn analyze_parallel(
    lines: &[String],
    config: &AnalysisConfig,
    max_workers: Option<usize>,
) -> Result<AnalysisResult> {
    let start_time = Instant::now();
    info!(action = "start", component = "log_analysis", line_count = lines.len(), "Starting parallel log analysis");

    let workers = resolve_workers(max_workers);
    info!(action = "configure", component = "log_analysis", worker_count = workers, "Using workers for processing");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Failed to build worker pool")?;

    let chunk_size = lines.len().div_ceil(workers).max(1);
    let partials: Vec<Tables> = pool.install(|| {
        lines
            .par_chunks(chunk_size)
            .map(|chunk| fold_lines(chunk, config))
            .collect()
    });

    info!(action = "merge", component = "log_analysis", chunk_count = partials.len(), "Merging chunk aggregates");
    let tables = partials.into_iter().fold(Tables::new(), Tables::merge);

    Ok(freeze(tables, config, start_time))
}

/// Reads the log at `path` and analyzes it. The file is closed before the
/// analysis starts, and on every error path.
pub fn analyze_log_file(
    path: &Path,
    config: &AnalysisConfig,
    max_workers: Option<usize>,
) -> Result<AnalysisResult> {
    let total_start_time = Instant::now();
    config.validate()?;

    let lines = read_lines(path)?;
    info!(
        action = "read",
        component = "log_source",
        file_path = ?path,
        line_count = lines.len(),
        duration_ms = total_start_time.elapsed().as_millis(),
        "Loaded log file"
    );

    let result = if resolve_workers(max_workers) == 1 {
        analyze(&lines, config)
    } else {
        analyze_parallel(&lines, config, max_workers)?
    };

    info!(
        action = "complete",
        component = "log_source",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );
    Ok(result)
}

/// Invalid UTF-8 is replaced rather than aborting the read.
pub fn read_lines(path: &Path) -> Result<Vec<String>, AnalysisError> {
    let unavailable = |source| AnalysisError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unavailable)?;
    let mut reader = BufReader::new(file);
    let mut lines = Vec::new();
    let mut buffer = Vec::new();
    let mut lossy_lines = 0usize;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).map_err(unavailable)? == 0 {
            break;
        }
        let line = match String::from_utf8_lossy(&buffer) {
            Cow::Borrowed(line) => line.to_string(),
            Cow::Owned(line) => {
                lossy_lines += 1;
                line
            }
        };
        lines.push(line);
    }

    if lossy_lines > 0 {
        warn!(action = "decode", component = "log_source", lossy_lines, file_path = ?path, "Replaced invalid UTF-8 in log lines");
    }

    Ok(lines)
}

fn fold_lines<I, S>(lines: I, config: &AnalysisConfig) -> Tables
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokenizer = LineTokenizer::new(config);
    let failures = FailureMatcher::new(config);
    let mut tables = Tables::new();
    for line in lines {
        tables.fold(&tokenizer.tokenize(line.as_ref()), &failures);
    }
    tables
}

fn freeze(tables: Tables, config: &AnalysisConfig, start_time: Instant) -> AnalysisResult {
    let result = tables.freeze(config.suspicious_threshold);
    info!(
        action = "complete",
        component = "log_analysis",
        lines_read = result.lines_read,
        lines_skipped = result.lines_skipped,
        unique_sources = result.by_source.len(),
        unique_endpoints = result.by_endpoint.len(),
        suspicious_sources = result.suspicious_sources.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Log analysis completed"
    );
    result
}

fn resolve_workers(max_workers: Option<usize>) -> usize {
    max_workers
        .unwrap_or_else(|| std::cmp::min(num_cpus::get(), 8))
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_lines() -> Vec<String> {
        [
            "10.0.0.1 /home 200",
            "10.0.0.2 /login 401",
            r#"10.0.0.3 - - [03/Dec/2024:10:12:34 +0000] "POST /login HTTP/1.1" 401 128"#,
            "short line",
            "10.0.0.1 /about 200",
            "10.0.0.2 /login 401",
            "10.0.0.2 /login failed",
        ]
        .iter()
        .map(|line| line.to_string())
        .collect()
    }

    #[test]
    fn parallel_matches_sequential() {
        let lines = sample_lines();
        let config = AnalysisConfig::default();
        let sequential = analyze(&lines, &config);

        for workers in [1, 2, 3, 8] {
            let parallel = analyze_parallel(&lines, &config, Some(workers)).unwrap();
            assert_eq!(parallel, sequential, "workers = {workers}");
        }
    }

    #[test]
    fn parallel_on_empty_input() {
        let result = analyze_parallel(&[], &AnalysisConfig::default(), Some(4)).unwrap();
        assert!(result.by_source.is_empty());
        assert_eq!(result.lines_read, 0);
    }

    #[test]
    fn counts_lines_read_and_skipped() {
        let result = analyze(sample_lines(), &AnalysisConfig::default());
        assert_eq!(result.lines_read, 7);
        assert_eq!(result.lines_skipped, 1);
        assert_eq!(result.failed_by_source.get("10.0.0.2"), Some(3));
        assert_eq!(result.suspicious_sources.len(), 1);
    }

    #[test]
    fn missing_file_names_the_path() {
        let path = Path::new("/nonexistent/dir/access.log");
        let err = read_lines(path).unwrap_err();
        assert!(matches!(err, AnalysisError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("/nonexistent/dir/access.log"));

        let err = analyze_log_file(path, &AnalysisConfig::default(), Some(1)).unwrap_err();
        assert!(err.downcast_ref::<AnalysisError>().is_some());
    }

    #[test]
    fn invalid_config_is_rejected_before_reading() {
        let config = AnalysisConfig {
            suspicious_threshold: 0,
            ..AnalysisConfig::default()
        };
        let err = analyze_log_file(Path::new("/nonexistent"), &config, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn reads_file_with_invalid_utf8() {
        let path = std::env::temp_dir().join(format!("logsift-utf8-{}.log", std::process::id()));
        {
            let mut file = File::create(&path).unwrap();
            file.write_all(b"10.0.0.1 /home 200\n10.0.0.2 /caf\xe9 401\r\nshort\n")
                .unwrap();
        }

        let result = analyze_log_file(&path, &AnalysisConfig::default(), Some(2)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(result.lines_read, 3);
        assert_eq!(result.by_source.total(), 2);
        assert_eq!(result.by_endpoint.get("/caf\u{FFFD}"), Some(1));
        assert_eq!(result.failed_by_source.get("10.0.0.2"), Some(1));
    }
}
