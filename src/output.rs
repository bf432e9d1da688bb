//! Console tables and CSV persistence for an [`AnalysisResult`].

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::report;
use crate::stats::AnalysisResult;
use crate::utils::{format_number, redact_address};

pub const DEFAULT_CSV_PATH: &str = "log_analysis_results.csv";

pub const SOURCE_HEADERS: [&str; 2] = ["IP Address", "Request Count"];
pub const ENDPOINT_HEADERS: [&str; 2] = ["Endpoint", "Access Count"];
pub const SUSPICIOUS_HEADERS: [&str; 2] = ["IP Address", "Failed Login Count"];

const SOURCE_WIDTH: usize = 20;
const ENDPOINT_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    pub top: Option<usize>,
    pub bottom: Option<usize>,
    pub redact: bool,
}

pub fn print_analysis_results(
    result: &AnalysisResult,
    log_path: &Path,
    options: &DisplayOptions,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_console_report(&mut out, result, log_path, options)
}

pub fn write_console_report<W: Write>(
    out: &mut W,
    result: &AnalysisResult,
    log_path: &Path,
    options: &DisplayOptions,
) -> io::Result<()> {
    let show_source = |source: &str| {
        if options.redact {
            redact_address(source)
        } else {
            source.to_string()
        }
    };

    writeln!(out, "\n--- Log Analysis: {} ---", log_path.display())?;
    writeln!(
        out,
        "Lines read: {} ({} without usable fields)",
        format_number(result.lines_read),
        format_number(result.lines_skipped)
    )?;

    writeln!(out, "\nRequests per IP:")?;
    if result.ranked_by_source.is_empty() {
        writeln!(out, "No IP data found in the log file.")?;
    } else {
        let rows = limit(&result.ranked_by_source, options.top);
        writeln!(
            out,
            "{:<SOURCE_WIDTH$} {}",
            SOURCE_HEADERS[0], SOURCE_HEADERS[1]
        )?;
        for (source, count) in rows {
            writeln!(
                out,
                "{:<SOURCE_WIDTH$} {}",
                show_source(source.as_str()),
                format_number(*count)
            )?;
        }
    }

    writeln!(out, "\nMost Accessed Endpoint:")?;
    match (
        result.most_accessed_endpoint(),
        result.least_accessed_endpoint(),
    ) {
        (Ok(most), Ok(least)) => {
            writeln!(
                out,
                "Most Frequently Accessed Endpoint: {} (Accessed {} times)",
                most.endpoint,
                format_number(most.count)
            )?;
            writeln!(
                out,
                "Least Frequently Accessed Endpoint: {} (Accessed {} times)",
                least.endpoint,
                format_number(least.count)
            )?;
            writeln!(
                out,
                "{:<ENDPOINT_WIDTH$} {}",
                ENDPOINT_HEADERS[0], ENDPOINT_HEADERS[1]
            )?;
            for (endpoint, count) in limit(&result.ranked_endpoints, options.top) {
                writeln!(out, "{:<ENDPOINT_WIDTH$} {}", endpoint, format_number(*count))?;
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            writeln!(out, "No endpoint data found ({e}).")?;
        }
    }

    if let Some(bottom_count) = options.bottom {
        let lowest = report::bottom(&result.ranked_endpoints, bottom_count);
        writeln!(out, "\nBottom {} least accessed endpoints:", lowest.len())?;
        for (endpoint, count) in &lowest {
            writeln!(out, "- {}: {} requests", endpoint, format_number(*count))?;
        }
    }

    if result.suspicious_sources.is_empty() {
        writeln!(out, "\nNo suspicious activity detected.")?;
    } else {
        writeln!(
            out,
            "\nSuspicious Activity Detected (threshold {}):",
            result.suspicious_threshold
        )?;
        writeln!(
            out,
            "{:<SOURCE_WIDTH$} {}",
            SUSPICIOUS_HEADERS[0], SUSPICIOUS_HEADERS[1]
        )?;
        for suspicious in &result.suspicious_sources {
            writeln!(
                out,
                "{:<SOURCE_WIDTH$} {}",
                show_source(suspicious.source_address.as_str()),
                format_number(suspicious.failed_attempts)
            )?;
        }
    }

    Ok(())
}

/// Writes the three sections: title row, header row, data rows, with a
/// blank line between sections.
pub fn write_csv<W: Write>(mut out: W, result: &AnalysisResult) -> Result<()> {
    write_section(
        &mut out,
        "Requests per IP",
        SOURCE_HEADERS,
        &result.ranked_by_source,
    )?;
    out.write_all(b"\n")?;

    write_section(
        &mut out,
        "Most Accessed Endpoint",
        ENDPOINT_HEADERS,
        &result.ranked_endpoints,
    )?;
    out.write_all(b"\n")?;

    write_section(
        &mut out,
        "Suspicious Activity",
        SUSPICIOUS_HEADERS,
        &result.suspicious_sources,
    )?;

    out.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn save_csv(result: &AnalysisResult, path: &Path) -> Result<()> {
    let start_time = Instant::now();
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    write_csv(file, result)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

    info!(
        action = "complete",
        component = "csv_output",
        file_path = ?path,
        duration_ms = start_time.elapsed().as_millis(),
        "Results saved to CSV"
    );
    Ok(())
}

// One writer per section: an empty csv record would be written as `""`,
// so the blank separator goes to `out` directly once the writer is flushed.
fn write_section<W: Write, R: Serialize>(
    out: &mut W,
    title: &str,
    headers: [&str; 2],
    rows: &[R],
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_writer(out);

    writer.write_record([title])?;
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

fn limit(rows: &[(String, u64)], top: Option<usize>) -> &[(String, u64)] {
    match top {
        Some(n) => report::top(rows, n),
        None => rows,
    }
}
