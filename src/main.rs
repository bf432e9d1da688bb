use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::error;

use logsift::output::{self, DisplayOptions, DEFAULT_CSV_PATH};
use logsift::utils::{setup_logging, validate_args};
use logsift::{analyze_log_file, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    validate_args(&args)?;

    let config = args.analysis_config();
    let result = match analyze_log_file(&args.log_file, &config, args.workers) {
        Ok(result) => result,
        Err(e) => {
            error!(action = "fail", component = "log_analysis", error = %e, "Analysis failed");
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let options = DisplayOptions {
        top: args.top,
        bottom: args.bottom,
        redact: args.redact,
    };
    output::print_analysis_results(&result, &args.log_file, &options)?;

    if !args.no_csv {
        let csv_path = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH));
        output::save_csv(&result, &csv_path)?;
        println!("\nResults have been saved to '{}'.", csv_path.display());
    }

    Ok(())
}
