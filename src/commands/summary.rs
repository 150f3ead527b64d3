//! Summary command implementation.
//!
//! The summary command:
//! 1. Reads the log and reconnects bridges to their guards
//! 2. Builds the report
//! 3. Writes the JSON report and/or prints the text summary

use super::models::SummaryArgs;
use super::utils::load_storage;
use crate::output::{render_summary, to_report, write_report, Report};
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the summary command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The report that was printed and/or written
///
/// # Errors
/// * Unreadable log or code map
/// * Malformed trace or inconsistent counts
/// * File write errors
pub fn execute_summary(args: SummaryArgs) -> Result<Report> {
    let start_time = Instant::now();

    info!("Step 1/3: Loading log {}...", args.log.display());
    let storage = load_storage(&args.log, args.code_map.as_deref())?;

    info!("Step 2/3: Building report...");
    let report = to_report(&storage, &args.log.display().to_string());
    debug!("Report covers {} root loops", report.loops.len());

    info!("Step 3/3: Writing output...");
    if let Some(path) = &args.output_json {
        write_report(&report, path).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", path.display());
    }

    if args.print_summary {
        println!("{}", render_summary(&report));
    }

    info!("Summary completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(report)
}
