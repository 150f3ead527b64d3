use crate::output::read_report;
use crate::storage::LoopStorage;
use crate::trace::CodeMap;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Read a log file and reconnect its fragments
///
/// **Public** - shared by the summary and show commands
pub fn load_storage(log: &Path, code_map: Option<&Path>) -> Result<LoopStorage> {
    let code_map = match code_map {
        Some(path) => CodeMap::from_file(path)
            .with_context(|| format!("Failed to read code map {}", path.display()))?,
        None => CodeMap::new(),
    };

    let text = std::fs::read_to_string(log)
        .with_context(|| format!("Failed to read log {}", log.display()))?;

    let storage = LoopStorage::from_log(&text, code_map)
        .with_context(|| format!("Failed to import log {}", log.display()))?;

    info!(
        "Loaded {} fragments ({} roots) from {}",
        storage.fragments().len(),
        storage.roots().len(),
        log.display()
    );

    Ok(storage)
}

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Source: {}", report.source);
    println!("  Fragments: {}", report.fragment_count);
    println!("  Root Loops: {}", report.loops.len());

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("JitLog Viewer v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call trees, source lines and bridge graphs for tracing JIT logs.");
}
