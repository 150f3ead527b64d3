//! JSON report files.
//!
//! Reports are pretty-printed so they diff well between runs.

use super::schema::Report;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use log::{debug, info, warn};
use std::path::Path;

/// Write a report to a JSON file, creating missing parent directories
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent cannot be created
/// * `OutputError::SerializationFailed` - Report could not be encoded
/// * `OutputError::WriteFailed` - I/O error during write
pub fn write_report(report: &Report, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    check_target(output_path)?;

    let encoded = serde_json::to_string_pretty(report)?;
    std::fs::write(output_path, &encoded)?;

    info!(
        "Wrote report for {} ({} root loops, {} bytes) to {}",
        report.source,
        report.loops.len(),
        encoded.len(),
        output_path.display()
    );
    Ok(())
}

/// Reject unusable targets and create the parent directory
///
/// **Private** - internal helper for write_report
fn check_target(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!("{} is a directory", path.display())));
    }

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            debug!("Creating {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create {}: {}", parent.display(), e))
            })
        }
        _ => Ok(()),
    }
}

/// Read a report back from a JSON file
///
/// **Public** - used by the validate command and tests
///
/// A report written by another schema version is still returned; the
/// mismatch is only logged.
///
/// # Errors
/// * `OutputError::ReadFailed` - File cannot be read
/// * `OutputError::SerializationFailed` - Content is not a report
pub fn read_report(input_path: impl AsRef<Path>) -> Result<Report, OutputError> {
    let input_path = input_path.as_ref();

    let text = std::fs::read_to_string(input_path).map_err(|source| OutputError::ReadFailed {
        path: input_path.display().to_string(),
        source,
    })?;
    let report: Report = serde_json::from_str(&text)?;

    if report.version != SCHEMA_VERSION {
        warn!(
            "{} uses schema {}, expected {}",
            input_path.display(),
            report.version,
            SCHEMA_VERSION
        );
    }
    debug!("Loaded report for {} with {} root loops", report.source, report.loops.len());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::schema::LoopSummary;

    fn sample_report() -> Report {
        Report {
            version: SCHEMA_VERSION.to_string(),
            source: "pypy.log".to_string(),
            fragment_count: 1,
            loops: vec![LoopSummary {
                id: 0,
                label: "Loop 0".to_string(),
                count: Some(10),
                origin: "f, file 'x.py', line 2".to_string(),
                line_range: (2, 4),
                operations: 12,
                guards: Vec::new(),
            }],
            generated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_report_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dirs/report.json");

        write_report(&sample_report(), &path).unwrap();

        assert_eq!(read_report(&path).unwrap(), sample_report());
    }

    #[test]
    fn test_write_rejects_bad_targets() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            write_report(&sample_report(), ""),
            Err(OutputError::InvalidPath(_))
        ));
        assert!(matches!(
            write_report(&sample_report(), dir.path()),
            Err(OutputError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_read_reports_missing_file_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(read_report(&missing), Err(OutputError::ReadFailed { .. })));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{\"version\": 1}").unwrap();
        assert!(matches!(read_report(&garbage), Err(OutputError::SerializationFailed(_))));
    }
}
