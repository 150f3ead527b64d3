//! Output writers for reports and call trees.
//!
//! This module handles:
//! - JSON reports (write and read back)
//! - Text summaries of the bridge graph
//! - Text dumps of a reconstructed call tree

pub mod json;
pub mod schema;
pub mod text;

// Re-export main functions
pub use json::{read_report, write_report};
pub use schema::{to_report, GuardSummary, LoopSummary, Report};
pub use text::{render_function, render_operation, render_summary};
