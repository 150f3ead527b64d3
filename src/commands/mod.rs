//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod show;
pub mod summary;
pub mod utils;

// Re-export main command functions
pub use models::{ShowArgs, SummaryArgs};
pub use show::{bridge_selections, execute_show};
pub use summary::execute_summary;
pub use utils::{display_version, load_storage, validate_report_file};
