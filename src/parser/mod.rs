//! Log parsing.
//!
//! This module handles:
//! - Splitting a JIT log into trace and counter sections
//! - Parsing trace text into operations
//! - Reading debug merge point markers

pub mod logfile;
pub mod marker;
pub mod operation;
pub mod oparser;

// Re-export main types
pub use logfile::{parse_log, LogSections};
pub use marker::{CodeLocation, MergePoint};
pub use operation::Operation;
pub use oparser::parse_fragment;
