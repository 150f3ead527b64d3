//! Storage of all fragments of a log.
//!
//! This module handles:
//! - Fragment identity and classification (loop, entry bridge, bridge)
//! - Execution counts from the backend counters
//! - Linking guards to the bridges they fail into
//! - Splicing bridges into a single execution path

pub mod counts;
pub mod fragment;
pub mod loop_storage;

// Re-export main types and functions
pub use counts::parse_log_counts;
pub use fragment::{FragmentId, FragmentKind, TraceFragment};
pub use loop_storage::LoopStorage;
