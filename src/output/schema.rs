//! Output JSON schema definitions for log reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::storage::{FragmentId, LoopStorage};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Log file the report was built from
    pub source: String,

    /// Number of fragments found in the log, bridges included
    pub fragment_count: usize,

    /// Root fragments, with their bridges nested under guards
    pub loops: Vec<LoopSummary>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// One fragment and everything reachable from its guards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopSummary {
    /// Position of the fragment in the log
    pub id: usize,

    pub label: String,

    /// Execution count, if the log had counters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    /// Where the traced code lives ("f, file 'x.py', line 3" or "Unknown")
    pub origin: String,

    /// First and last source line touched
    pub line_range: (u32, u32),

    pub operations: usize,

    /// Guards that have a bridge attached
    pub guards: Vec<GuardSummary>,
}

/// A guard and the bridge it fails into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardSummary {
    pub guard_no: u32,

    /// Share of executions that took the bridge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u64>,

    pub bridge: Box<LoopSummary>,
}

/// Build a report from a reconnected storage
///
/// **Public** - used by commands to create final output
pub fn to_report(storage: &LoopStorage, source: &str) -> Report {
    use chrono::Utc;

    let mut seen = HashSet::new();
    let loops = storage
        .roots()
        .iter()
        .filter_map(|id| summarize(storage, *id, &mut seen))
        .collect();

    Report {
        version: SCHEMA_VERSION.to_string(),
        source: source.to_string(),
        fragment_count: storage.fragments().len(),
        loops,
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// Summarize one fragment, descending into its bridges
///
/// **Private** - internal helper for to_report
fn summarize(storage: &LoopStorage, id: FragmentId, seen: &mut HashSet<FragmentId>) -> Option<LoopSummary> {
    if !seen.insert(id) {
        return None;
    }
    let fragment = storage.fragment(id)?;
    let function = fragment.function(storage.code_map());

    let guards = fragment
        .guards()
        .filter_map(|(_, op)| {
            let bridge = summarize(storage, op.bridge?, seen)?;
            Some(GuardSummary {
                guard_no: op.guard_no()?,
                percentage: op.percentage,
                bridge: Box::new(bridge),
            })
        })
        .collect();

    Some(LoopSummary {
        id: id.index(),
        label: fragment.label(),
        count: fragment.count,
        origin: function.repr(),
        line_range: function.line_range(),
        operations: fragment.operations.len(),
        guards,
    })
}
