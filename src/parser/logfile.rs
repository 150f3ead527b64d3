//! Section extraction for whole JIT log files.
//!
//! A log interleaves many categories, each wrapped as:
//!
//! ```text
//! [1f5e7f5d4a8b] {jit-log-opt-loop
//! # Loop 0 : loop with 30 ops
//! ...
//! [1f5e7f5e3b0c] jit-log-opt-loop}
//! ```
//!
//! Only optimized traces and backend counters are kept.

use crate::utils::config::{COUNTS_SECTION_NAME, TRACE_SECTION_NAMES};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_START_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\[[0-9a-fA-F]+\]\s*)?\{([\w-]+)\s*$").unwrap());

static SECTION_END_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\[[0-9a-fA-F]+\]\s*)?([\w-]+)\}\s*$").unwrap());

/// Relevant sections of a log file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSections {
    /// Loop and bridge bodies, in logged order
    pub traces: Vec<String>,

    /// Lines of the last counts section
    pub counts: Vec<String>,
}

/// Extract trace bodies and counter lines from a log
///
/// **Public** - first step of log import
///
/// Sections of other categories are skipped, including nested ones.
/// An unterminated section runs to the end of the input.
pub fn parse_log(text: &str) -> LogSections {
    let mut sections = LogSections::default();
    let mut open: Vec<(String, Vec<&str>)> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = SECTION_START_REGEX.captures(line) {
            open.push((caps[1].to_string(), Vec::new()));
            continue;
        }

        if let Some(caps) = SECTION_END_REGEX.captures(line) {
            if open.last().is_some_and(|(name, _)| name == &caps[1]) {
                if let Some((name, body)) = open.pop() {
                    store_section(&mut sections, &name, &body);
                }
                continue;
            }
        }

        if let Some((_, body)) = open.last_mut() {
            body.push(line);
        }
    }

    while let Some((name, body)) = open.pop() {
        warn!("Section {} is not terminated", name);
        store_section(&mut sections, &name, &body);
    }

    debug!(
        "Log holds {} trace sections and {} count lines",
        sections.traces.len(),
        sections.counts.len()
    );

    sections
}

/// Keep a closed section if its category is interesting
///
/// **Private** - internal helper for parse_log
fn store_section(sections: &mut LogSections, name: &str, body: &[&str]) {
    if TRACE_SECTION_NAMES.contains(&name) {
        sections.traces.push(body.join("\n"));
    } else if name == COUNTS_SECTION_NAME {
        sections.counts = body.iter().map(|line| line.to_string()).collect();
    }
}
