//! Trace fragments: one logged loop or bridge.

use crate::parser::Operation;
use crate::trace::{slice_debug_merge_points, CodeMap, Function};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static BRIDGE_COMMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"bridge out of Guard\s*(\d+)").unwrap());

static LOOP_COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s*Loop\s+(\d+)").unwrap());

/// Index of a fragment inside a [`LoopStorage`](super::LoopStorage)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(pub usize);

impl FragmentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a fragment is, according to its header comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// `# Loop N : ...`
    Loop(u32),
    /// `# Loop N : entry bridge ...`
    EntryBridge(u32),
    /// `# bridge out of Guard N ...`
    Bridge(u32),
    /// No recognizable header
    Unknown,
}

/// One compilation unit of the log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceFragment {
    /// First comment line, identifies loops and bridges
    pub comment: Option<String>,

    /// Input arguments (`[i0, p1]` header)
    pub input_args: Vec<String>,

    /// Operations in logged order
    pub operations: Vec<Operation>,

    /// Times this fragment was entered, from the counts section
    pub count: Option<u64>,

    /// Guard number for bridges, loop number for loops
    pub no: Option<u32>,
}

impl TraceFragment {
    /// Create a fragment from already parsed operations
    pub fn new(comment: Option<String>, operations: Vec<Operation>) -> Self {
        Self {
            comment,
            operations,
            ..Default::default()
        }
    }

    /// Classify the fragment from its header comment
    pub fn kind(&self) -> FragmentKind {
        let Some(comment) = self.comment.as_deref().map(str::trim) else {
            return FragmentKind::Unknown;
        };

        if let Some(no) = BRIDGE_COMMENT_REGEX
            .captures(comment)
            .and_then(|caps| caps[1].parse().ok())
        {
            return FragmentKind::Bridge(no);
        }

        match LOOP_COMMENT_REGEX
            .captures(comment)
            .and_then(|caps| caps[1].parse().ok())
        {
            Some(no) if comment.contains("entry bridge") => FragmentKind::EntryBridge(no),
            Some(no) => FragmentKind::Loop(no),
            None => FragmentKind::Unknown,
        }
    }

    /// Rebuild the call tree of this fragment
    ///
    /// The tree borrows the operations, so guard linkage set by the bridge
    /// resolver is visible through it.
    pub fn function<'a>(&'a self, code_map: &CodeMap) -> Function<'a> {
        slice_debug_merge_points(&self.operations, code_map)
    }

    /// Short human readable title
    pub fn label(&self) -> String {
        match self.kind() {
            FragmentKind::Loop(no) => format!("Loop {}", no),
            FragmentKind::EntryBridge(no) => format!("Entry bridge {}", no),
            FragmentKind::Bridge(no) => format!("Bridge out of guard {}", no),
            FragmentKind::Unknown => "Unnamed fragment".to_string(),
        }
    }

    /// Guard operations with their position in the fragment
    pub fn guards(&self) -> impl Iterator<Item = (usize, &Operation)> {
        self.operations.iter().enumerate().filter(|(_, op)| op.is_guard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_comment(comment: &str) -> TraceFragment {
        TraceFragment::new(Some(comment.to_string()), Vec::new())
    }

    #[test]
    fn test_kind_from_comment() {
        assert_eq!(
            with_comment("# bridge out of Guard 18 with 13 ops").kind(),
            FragmentKind::Bridge(18)
        );
        assert_eq!(with_comment("# Loop 3 : entry bridge").kind(), FragmentKind::EntryBridge(3));
        assert_eq!(
            with_comment("# Loop 0 : loop with 30 ops").kind(),
            FragmentKind::Loop(0)
        );
        assert_eq!(with_comment("# something else").kind(), FragmentKind::Unknown);
        assert_eq!(TraceFragment::default().kind(), FragmentKind::Unknown);
    }

    #[test]
    fn test_label() {
        assert_eq!(with_comment("# Loop 2 : loop with 4 ops").label(), "Loop 2");
        assert_eq!(with_comment("# bridge out of Guard 7").label(), "Bridge out of guard 7");
    }
}
