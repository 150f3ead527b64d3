//! Bytecode chunks: the operations produced by one bytecode instruction.

use super::code_map::{CodeMap, LineInfo};
use crate::parser::{CodeLocation, MergePoint, Operation};

/// A contiguous run of operations attributed to one instruction
///
/// The run starts with its `debug_merge_point` marker, except for operations
/// logged before the first marker of a fragment.
#[derive(Debug, Clone)]
pub struct BytecodeChunk<'a> {
    operations: &'a [Operation],
    merge_point: Option<MergePoint>,
    line: Option<LineInfo>,
}

impl<'a> BytecodeChunk<'a> {
    /// Build a chunk from a non-empty operation run
    ///
    /// **Public** - used by the slicer
    pub fn new(operations: &'a [Operation], code_map: &CodeMap) -> Self {
        let merge_point = operations
            .first()
            .filter(|op| op.is_merge_point())
            .map(MergePoint::from_operation);
        let line = merge_point
            .as_ref()
            .and_then(|mp| mp.location.as_ref())
            .map(|loc| code_map.resolve(loc));

        Self {
            operations,
            merge_point,
            line,
        }
    }

    pub fn operations(&self) -> &'a [Operation] {
        self.operations
    }

    pub fn merge_point(&self) -> Option<&MergePoint> {
        self.merge_point.as_ref()
    }

    /// Source file, None when the chunk has no known location
    pub fn filename(&self) -> Option<&str> {
        self.location().map(|loc| loc.filename.as_str())
    }

    /// Name of the code object holding the instruction
    pub fn name(&self) -> Option<&str> {
        self.location().map(|loc| loc.name.as_str())
    }

    /// First line of the code object holding the instruction
    pub fn start_line(&self) -> u32 {
        self.location().map_or(0, |loc| loc.start_line)
    }

    /// Source line of the instruction itself
    pub fn line(&self) -> u32 {
        self.line.map_or(0, |info| info.line)
    }

    pub fn line_starts_here(&self) -> bool {
        self.line.is_some_and(|info| info.starts_here)
    }

    pub fn bytecode_offset(&self) -> Option<u32> {
        self.location().map(|loc| loc.bytecode_offset)
    }

    pub fn bytecode_name(&self) -> Option<&str> {
        self.merge_point.as_ref().map(|mp| mp.bytecode_name.as_str())
    }

    pub fn inline_level(&self) -> Option<u32> {
        self.merge_point.as_ref().and_then(|mp| mp.inline_level)
    }

    /// Inline level that may move the slicer between nesting levels
    pub fn depth_signal(&self) -> Option<u32> {
        self.merge_point.as_ref().and_then(MergePoint::depth_signal)
    }

    /// True when the marker produced real work, not just itself
    pub fn is_nonempty(&self) -> bool {
        self.operations.len() > 1
    }

    /// Human readable origin of the chunk
    pub fn repr(&self) -> String {
        match self.location() {
            Some(loc) => format!("{}, file '{}', line {}", loc.name, loc.filename, loc.start_line),
            None => "Unknown".to_string(),
        }
    }

    fn location(&self) -> Option<&CodeLocation> {
        self.merge_point.as_ref().and_then(|mp| mp.location.as_ref())
    }
}
