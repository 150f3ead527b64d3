//! Rebuild the call tree of a trace from its flat operation list.
//!
//! Markers declare their own inlining depth, in depth-first order. The
//! slicer cuts the operations into chunks at every marker and keeps one
//! open child list per nesting level:
//! - a deeper marker opens a new level
//! - a shallower marker closes the top level into a [`Function`]
//!
//! Example: "f;g;g;f" at depths 0,1,1,0 becomes `[f, Function[g, g], f]`.

use super::chunk::BytecodeChunk;
use super::code_map::CodeMap;
use super::function::{Child, Function};
use crate::parser::Operation;
use log::debug;

/// Slice operations into chunks and inlined calls
///
/// **Public** - main entry point for tree reconstruction
///
/// # Arguments
/// * `operations` - Operations of one fragment, in logged order
/// * `code_map` - Line tables used to place chunks on source lines
///
/// # Returns
/// The root function; empty input gives an empty function of unknown origin
pub fn slice_debug_merge_points<'a>(operations: &'a [Operation], code_map: &CodeMap) -> Function<'a> {
    let mut stack: Vec<Vec<Child<'a>>> = Vec::new();
    let mut start = 0;

    for (i, op) in operations.iter().enumerate() {
        if op.is_merge_point() && i > start {
            append_chunk(&mut stack, BytecodeChunk::new(&operations[start..i], code_map));
            start = i;
        }
    }
    if start < operations.len() {
        append_chunk(&mut stack, BytecodeChunk::new(&operations[start..], code_map));
    }

    debug!(
        "Sliced {} operations, {} levels still open",
        operations.len(),
        stack.len()
    );

    // Close whatever is still open, innermost first
    loop {
        let Some(children) = stack.pop() else {
            return Function::new(Vec::new(), path_of(&stack));
        };
        let func = Function::new(children, path_of(&stack));
        match stack.last_mut() {
            Some(parent) => parent.push(Child::Function(func)),
            None => return func,
        }
    }
}

/// Place a chunk on the right nesting level
///
/// **Private** - internal helper for slice_debug_merge_points
fn append_chunk<'a>(stack: &mut Vec<Vec<Child<'a>>>, chunk: BytecodeChunk<'a>) {
    if stack.is_empty() {
        stack.push(Vec::new());
    } else if let Some(level) = chunk.depth_signal() {
        let level = level as usize;
        let depth = stack.len();
        if level + 1 != depth {
            if level < depth {
                // Returned from an inlined call
                if let Some(children) = stack.pop() {
                    let func = Function::new(children, path_of(stack));
                    if let Some(parent) = stack.last_mut() {
                        parent.push(Child::Function(func));
                    }
                }
            } else {
                stack.push(Vec::new());
            }
        }
    }

    if let Some(top) = stack.last_mut() {
        top.push(Child::Bytecode(chunk));
    }
}

/// Breadcrumb of sibling positions: lengths of the open levels
fn path_of(stack: &[Vec<Child<'_>>]) -> String {
    stack
        .iter()
        .map(|level| level.len().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
