//! Reconstruction of call trees from flat traces.
//!
//! This module turns the operations of one fragment into:
//! - Bytecode chunks (one per debug merge point)
//! - Functions (the fragment itself and every inlined call)
//! - Line ranges for source display

pub mod chunk;
pub mod code_map;
pub mod function;
pub mod slicer;

// Re-export main types and functions
pub use chunk::BytecodeChunk;
pub use code_map::{CodeMap, LineInfo};
pub use function::{Child, Function};
pub use slicer::slice_debug_merge_points;
