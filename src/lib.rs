//! JitLog Viewer
//!
//! Reconstructs a navigable view of a tracing JIT's optimized-trace log:
//! the nesting of inlined calls, the source lines each trace touches, and
//! the bridges taken when guards fail.
//!
//! The pipeline:
//! 1. [`parser`] splits the log and parses traces into operations
//! 2. [`trace`] slices operations into bytecode chunks and functions
//! 3. [`storage`] links bridges to guards and splices chosen paths
//! 4. [`output`] renders reports and call trees
//!
//! ## Getting Started
//!
//! ```bash
//! jitlog-viewer summary pypy.log --print
//! jitlog-viewer show pypy.log --loop 0 --follow 13
//! ```

pub mod commands;
pub mod output;
pub mod parser;
pub mod storage;
pub mod trace;
pub mod utils;
