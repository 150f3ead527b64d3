//! Configuration and constants for log parsing and the CLI.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Name of the marker operation that opens a bytecode chunk
pub const DEBUG_MERGE_POINT: &str = "debug_merge_point";

/// Operation name prefix shared by all guards
pub const GUARD_PREFIX: &str = "guard_";

/// Line closing the dump of a loop; carries no operation
pub const END_OF_LOOP_MARKER: &str = "--end of the loop--";

/// Prefix of the keys used to select which bridges to follow ("loop-13")
pub const BRIDGE_SELECTION_PREFIX: &str = "loop-";

// Log sections holding optimized traces (loops and bridges)
pub const TRACE_SECTION_NAMES: &[&str] = &["jit-log-opt-loop", "jit-log-opt-bridge"];

// Log section holding the per-fragment execution counters
pub const COUNTS_SECTION_NAME: &str = "jit-backend-counts";
