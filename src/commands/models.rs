use std::path::PathBuf;

/// Arguments for the summary command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct SummaryArgs {
    /// JIT log to read
    pub log: PathBuf,

    /// Line tables for source placement (optional)
    pub code_map: Option<PathBuf>,

    /// Output path for the JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Print the text summary to stdout
    pub print_summary: bool,
}

/// Arguments for the show command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct ShowArgs {
    /// JIT log to read
    pub log: PathBuf,

    /// Line tables for source placement (optional)
    pub code_map: Option<PathBuf>,

    /// Position of the root fragment among the roots
    pub root: usize,

    /// Guard numbers whose bridges should be followed
    pub follow: Vec<u32>,
}
