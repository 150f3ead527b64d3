//! Bytecode line tables.
//!
//! A marker only tells us where its code object starts. The line an
//! instruction belongs to comes from the code object's line-start table:
//! the `(offset, line)` pairs at which a new source line begins.
//!
//! Tables are keyed by file and code start line, and can be loaded from
//! JSON shaped as `{"file.py": {"12": [[0, 12], [6, 13]]}}`.

use crate::parser::CodeLocation;
use crate::utils::error::ParseError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Resolved source line of one instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    /// Source line holding the instruction
    pub line: u32,

    /// True when the instruction is the first one of its line
    pub starts_here: bool,
}

/// Line-start tables for every known code object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeMap {
    files: HashMap<String, HashMap<u32, Vec<(u32, u32)>>>,
}

impl CodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the line-start table of one code object
    ///
    /// **Public** - used by loaders and tests
    ///
    /// # Arguments
    /// * `filename` - Source file of the code object
    /// * `start_line` - First line of the code object, as named by markers
    /// * `line_starts` - `(offset, line)` pairs, any order
    pub fn insert(
        &mut self,
        filename: impl Into<String>,
        start_line: u32,
        mut line_starts: Vec<(u32, u32)>,
    ) {
        line_starts.sort_unstable();
        self.files
            .entry(filename.into())
            .or_default()
            .insert(start_line, line_starts);
    }

    /// Load tables from a JSON file
    ///
    /// **Public** - used by commands when `--code-map` is given
    ///
    /// # Errors
    /// * `ParseError::IoError` - File cannot be read
    /// * `ParseError::JsonError` - File is not a valid code map
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        debug!("Reading code map from: {}", path.display());

        let text = std::fs::read_to_string(path)?;
        let mut map: CodeMap = serde_json::from_str(&text)?;
        for tables in map.files.values_mut() {
            for starts in tables.values_mut() {
                starts.sort_unstable();
            }
        }

        info!("Loaded line tables for {} files", map.files.len());
        Ok(map)
    }

    /// Find the source line of an instruction
    ///
    /// Without a table the instruction is placed on the code object's first
    /// line and treated as starting it.
    pub fn resolve(&self, location: &CodeLocation) -> LineInfo {
        let Some(starts) = self
            .files
            .get(&location.filename)
            .and_then(|tables| tables.get(&location.start_line))
        else {
            return LineInfo {
                line: location.start_line,
                starts_here: true,
            };
        };

        match starts
            .iter()
            .rev()
            .find(|(offset, _)| *offset <= location.bytecode_offset)
        {
            Some(&(offset, line)) => LineInfo {
                line,
                starts_here: offset == location.bytecode_offset,
            },
            None => LineInfo {
                line: location.start_line,
                starts_here: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(offset: u32) -> CodeLocation {
        CodeLocation {
            name: "f".to_string(),
            filename: "x.py".to_string(),
            start_line: 5,
            bytecode_offset: offset,
        }
    }

    #[test]
    fn test_resolve_without_table() {
        let map = CodeMap::new();
        let info = map.resolve(&location(12));
        assert_eq!(info, LineInfo { line: 5, starts_here: true });
    }

    #[test]
    fn test_resolve_with_table() {
        let mut map = CodeMap::new();
        map.insert("x.py", 5, vec![(12, 8), (0, 6), (6, 7)]);

        assert_eq!(map.resolve(&location(6)), LineInfo { line: 7, starts_here: true });
        assert_eq!(map.resolve(&location(9)), LineInfo { line: 7, starts_here: false });
        assert_eq!(map.resolve(&location(40)), LineInfo { line: 8, starts_here: false });
    }

    #[test]
    fn test_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"x.py": {"5": [[6, 7], [0, 6]]}}"#).unwrap();

        let map = CodeMap::from_file(file.path()).unwrap();
        assert_eq!(map.resolve(&location(3)), LineInfo { line: 6, starts_here: false });
    }
}
