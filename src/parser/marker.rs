//! Debug merge point marker parsing.
//!
//! A marker names the bytecode instruction that produced the operations
//! following it. Two shapes are recognized:
//! - `<code object NAME, file 'PATH', line N> #OFFSET OPNAME`
//! - `NAME at ...` for synthetic markers (e.g. regex engine loops)
//!
//! Anything else is kept verbatim as an opaque bytecode name.

use super::operation::Operation;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static CODE_OBJECT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<code object ([<>\w]+)[\.,] file '(.+?)'[\.,] line (\d+)> #(\d+) (\w+)").unwrap()
});

/// Source location carried by a marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLocation {
    /// Name of the code object (function)
    pub name: String,

    /// Source file of the code object
    pub filename: String,

    /// First line of the code object
    pub start_line: u32,

    /// Offset of the instruction within the code object
    pub bytecode_offset: u32,
}

/// Parsed debug merge point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePoint {
    /// Bytecode instruction name (`LOAD_FAST`) or free-form marker name
    pub bytecode_name: String,

    /// None when the marker carries no source location
    pub location: Option<CodeLocation>,

    /// Inlining depth declared by the marker
    pub inline_level: Option<u32>,
}

impl MergePoint {
    /// Parse marker text
    ///
    /// **Public** - called for the first operation of every chunk
    ///
    /// # Arguments
    /// * `text` - Marker text, without surrounding quotes
    /// * `inline_level` - Depth declared next to the text, if any
    ///
    /// # Returns
    /// A merge point; malformed text never fails, it becomes an opaque name
    pub fn parse(text: &str, inline_level: Option<u32>) -> Self {
        if let Some(caps) = CODE_OBJECT_REGEX.captures(text) {
            // Digits only, so overflow is the sole failure
            if let (Ok(start_line), Ok(bytecode_offset)) = (caps[3].parse(), caps[4].parse()) {
                return Self {
                    bytecode_name: caps[5].to_string(),
                    location: Some(CodeLocation {
                        name: caps[1].to_string(),
                        filename: caps[2].to_string(),
                        start_line,
                        bytecode_offset,
                    }),
                    inline_level,
                };
            }
        }

        let bytecode_name = match text.split_once(" at ") {
            Some((name, _)) => name.to_string(),
            None => {
                debug!("Marker without source location: {:?}", text);
                text.to_string()
            }
        };

        Self {
            bytecode_name,
            location: None,
            inline_level,
        }
    }

    /// Read the marker carried by a `debug_merge_point` operation
    ///
    /// The text is the first non-numeric argument; the declared inline
    /// level is the last numeric one.
    pub fn from_operation(op: &Operation) -> Self {
        let text = op
            .args
            .iter()
            .find(|arg| arg.parse::<u32>().is_err())
            .map_or("", String::as_str);
        let inline_level = op.args.iter().rev().find_map(|arg| arg.parse().ok());
        Self::parse(text, inline_level)
    }

    /// Inline level usable for nesting decisions
    ///
    /// Markers without a location give no signal, whatever they declare.
    pub fn depth_signal(&self) -> Option<u32> {
        self.location.as_ref().and(self.inline_level)
    }
}
