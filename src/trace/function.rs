//! Functions: a traced loop body or an inlined call, and their children.

use super::chunk::BytecodeChunk;
use crate::parser::Operation;
use once_cell::unsync::OnceCell;
use std::collections::BTreeSet;

/// Child of a function: an instruction chunk or a nested inlined call
#[derive(Debug, Clone)]
pub enum Child<'a> {
    Bytecode(BytecodeChunk<'a>),
    Function(Function<'a>),
}

impl<'a> Child<'a> {
    pub fn filename(&self) -> Option<&str> {
        match self {
            Child::Bytecode(chunk) => chunk.filename(),
            Child::Function(func) => func.filename(),
        }
    }

    pub fn repr(&self) -> String {
        match self {
            Child::Bytecode(chunk) => chunk.repr(),
            Child::Function(func) => func.repr(),
        }
    }

    pub fn as_bytecode(&self) -> Option<&BytecodeChunk<'a>> {
        match self {
            Child::Bytecode(chunk) => Some(chunk),
            Child::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function<'a>> {
        match self {
            Child::Function(func) => Some(func),
            Child::Bytecode(_) => None,
        }
    }
}

/// Where a function's code lives, taken from its first located child
#[derive(Debug, Clone, PartialEq, Eq)]
struct Origin {
    filename: String,
    name: String,
    start_line: u32,
    inline_level: Option<u32>,
}

/// Source lines touched by a function
#[derive(Debug, Clone, PartialEq, Eq)]
struct LineSpan {
    range: (u32, u32),
    set: BTreeSet<u32>,
}

/// A node of the reconstructed call tree
#[derive(Debug, Clone)]
pub struct Function<'a> {
    path: String,
    children: Vec<Child<'a>>,
    origin: Option<Origin>,
    lines: OnceCell<LineSpan>,
}

impl<'a> Function<'a> {
    /// Wrap children into a function
    ///
    /// **Public** - used by the slicer
    ///
    /// # Arguments
    /// * `children` - Chunks and nested calls, in execution order
    /// * `path` - Comma separated sibling positions leading to this node
    pub fn new(children: Vec<Child<'a>>, path: impl Into<String>) -> Self {
        let origin = children.iter().find_map(|child| match child {
            Child::Bytecode(chunk) => chunk.filename().map(|filename| Origin {
                filename: filename.to_string(),
                name: chunk.name().unwrap_or_default().to_string(),
                start_line: chunk.start_line(),
                inline_level: chunk.inline_level(),
            }),
            Child::Function(func) => func.origin.clone(),
        });

        Self {
            path: path.into(),
            children,
            origin,
            lines: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn children(&self) -> &[Child<'a>] {
        &self.children
    }

    /// None for code of unknown origin (e.g. synthetic entry code)
    pub fn filename(&self) -> Option<&str> {
        self.origin.as_ref().map(|o| o.filename.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.origin.as_ref().map(|o| o.name.as_str())
    }

    pub fn start_line(&self) -> u32 {
        self.origin.as_ref().map_or(0, |o| o.start_line)
    }

    pub fn inline_level(&self) -> Option<u32> {
        self.origin.as_ref().and_then(|o| o.inline_level)
    }

    /// Smallest and largest source line touched, (0, 0) when none is known
    pub fn line_range(&self) -> (u32, u32) {
        self.line_span().range
    }

    /// Lines holding real work or the start of an instruction
    pub fn line_set(&self) -> &BTreeSet<u32> {
        &self.line_span().set
    }

    /// Every chunk owned by this function, nested calls included
    pub fn bytecodes(&self) -> Vec<&BytecodeChunk<'a>> {
        let mut out = Vec::new();
        self.collect_bytecodes(&mut out);
        out
    }

    /// All operations in execution order
    pub fn operations(&self) -> Vec<&'a Operation> {
        self.bytecodes()
            .into_iter()
            .flat_map(|chunk| chunk.operations().iter())
            .collect()
    }

    pub fn repr(&self) -> String {
        match &self.origin {
            Some(o) => format!("{}, file '{}', line {}", o.name, o.filename, o.start_line),
            None => "Unknown".to_string(),
        }
    }

    pub fn inlined_repr(&self) -> String {
        format!(
            "inlined call to {} in {}",
            self.name().unwrap_or("?"),
            self.filename().unwrap_or("?")
        )
    }

    fn collect_bytecodes<'s>(&'s self, out: &mut Vec<&'s BytecodeChunk<'a>>) {
        for child in &self.children {
            match child {
                Child::Bytecode(chunk) => out.push(chunk),
                Child::Function(func) => func.collect_bytecodes(out),
            }
        }
    }

    fn line_span(&self) -> &LineSpan {
        self.lines.get_or_init(|| {
            let mut set = BTreeSet::new();
            let mut range: Option<(u32, u32)> = None;

            for chunk in self.bytecodes() {
                if chunk.filename().is_none() {
                    continue;
                }
                let line = chunk.line();
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(line), hi.max(line)),
                    None => (line, line),
                });
                if chunk.line_starts_here() || chunk.is_nonempty() {
                    set.insert(line);
                }
            }

            LineSpan {
                range: range.unwrap_or((0, 0)),
                set,
            }
        })
    }
}
