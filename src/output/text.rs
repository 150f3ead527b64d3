//! Plain-text rendering of reports and call trees.

use super::schema::{LoopSummary, Report};
use crate::parser::Operation;
use crate::trace::{Child, Function};
use std::fmt::Write;

const INDENT: &str = "  ";

/// Render the bridge graph of a report
///
/// **Public** - used by the summary command
pub fn render_summary(report: &Report) -> String {
    let mut out = String::new();
    for summary in &report.loops {
        render_loop(summary, 0, &mut out);
    }
    out
}

fn render_loop(summary: &LoopSummary, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    let count = summary
        .count
        .map_or_else(|| "not counted".to_string(), |c| format!("run {} times", c));

    let _ = writeln!(out, "{}{} [{}] ({})", pad, summary.label, summary.id, count);
    let _ = writeln!(
        out,
        "{}{}{} | lines {}-{} | {} ops",
        pad, INDENT, summary.origin, summary.line_range.0, summary.line_range.1, summary.operations
    );

    for guard in &summary.guards {
        let percentage = guard
            .percentage
            .map_or_else(|| "?".to_string(), |p| format!("{}%", p));
        let _ = writeln!(out, "{}{}guard {} -> {}", pad, INDENT, guard.guard_no, percentage);
        render_loop(&guard.bridge, depth + 2, out);
    }
}

/// Render a call tree with its operations
///
/// **Public** - used by the show command
///
/// Inlined calls are indented under a header line; chunks show their
/// bytecode name and source line, then one line per operation.
pub fn render_function(function: &Function<'_>) -> String {
    let mut out = String::new();
    let (first, last) = function.line_range();
    let _ = writeln!(out, "{} (lines {}-{})", function.repr(), first, last);
    render_children(function, 1, &mut out);
    out
}

fn render_children(function: &Function<'_>, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);

    for child in function.children() {
        match child {
            Child::Function(inner) => {
                let _ = writeln!(out, "{}> {} [{}]", pad, inner.inlined_repr(), inner.path());
                render_children(inner, depth + 1, out);
            }
            Child::Bytecode(chunk) => {
                match (chunk.bytecode_name(), chunk.filename()) {
                    (Some(name), Some(_)) => {
                        let _ = writeln!(out, "{}{} (line {})", pad, name, chunk.line());
                    }
                    (Some(name), None) => {
                        let _ = writeln!(out, "{}{}", pad, name);
                    }
                    (None, _) => {
                        let _ = writeln!(out, "{}<entry>", pad);
                    }
                }
                for op in chunk.operations().iter().filter(|op| !op.is_merge_point()) {
                    let _ = writeln!(out, "{}{}{}", pad, INDENT, render_operation(op));
                }
            }
        }
    }
}

/// One operation in readable form, with guard linkage appended
pub fn render_operation(op: &Operation) -> String {
    let text = op.friendly_repr();
    match (op.bridge, op.percentage) {
        (Some(bridge), Some(p)) => format!("{}  -> bridge {} ({}%)", text, bridge, p),
        (Some(bridge), None) => format!("{}  -> bridge {}", text, bridge),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fragment;
    use crate::trace::{slice_debug_merge_points, CodeMap};

    #[test]
    fn test_render_function_nests_inlined_calls() {
        let fragment = parse_fragment(
            "
            debug_merge_point(0, '<code object f, file 'm.py', line 1> #0 CALL_FUNCTION')
            debug_merge_point(1, '<code object g, file 'm.py', line 5> #0 LOAD_FAST')
            i1 = int_add(i0, 1)
            debug_merge_point(0, '<code object f, file 'm.py', line 1> #3 POP_TOP')
            ",
        )
        .unwrap();
        let function = slice_debug_merge_points(&fragment.operations, &CodeMap::new());

        let text = render_function(&function);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "f, file 'm.py', line 1 (lines 1-5)");
        assert_eq!(lines[1], "  CALL_FUNCTION (line 1)");
        assert_eq!(lines[2], "  > inlined call to g in m.py [1]");
        assert_eq!(lines[3], "    LOAD_FAST (line 5)");
        assert_eq!(lines[4], "      i1 = i0 + 1");
        assert_eq!(lines[5], "  POP_TOP (line 1)");
    }
}
