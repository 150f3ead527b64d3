//! Parser for the textual dump of one optimized trace.
//!
//! Input looks like:
//!
//! ```text
//! # bridge out of Guard 18 with 13 ops
//! [i0, i1]
//! debug_merge_point(0, '<code object f, file 'x.py', line 2> #0 LOAD_FAST')
//! +120: i2 = int_add(i0, i1)
//! guard_true(i2, descr=<Guard19>) [i0, i1]
//! ```

use super::operation::Operation;
use crate::storage::TraceFragment;
use crate::utils::config::{DEBUG_MERGE_POINT, END_OF_LOOP_MARKER};
use crate::utils::error::ParseError;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

static OPERATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(\w+)\s*=\s*)?(\w+)\((.*)$").unwrap());

static BACKEND_OFFSET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+\d+:\s*").unwrap());

/// Parse one logged trace into a fragment
///
/// **Public** - main entry point for fragment parsing
///
/// # Arguments
/// * `text` - Body of a loop or bridge section
///
/// # Returns
/// A fragment with its identifying comment, input args and operations
///
/// # Errors
/// * `ParseError::InvalidLine` - Line is neither comment, input list nor operation
/// * `ParseError::UnbalancedArguments` - Operation arguments do not close
pub fn parse_fragment(text: &str) -> Result<TraceFragment, ParseError> {
    let mut fragment = TraceFragment::default();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            if fragment.comment.is_none() {
                fragment.comment = Some(line.to_string());
            }
            continue;
        }

        if fragment.operations.is_empty() && line.starts_with('[') && line.ends_with(']') {
            fragment.input_args = split_list(&line[1..line.len() - 1]);
            continue;
        }

        let line = BACKEND_OFFSET_REGEX.replace(line, "");
        if line == END_OF_LOOP_MARKER {
            continue;
        }
        fragment.operations.push(parse_operation(&line, line_no)?);
    }

    debug!(
        "Parsed fragment {:?} with {} operations",
        fragment.comment,
        fragment.operations.len()
    );

    Ok(fragment)
}

/// Parse a single operation line
///
/// **Private** - internal helper for parse_fragment
fn parse_operation(line: &str, line_no: usize) -> Result<Operation, ParseError> {
    let caps = OPERATION_REGEX.captures(line).ok_or_else(|| ParseError::InvalidLine {
        line: line_no,
        text: line.to_string(),
    })?;

    let result = caps.get(1).map(|m| m.as_str().to_string());
    let name = caps[2].to_string();
    let rest = caps.get(3).map_or("", |m| m.as_str());

    let (args, tail) = if name == DEBUG_MERGE_POINT {
        split_merge_point_args(rest, line_no)?
    } else {
        let (body, tail) = split_at_closing_paren(rest).ok_or_else(|| {
            ParseError::UnbalancedArguments {
                line: line_no,
                text: line.to_string(),
            }
        })?;
        let args = split_arguments(body).ok_or_else(|| ParseError::UnbalancedArguments {
            line: line_no,
            text: line.to_string(),
        })?;
        (args, tail)
    };

    let mut op = Operation::new(name, Vec::new());
    op.result = result;
    for arg in args {
        match arg.strip_prefix("descr=") {
            Some(descr) => op.descr = Some(descr.to_string()),
            None => op.args.push(arg),
        }
    }

    let tail = tail.trim();
    if tail.starts_with('[') && tail.ends_with(']') {
        op.fail_args = Some(split_list(&tail[1..tail.len() - 1]));
    } else if !tail.is_empty() {
        warn!("line {}: ignoring trailing text {:?}", line_no, tail);
    }

    Ok(op)
}

/// Split `debug_merge_point` arguments
///
/// The marker text may itself contain quotes, so it spans from the first
/// quote to the last quote before the closing parenthesis. Bare integers
/// around it are kept as separate arguments.
///
/// **Private** - internal helper for parse_operation
fn split_merge_point_args(rest: &str, line_no: usize) -> Result<(Vec<String>, &str), ParseError> {
    let close = rest.rfind(')').ok_or_else(|| ParseError::UnbalancedArguments {
        line: line_no,
        text: rest.to_string(),
    })?;
    let body = &rest[..close];
    let tail = &rest[close + 1..];

    let quote_start = body.find(|c| c == '\'' || c == '"');
    let quote_end = quote_start.and_then(|start| {
        let quote = &body[start..start + 1];
        body.rfind(quote).filter(|end| *end > start)
    });

    let args = match (quote_start, quote_end) {
        (Some(start), Some(end)) => {
            let mut args = split_list(&body[..start]);
            args.push(body[start + 1..end].to_string());
            args.extend(split_list(&body[end + 1..]));
            args
        }
        _ => vec![body.trim().to_string()],
    };

    Ok((args, tail))
}

/// Find the parenthesis closing the argument list
///
/// # Returns
/// (argument body, text after the parenthesis), or None when unbalanced
///
/// **Private** - internal helper for parse_operation
fn split_at_closing_paren(rest: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in rest.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') if depth == 0 => return Some((&rest[..i], &rest[i + 1..])),
            (None, ')') => depth -= 1,
            _ => {}
        }
    }

    None
}

/// Split an argument body on top-level commas
///
/// **Private** - internal helper for parse_operation
fn split_arguments(body: &str) -> Option<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for c in body.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[' | '<' | '{') => depth += 1,
            (None, ')' | ']' | '>' | '}') => depth -= 1,
            (None, ',') if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        if depth < 0 {
            return None;
        }
        current.push(c);
    }

    if depth != 0 || quote.is_some() {
        return None;
    }

    let last = current.trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last.to_string());
    }

    Some(args)
}

/// Split a comma separated list, dropping empty entries
fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
