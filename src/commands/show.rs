//! Show command implementation.
//!
//! Prints the call tree of one root fragment, optionally following
//! bridges at selected guards.

use super::models::ShowArgs;
use super::utils::load_storage;
use crate::output::render_function;
use crate::trace::slice_debug_merge_points;
use crate::utils::config::BRIDGE_SELECTION_PREFIX;
use anyhow::Result;
use log::info;
use std::collections::HashMap;

/// Execute the show command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The rendered tree, which is also printed to stdout
pub fn execute_show(args: ShowArgs) -> Result<String> {
    let storage = load_storage(&args.log, args.code_map.as_deref())?;

    let Some(&id) = storage.roots().get(args.root) else {
        anyhow::bail!(
            "Root loop {} does not exist (log has {} root loops)",
            args.root,
            storage.roots().len()
        );
    };

    info!("Showing {} ({})", storage[id].label(), id);

    let selections = bridge_selections(&args.follow);
    let operations = storage.adjust_bridges(id, &selections);
    let function = slice_debug_merge_points(&operations, storage.code_map());

    let rendered = render_function(&function);
    println!("{}", rendered);

    Ok(rendered)
}

/// Turn guard numbers into `loop-<guard>` selections
///
/// **Public** - shared with callers that build selections themselves
pub fn bridge_selections(guards: &[u32]) -> HashMap<String, bool> {
    guards
        .iter()
        .map(|no| (format!("{}{}", BRIDGE_SELECTION_PREFIX, no), true))
        .collect()
}
