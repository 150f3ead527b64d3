//! Loop storage: owns every fragment of a log and links bridges to guards.
//!
//! Fragments live in an arena and refer to each other by [`FragmentId`].
//! Reconnecting happens in two passes: first both lookup tables are built
//! (bridges by guard number, guard sites by guard number), then guard
//! operations are patched in one go.

use super::counts::parse_log_counts;
use super::fragment::{FragmentId, FragmentKind, TraceFragment};
use crate::parser::{parse_fragment, parse_log, Operation};
use crate::trace::{CodeMap, Function};
use crate::utils::config::BRIDGE_SELECTION_PREFIX;
use crate::utils::error::LoadError;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::ops::Index;

/// All fragments of one log, plus the roots left after reconnecting
#[derive(Debug, Default)]
pub struct LoopStorage {
    fragments: Vec<TraceFragment>,
    roots: Vec<FragmentId>,
    code_map: CodeMap,
}

impl LoopStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code_map(code_map: CodeMap) -> Self {
        Self {
            code_map,
            ..Default::default()
        }
    }

    /// Parse a whole log into a reconnected storage
    ///
    /// **Public** - main entry point for log import
    ///
    /// # Arguments
    /// * `text` - Full log file contents
    /// * `code_map` - Line tables for source placement
    ///
    /// # Errors
    /// * `LoadError::Parse` - A trace section cannot be parsed
    /// * `LoadError::Format` - Counts do not match the logged fragments
    pub fn from_log(text: &str, code_map: CodeMap) -> Result<Self, LoadError> {
        let sections = parse_log(text);

        let mut fragments = sections
            .traces
            .iter()
            .map(|body| parse_fragment(body))
            .collect::<Result<Vec<_>, _>>()?;

        parse_log_counts(sections.counts.as_slice(), &mut fragments)?;

        let mut storage = Self::with_code_map(code_map);
        storage.reconnect_loops(fragments);
        Ok(storage)
    }

    pub fn code_map(&self) -> &CodeMap {
        &self.code_map
    }

    pub fn fragments(&self) -> &[TraceFragment] {
        &self.fragments
    }

    pub fn fragment(&self, id: FragmentId) -> Option<&TraceFragment> {
        self.fragments.get(id.index())
    }

    /// Fragments that are not attached to any guard, in logged order
    pub fn roots(&self) -> &[FragmentId] {
        &self.roots
    }

    /// Call tree of a fragment
    pub fn function(&self, id: FragmentId) -> Option<Function<'_>> {
        self.fragment(id).map(|f| f.function(&self.code_map))
    }

    /// Take ownership of fragments and link bridges to their guards
    ///
    /// **Public** - called once all fragments and their counts are known
    ///
    /// # Arguments
    /// * `fragments` - Every loop and bridge of the log, in logged order
    ///
    /// # Returns
    /// Ids of the fragments that are not bridges of a known guard
    ///
    /// # Algorithm
    /// 1. Register every `bridge out of Guard N` fragment under N
    /// 2. Collect every guard operation under its guard number
    /// 3. Point each guard at its bridge and compute the taken percentage
    /// 4. Everything not claimed as a bridge is a root; a second bridge out
    ///    of the same guard stays a root, the first one logged wins
    pub fn reconnect_loops(&mut self, fragments: Vec<TraceFragment>) -> Vec<FragmentId> {
        self.fragments = fragments;

        let mut bridges: Vec<(u32, FragmentId)> = Vec::new();
        let mut guard_sites: HashMap<u32, Vec<(FragmentId, usize)>> = HashMap::new();

        for (index, fragment) in self.fragments.iter_mut().enumerate() {
            let id = FragmentId(index);
            match fragment.kind() {
                FragmentKind::Bridge(no) => {
                    fragment.no = Some(no);
                    bridges.push((no, id));
                }
                FragmentKind::Loop(no) | FragmentKind::EntryBridge(no) => fragment.no = Some(no),
                FragmentKind::Unknown => {}
            }

            for (position, op) in fragment.guards() {
                if let Some(no) = op.guard_no() {
                    guard_sites.entry(no).or_default().push((id, position));
                }
            }
        }

        let mut attached: HashSet<FragmentId> = HashSet::new();
        let mut claimed: HashMap<u32, FragmentId> = HashMap::new();
        for (no, bridge) in bridges {
            let Some(sites) = guard_sites.get(&no) else {
                warn!("Bridge {} leaves unknown guard {}, keeping it as a root", bridge, no);
                continue;
            };
            if let Some(first) = claimed.get(&no) {
                warn!(
                    "Bridge {} leaves guard {} already bridged by {}, keeping it as a root",
                    bridge, no, first
                );
                continue;
            }
            claimed.insert(no, bridge);

            let bridge_count = self.fragments[bridge.index()].count;
            for &(owner, position) in sites {
                let owner_count = self.fragments[owner.index()].count;
                let op = &mut self.fragments[owner.index()].operations[position];
                op.bridge = Some(bridge);
                op.percentage = branch_percentage(bridge_count, owner_count);
            }
            attached.insert(bridge);
        }

        self.roots = (0..self.fragments.len())
            .map(FragmentId)
            .filter(|id| !attached.contains(id))
            .collect();

        info!(
            "Reconnected {} fragments: {} roots, {} bridges",
            self.fragments.len(),
            self.roots.len(),
            attached.len()
        );

        self.roots.clone()
    }

    /// Flatten a fragment along the selected bridges
    ///
    /// **Public** - used to follow one concrete path through the log
    ///
    /// # Arguments
    /// * `id` - Fragment to start from
    /// * `selections` - `"loop-<guard>"` keys; true means follow that bridge
    ///
    /// # Returns
    /// Operations of the chosen path; a followed guard is kept, then the
    /// bridge's operations replace the rest of the current sequence
    pub fn adjust_bridges(&self, id: FragmentId, selections: &HashMap<String, bool>) -> Vec<Operation> {
        let Some(start) = self.fragment(id) else {
            return Vec::new();
        };

        let mut visited: HashSet<FragmentId> = HashSet::from([id]);
        let mut ops: &[Operation] = &start.operations;
        let mut res = Vec::new();
        let mut i = 0;

        while i < ops.len() {
            let op = &ops[i];
            res.push(op.clone());

            match follow_target(op, selections) {
                Some(bridge) if visited.insert(bridge) => {
                    debug!("Following bridge {} at guard {:?}", bridge, op.guard_no());
                    ops = self.fragment(bridge).map_or(&[][..], |f| f.operations.as_slice());
                    i = 0;
                }
                _ => i += 1,
            }
        }

        res
    }
}

impl Index<FragmentId> for LoopStorage {
    type Output = TraceFragment;

    fn index(&self, id: FragmentId) -> &TraceFragment {
        &self.fragments[id.index()]
    }
}

/// Bridge to jump to from a guard, if it is selected
fn follow_target(op: &Operation, selections: &HashMap<String, bool>) -> Option<FragmentId> {
    let no = op.guard_no()?;
    let key = format!("{}{}", BRIDGE_SELECTION_PREFIX, no);
    if selections.get(&key).copied().unwrap_or(false) {
        op.bridge
    } else {
        None
    }
}

/// Share of the owner's executions that left through the bridge
///
/// Unknown when either count is missing or the owner never ran.
fn branch_percentage(bridge_count: Option<u64>, owner_count: Option<u64>) -> Option<u64> {
    match (bridge_count, owner_count) {
        (Some(bridge), Some(owner)) if owner > 0 => {
            Some((bridge as f64 * 100.0 / owner as f64).round() as u64)
        }
        _ => None,
    }
}
