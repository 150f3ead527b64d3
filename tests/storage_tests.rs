use jitlog_viewer::parser::parse_fragment;
use jitlog_viewer::storage::{parse_log_counts, FragmentKind, LoopStorage, TraceFragment};
use jitlog_viewer::trace::{slice_debug_merge_points, Child, CodeMap};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn fragment(text: &str, count: Option<u64>) -> TraceFragment {
    let mut fragment = parse_fragment(text).unwrap();
    fragment.count = count;
    fragment
}

#[test]
fn test_reassign_loops() {
    let main = fragment("[v0]\nguard_false(v0, descr=<Guard18>) []", Some(10));
    let bridge = fragment(
        "# bridge out of Guard 18 with 13 ops\n[i0, i1]\nint_add(i0, i1)",
        Some(3),
    );
    let entry_bridge = fragment("# Loop 3 : entry bridge\n[]", None);

    let mut storage = LoopStorage::new();
    let loops = storage.reconnect_loops(vec![main, bridge, entry_bridge]);

    assert_eq!(loops.len(), 2);
    let guard = &storage[loops[0]].operations[0];
    let bridge_id = guard.bridge.unwrap();
    assert_eq!(storage[bridge_id].operations.len(), 1);
    assert_eq!(storage[bridge_id].no, Some(18));
    assert_eq!(guard.percentage, Some(30));
    assert_eq!(storage[loops[1]].kind(), FragmentKind::EntryBridge(3));
}

#[test]
fn test_zero_owner_count_leaves_percentage_unset() {
    let main = fragment("[v0]\nguard_true(v0, descr=<Guard2>) []", Some(0));
    let bridge = fragment("# bridge out of Guard 2\n[]\nfinish()", Some(0));

    let mut storage = LoopStorage::new();
    let loops = storage.reconnect_loops(vec![main, bridge]);

    let guard = &storage[loops[0]].operations[0];
    assert!(guard.bridge.is_some());
    assert_eq!(guard.percentage, None);
}

#[test]
fn test_orphan_bridge_stays_a_root() {
    let main = fragment("[v0]\nguard_true(v0, descr=<Guard2>) []", None);
    let orphan = fragment("# bridge out of Guard 99\n[]\nfinish()", None);

    let mut storage = LoopStorage::new();
    let loops = storage.reconnect_loops(vec![main, orphan]);

    assert_eq!(loops.len(), 2);
    assert_eq!(storage[loops[0]].operations[0].bridge, None);
    assert_eq!(storage[loops[1]].no, Some(99));
}

#[test]
fn test_second_bridge_out_of_same_guard_stays_a_root() {
    let main = fragment("[v0]\nguard_true(v0, descr=<Guard4>) []", Some(10));
    let first = fragment("# bridge out of Guard 4\n[]\nfinish()", Some(2));
    let second = fragment("# bridge out of Guard 4\n[]\njump()", Some(5));

    let mut storage = LoopStorage::new();
    let loops = storage.reconnect_loops(vec![main, first, second]);

    assert_eq!(loops.len(), 2);
    let guard = &storage[loops[0]].operations[0];
    assert_eq!(guard.bridge.map(|id| id.index()), Some(1));
    assert_eq!(guard.percentage, Some(20));
    assert_eq!(loops[1].index(), 2);
}

#[test]
fn test_bridges_of_bridges_are_linked() {
    let main = fragment("[v0]\nguard_true(v0, descr=<Guard1>) []\njump(v0)", Some(100));
    let first = fragment(
        "# bridge out of Guard 1\n[v0]\nguard_false(v0, descr=<Guard2>) []\njump(v0)",
        Some(50),
    );
    let second = fragment("# bridge out of Guard 2\n[v0]\nfinish(v0)", Some(5));

    let mut storage = LoopStorage::new();
    let loops = storage.reconnect_loops(vec![main, first, second]);

    assert_eq!(loops.len(), 1);
    let first_id = storage[loops[0]].operations[0].bridge.unwrap();
    let inner_guard = &storage[first_id].operations[0];
    assert_eq!(inner_guard.percentage, Some(10));

    let selections = HashMap::from([("loop-1".to_string(), true), ("loop-2".to_string(), true)]);
    let names: Vec<String> = storage
        .adjust_bridges(loops[0], &selections)
        .into_iter()
        .map(|op| op.name)
        .collect();
    assert_eq!(names, vec!["guard_true", "guard_false", "finish"]);
}

#[test]
fn test_adjust_bridges() {
    let main = fragment(
        "[v0]\nguard_false(v0, descr=<Guard13>)\nguard_true(v0, descr=<Guard5>)",
        None,
    );
    let bridge = fragment("# bridge out of Guard 13\n[]\nint_add(0, 1)", None);

    let mut storage = LoopStorage::new();
    let loops = storage.reconnect_loops(vec![main, bridge]);
    let main_id = loops[0];

    assert_eq!(storage.adjust_bridges(main_id, &HashMap::new())[1].name, "guard_true");

    let follow = HashMap::from([("loop-13".to_string(), true)]);
    assert_eq!(storage.adjust_bridges(main_id, &follow)[1].name, "int_add");

    let declined = HashMap::from([("loop-13".to_string(), false)]);
    assert_eq!(storage.adjust_bridges(main_id, &declined)[1].name, "guard_true");

    // Guard 5 has no bridge: selecting it changes nothing
    let missing = HashMap::from([("loop-5".to_string(), true)]);
    assert_eq!(
        storage.adjust_bridges(main_id, &missing),
        storage[main_id].operations
    );
}

#[test]
fn test_unselected_splice_round_trips_through_slicer() {
    let main = fragment(
        "
        [i0]
        debug_merge_point(0, '<code object f, file 'x.py', line 1> #0 LOAD_FAST')
        i1 = int_add(i0, 1)
        guard_true(i1, descr=<Guard7>) [i0]
        debug_merge_point(1, '<code object g, file 'x.py', line 9> #0 LOAD_FAST')
        i2 = int_sub(i1, 1)
        debug_merge_point(0, '<code object f, file 'x.py', line 1> #6 JUMP_ABSOLUTE')
        jump(i2)
        ",
        Some(4),
    );
    let bridge = fragment("# bridge out of Guard 7\n[i0]\nfinish(i0)", Some(1));

    let mut storage = LoopStorage::new();
    let loops = storage.reconnect_loops(vec![main, bridge]);

    let ops = storage.adjust_bridges(loops[0], &HashMap::new());
    let function = slice_debug_merge_points(&ops, &CodeMap::new());

    let flat: Vec<_> = function.operations().into_iter().cloned().collect();
    assert_eq!(flat, storage[loops[0]].operations);
    assert!(matches!(function.children()[1], Child::Function(_)));

    // The tree sees the guard linkage set during reconnecting
    let guard = &function.children()[0].as_bytecode().unwrap().operations()[2];
    assert_eq!(guard.percentage, Some(25));
}

#[test]
fn test_from_log_end_to_end() {
    let log = "\
[1a] {jit-log-opt-loop
# Loop 0 : loop with 3 ops
[i0]
debug_merge_point(0, '<code object f, file 'x.py', line 1> #0 LOAD_FAST')
+40: guard_true(i0, descr=<Guard3>) [i0]
+52: jump(i0)
+60: --end of the loop--
[1b] jit-log-opt-loop}
[1c] {jit-log-opt-bridge
# bridge out of Guard 3 with 1 ops
[i0]
finish(i0)
[1d] jit-log-opt-bridge}
[1e] {jit-backend-counts
0:200
1:50
[1f] jit-backend-counts}
";

    let storage = LoopStorage::from_log(log, CodeMap::new()).unwrap();

    assert_eq!(storage.fragments().len(), 2);
    assert_eq!(storage.roots().len(), 1);
    let root = &storage[storage.roots()[0]];
    assert_eq!(root.count, Some(200));
    assert_eq!(root.operations.len(), 3);
    assert_eq!(root.operations[1].percentage, Some(25));

    let function = storage.function(storage.roots()[0]).unwrap();
    assert_eq!(function.name(), Some("f"));
}

#[test]
fn test_from_log_rejects_count_gaps() {
    let log = "\
{jit-log-opt-loop
[i0]
jump(i0)
jit-log-opt-loop}
{jit-backend-counts
1:5
jit-backend-counts}
";

    assert!(LoopStorage::from_log(log, CodeMap::new()).is_err());
}

#[test]
fn test_counts_feed_percentages() {
    let mut fragments = vec![
        fragment("[v0]\nguard_true(v0, descr=<Guard8>) []", None),
        fragment("# bridge out of Guard 8\n[]\nfinish()", None),
    ];
    let counts = parse_log_counts(&["0:40", "1:10"], &mut fragments).unwrap();
    assert_eq!(counts, vec![40, 10]);

    let mut storage = LoopStorage::new();
    let loops = storage.reconnect_loops(fragments);
    assert_eq!(storage[loops[0]].operations[0].percentage, Some(25));
}
