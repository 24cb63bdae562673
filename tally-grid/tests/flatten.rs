//! Tests for flattening logical trees into physical rows.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tally_grid::{
    ExpandState, LogicalRow, PhysicalRow, RowKey, RowRef, count_rows, flatten, flatten_forest,
    visible_count,
};

fn key(raw: i64) -> RowKey {
    RowKey::from_raw(raw)
}

fn leaf(raw: i64) -> RowRef<&'static str> {
    LogicalRow::leaf(key(raw), "leaf").into_ref()
}

fn branch(raw: i64, children: Vec<RowRef<&'static str>>) -> RowRef<&'static str> {
    LogicalRow::branch(key(raw), "branch", children).into_ref()
}

/// 1 ─┬ 2 ─┬ 3
///    │    └ 4
///    └ 5
/// 6 ── 7
fn forest() -> Vec<RowRef<&'static str>> {
    vec![
        branch(1, vec![branch(2, vec![leaf(3), leaf(4)]), leaf(5)]),
        branch(6, vec![leaf(7)]),
    ]
}

fn keys<T>(rows: &[PhysicalRow<T>]) -> Vec<i64> {
    rows.iter().map(|r| r.key().raw()).collect()
}

// ============================================================================
// Expansion
// ============================================================================

#[test]
fn test_collapsed_by_default_shows_roots_only() {
    let rows = flatten_forest(&forest(), &ExpandState::new(), false);
    assert_eq!(keys(&rows), vec![1, 6]);
    assert!(rows.iter().all(|r| r.expandable && !r.expanded));
    assert!(rows.iter().all(|r| r.num_children == 0));
}

#[test]
fn test_expanded_by_default_is_full_preorder() {
    let roots = forest();
    let rows = flatten_forest(&roots, &ExpandState::new(), true);
    assert_eq!(keys(&rows), vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(rows.len(), count_rows(&roots));
    assert_eq!(
        rows.iter().map(|r| r.level).collect::<Vec<_>>(),
        vec![0, 1, 2, 2, 1, 0, 1]
    );
}

#[test]
fn test_explicit_state_overrides_default() {
    let state = ExpandState::new().with(key(2), false);
    let rows = flatten_forest(&forest(), &state, true);
    assert_eq!(keys(&rows), vec![1, 2, 5, 6, 7]);
    assert!(!rows[1].expanded);
    assert!(rows[1].expandable);
}

#[test]
fn test_hidden_state_applies_when_ancestor_opens() {
    // 2 is open but its parent is closed; opening 1 reveals 3 and 4 too.
    let state = ExpandState::new().with(key(2), true);
    let rows = flatten_forest(&forest(), &state, false);
    assert_eq!(keys(&rows), vec![1, 6]);

    let state = state.with(key(1), true);
    let rows = flatten_forest(&forest(), &state, false);
    assert_eq!(keys(&rows), vec![1, 2, 3, 4, 5, 6]);
}

// ============================================================================
// Subtree sizes
// ============================================================================

#[test]
fn test_num_children_counts_visible_subtree() {
    let rows = flatten_forest(&forest(), &ExpandState::new(), true);
    let sizes: Vec<usize> = rows.iter().map(|r| r.num_children).collect();
    assert_eq!(sizes, vec![4, 2, 0, 0, 0, 1, 0]);
}

#[test]
fn test_flatten_starts_with_node_at_level() {
    let roots = forest();
    let rows = flatten(&roots[0], &ExpandState::new(), 3, true);
    assert_eq!(rows[0].key(), key(1));
    assert_eq!(rows[0].level, 3);
    assert_eq!(rows[1].level, 4);
    assert_eq!(rows[0].num_children, rows.len() - 1);
}

#[test]
fn test_visible_count_matches_flatten() {
    let roots = forest();
    for default_expand in [false, true] {
        let state = ExpandState::new().with(key(2), !default_expand);
        for root in &roots {
            assert_eq!(
                visible_count(root, &state, default_expand),
                flatten(root, &state, 0, default_expand).len()
            );
        }
    }
}

// ============================================================================
// Lazy children
// ============================================================================

#[test]
fn test_lazy_children_load_when_flattened() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let root = LogicalRow::lazy(key(1), "lazy", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        vec![leaf(2), leaf(3)]
    })
    .into_ref();

    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let rows = flatten(&root, &ExpandState::new(), 0, true);
    assert_eq!(keys(&rows), vec![1, 2, 3]);
    assert!(root.is_expandable());
    assert_eq!(visible_count(&root, &ExpandState::new(), true), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_lazy_children_are_shared_by_copies() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let root = LogicalRow::lazy(key(1), "lazy", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        vec![leaf(2)]
    })
    .into_ref();

    let copy = root.with_children(root.children_slot().cloned());
    assert_eq!(copy.children().len(), 1);
    assert_eq!(root.children().len(), 1);
    assert!(Arc::ptr_eq(&root.children()[0], &copy.children()[0]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_child_list_is_not_expandable() {
    let root = LogicalRow::lazy(key(1), "lazy", Vec::new).into_ref();
    let rows = flatten(&root, &ExpandState::new().with(key(1), true), 0, false);
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].expandable);
    assert!(!rows[0].expanded);
}
