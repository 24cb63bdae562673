//! Tests for incremental expand/collapse.

use tally_grid::accounts::{Account, AccountKind, TreeBuilder, TreeMode};
use tally_grid::{
    ExpandState, FlatRows, LogicalRow, PhysicalRow, RowKey, RowRef, flatten_forest, toggle,
};

fn key(raw: i64) -> RowKey {
    RowKey::from_raw(raw)
}

fn leaf(raw: i64) -> RowRef<()> {
    LogicalRow::leaf(key(raw), ()).into_ref()
}

fn branch(raw: i64, children: Vec<RowRef<()>>) -> RowRef<()> {
    LogicalRow::branch(key(raw), (), children).into_ref()
}

fn forest() -> Vec<RowRef<()>> {
    vec![
        branch(
            1,
            vec![
                branch(2, vec![leaf(3), branch(4, vec![leaf(5), leaf(6)])]),
                leaf(7),
            ],
        ),
        branch(8, vec![branch(9, vec![leaf(10)])]),
        leaf(11),
    ]
}

fn keys<T>(rows: &[PhysicalRow<T>]) -> Vec<i64> {
    rows.iter().map(|r| r.key().raw()).collect()
}

/// Every row's `num_children` equals the length of the run of deeper rows
/// that follows it.
fn assert_counts_consistent<T>(rows: &[PhysicalRow<T>]) {
    for (i, row) in rows.iter().enumerate() {
        let run = rows[i + 1..]
            .iter()
            .take_while(|r| r.level > row.level)
            .count();
        assert_eq!(row.num_children, run, "subtree size of {}", row.key());
    }
}

// ============================================================================
// Account scenario
// ============================================================================

#[test]
fn test_expand_bank_shows_children_alphabetically() {
    let accounts = vec![
        Account::new(1, "Bank", AccountKind::Other),
        Account::new(2, "Savings", AccountKind::Savings).with_parent(1),
        Account::new(3, "Checking", AccountKind::Checking).with_parent(1),
    ];
    let built = TreeBuilder::new(TreeMode::UserDefined)
        .build(&accounts, |source| source.name().to_string());

    let rows: FlatRows<String> = flatten_forest(&built.roots, &ExpandState::new(), false).into();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].data(), "Bank");
    assert!(rows[0].expandable);
    assert!(!rows[0].expanded);
    assert_eq!(rows[0].num_children, 0);

    let (rows, state) = toggle(&rows, &ExpandState::new(), 0, false);
    let names: Vec<&str> = rows.iter().map(|r| r.data().as_str()).collect();
    assert_eq!(names, vec!["Bank", "Checking", "Savings"]);
    assert_eq!(rows[0].num_children, 2);
    assert!(rows[0].expanded);
    assert_eq!(state.get(RowKey::account(1.into())), Some(true));
}

// ============================================================================
// Round trips & no-ops
// ============================================================================

#[test]
fn test_expand_then_collapse_restores_rows() {
    let roots = forest();
    let state = ExpandState::new();
    let rows: FlatRows<()> = flatten_forest(&roots, &state, false).into();

    for index in 0..rows.len() {
        let (expanded, next) = toggle(&rows, &state, index, false);
        let (collapsed, _) = toggle(&expanded, &next, index, false);
        assert_eq!(collapsed, rows, "round trip at {}", index);
    }
}

#[test]
fn test_collapse_then_expand_restores_rows() {
    let roots = forest();
    let state = ExpandState::new();
    let rows: FlatRows<()> = flatten_forest(&roots, &state, true).into();

    for index in 0..rows.len() {
        if !rows[index].expandable {
            continue;
        }
        let (collapsed, next) = toggle(&rows, &state, index, true);
        let (expanded, _) = toggle(&collapsed, &next, index, true);
        assert_eq!(expanded, rows, "round trip at {}", index);
    }
}

#[test]
fn test_toggle_leaf_is_noop() {
    let roots = forest();
    let state = ExpandState::new();
    let rows: FlatRows<()> = flatten_forest(&roots, &state, true).into();
    let leaf_index = keys(&rows).iter().position(|k| *k == 3).unwrap();

    let (next_rows, next_state) = toggle(&rows, &state, leaf_index, true);
    assert!(next_state.same_as(&state));
    assert_eq!(next_rows, rows);
}

#[test]
fn test_toggle_out_of_range_is_noop() {
    let roots = forest();
    let state = ExpandState::new();
    let rows: FlatRows<()> = flatten_forest(&roots, &state, false).into();

    let (next_rows, next_state) = toggle(&rows, &state, rows.len(), false);
    assert!(next_state.same_as(&state));
    assert_eq!(next_rows, rows);
}

#[test]
fn test_toggle_never_mutates_previous_state() {
    let roots = forest();
    let state = ExpandState::new().with(key(8), true);
    let rows: FlatRows<()> = flatten_forest(&roots, &state, false).into();

    let (_, next) = toggle(&rows, &state, 0, false);
    assert_eq!(state.get(key(1)), None);
    assert_eq!(next.get(key(1)), Some(true));
    assert_eq!(next.get(key(8)), Some(true));
    assert!(!next.same_as(&state));
}

// ============================================================================
// Nested toggles
// ============================================================================

#[test]
fn test_nested_toggles_match_full_rebuild() {
    let roots = forest();
    let mut state = ExpandState::new();
    let mut rows: FlatRows<()> = flatten_forest(&roots, &state, false).into();

    // Open 1, 2 and 4, close 2, open 8 and 9, then close 1.
    for target in [1, 2, 4, 2, 8, 9, 1] {
        let index = keys(&rows).iter().position(|k| *k == target).unwrap();
        let (next_rows, next_state) = toggle(&rows, &state, index, false);
        rows = next_rows;
        state = next_state;

        assert_counts_consistent(&rows);
        let rebuilt = flatten_forest(&roots, &state, false);
        assert_eq!(&rows[..], &rebuilt[..], "after toggling {}", target);
    }

    assert_eq!(keys(&rows), vec![1, 8, 9, 10, 11]);
}

#[test]
fn test_collapse_deep_row_updates_every_ancestor() {
    let roots = forest();
    let state = ExpandState::new();
    let rows: FlatRows<()> = flatten_forest(&roots, &state, true).into();
    assert_eq!(rows[0].num_children, 6);

    let index = keys(&rows).iter().position(|k| *k == 4).unwrap();
    let (rows, _) = toggle(&rows, &state, index, true);

    assert_eq!(keys(&rows), vec![1, 2, 3, 4, 7, 8, 9, 10, 11]);
    assert_eq!(rows[0].num_children, 4);
    assert_eq!(rows[1].num_children, 2);
    assert_eq!(rows[5].num_children, 2);
    assert_counts_consistent(&rows);
}
