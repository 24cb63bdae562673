//! Tests for the window adapter.

use tally_grid::{Column, LogicalRow, RowHeight, RowKey, RowRef, RowWindow, TreeTable};

fn key(raw: i64) -> RowKey {
    RowKey::from_raw(raw)
}

fn forest() -> Vec<RowRef<&'static str>> {
    vec![
        LogicalRow::branch(
            key(1),
            "group",
            vec![
                LogicalRow::leaf(key(2), "item").into_ref(),
                LogicalRow::leaf(key(3), "item").into_ref(),
            ],
        )
        .into_ref(),
        LogicalRow::branch(
            key(4),
            "group",
            vec![LogicalRow::leaf(key(5), "item").into_ref()],
        )
        .into_ref(),
    ]
}

fn table() -> TreeTable<&'static str> {
    let mut table = TreeTable::new(Vec::<Column<&'static str>>::new()).default_expand(true);
    table.data_changed(forest());
    table
}

// ============================================================================
// Fixed heights
// ============================================================================

#[test]
fn test_fixed_height_offsets() {
    let window = table().window(&RowHeight::Fixed(1));
    assert_eq!(window.item_count(), 5);
    assert_eq!(window.item_key(0), Some(key(1)));
    assert_eq!(window.item_key(4), Some(key(5)));
    assert_eq!(window.item_key(5), None);
    assert_eq!(window.row_offset(3), 3);
    assert_eq!(window.total_height(), 5);
}

#[test]
fn test_visible_range() {
    let window = table().window(&RowHeight::Fixed(1));
    assert_eq!(window.visible_range(0, 3), 0..3);
    assert_eq!(window.visible_range(2, 10), 2..5);
    assert_eq!(window.visible_range(5, 3), 0..0);
    assert_eq!(window.visible_range(0, 0), 0..0);
}

#[test]
fn test_scroll_into_view() {
    let window = table().window(&RowHeight::Fixed(1));
    // Already visible.
    assert_eq!(window.scroll_into_view(1, 0, 3), 0);
    // Below the viewport: bottom-align.
    assert_eq!(window.scroll_into_view(4, 0, 3), 2);
    // Above the viewport: top-align.
    assert_eq!(window.scroll_into_view(0, 2, 3), 0);
    // Out of range: unchanged.
    assert_eq!(window.scroll_into_view(9, 1, 3), 1);
}

// ============================================================================
// Per-row heights
// ============================================================================

#[test]
fn test_per_row_heights() {
    let height = RowHeight::per_row(|row| if row.expandable { 2 } else { 1 });
    let window = table().window(&height);

    // Rows: 1 (2), 2 (1), 3 (1), 4 (2), 5 (1).
    assert_eq!(window.total_height(), 7);
    assert_eq!(window.row_offset(3), 4);
    assert_eq!(window.row_height(3), 2);
    assert_eq!(window.row_at_offset(0), Some(0));
    assert_eq!(window.row_at_offset(1), Some(0));
    assert_eq!(window.row_at_offset(2), Some(1));
    assert_eq!(window.row_at_offset(5), Some(3));
    assert_eq!(window.row_at_offset(6), Some(4));
    assert_eq!(window.visible_range(1, 2), 0..2);
}

#[test]
fn test_window_follows_toggles() {
    let mut table = table();
    table.toggle(0);
    let window = table.window(&RowHeight::Fixed(1));
    assert_eq!(window.item_count(), 3);
    assert_eq!(window.item_key(1), Some(key(4)));
    assert_eq!(window, RowWindow::new(table.rows(), &RowHeight::Fixed(1)));
}
