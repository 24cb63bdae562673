//! Stock columns for account tables.

use std::sync::Arc;

use crate::column::{Alignment, Cell, Column, Fold, Measure, Snapshot};
use crate::key::RowKey;
use crate::row::{Children, ColumnSet, LogicalRow, RowRef};

use super::row::AccountRow;

/// Account or group name. Shows "Total" in the footer.
pub fn name_column() -> Column<AccountRow> {
    Column::text("name", "Account", |row: &AccountRow| row.name().to_string())
        .flex(3)
        .sortable()
        .foot(|_, _| Cell::Text("Total".to_string()))
}

/// Account kind label; empty for groups and notes.
pub fn kind_column() -> Column<AccountRow> {
    Column::text("kind", "Type", |row: &AccountRow| {
        row.account()
            .map(|account| account.kind.label().to_string())
            .unwrap_or_default()
    })
    .fixed(12)
    .sortable()
}

/// Row key, for scripting expand/collapse by key.
pub fn key_column() -> Column<AccountRow> {
    Column::text("key", "Key", |row: &AccountRow| row.key().to_string())
        .fixed(20)
        .align(Alignment::Right)
}

fn balance_value(row: &AccountRow, at: Snapshot) -> Option<f64> {
    row.balance(at)
}

/// Balance at the table snapshot, summed over subtrees.
pub fn balance_column() -> Column<AccountRow> {
    Column::value("balance", "Balance", balance_value)
        .fold(Fold::sum())
        .sortable()
        .foot_total()
        .fixed(14)
}

/// Share of the table total at the table snapshot.
pub fn share_column() -> Column<AccountRow> {
    Column::value("share", "Share", balance_value)
        .measure(Measure::ShareOfTotal)
        .fold(Fold::sum())
        .sortable()
        .foot_total()
        .fixed(8)
}

/// Change in balance since `reference`.
pub fn change_column(reference: Snapshot) -> Column<AccountRow> {
    Column::value("change", "Change", balance_value)
        .measure(Measure::ChangeFrom(reference))
        .fold(Fold::sum())
        .sortable()
        .foot_total()
        .fixed(14)
}

/// Relative change in balance since `reference`.
pub fn percent_change_column(reference: Snapshot) -> Column<AccountRow> {
    Column::value("change_pct", "Change %", balance_value)
        .measure(Measure::PercentChangeFrom(reference))
        .fold(Fold::sum())
        .sortable()
        .foot_total()
        .fixed(9)
}

/// The net-worth dashboard column set.
pub fn dashboard_columns(reference: Option<Snapshot>) -> Vec<Column<AccountRow>> {
    let mut columns = vec![name_column(), kind_column(), balance_column(), share_column()];
    if let Some(reference) = reference {
        columns.push(change_column(reference));
        columns.push(percent_change_column(reference));
    }
    columns
}

/// Single full-width column used by note rows.
pub fn note_columns() -> ColumnSet<AccountRow> {
    Arc::from(vec![
        Column::text("note", "", |row: &AccountRow| row.name().to_string()).flex(1),
    ])
}

/// Key of the note row attached to the account behind `key`.
pub fn note_key(account_key: RowKey) -> RowKey {
    RowKey::synthetic("note", &account_key.to_string())
}

/// Copy of the forest where every account with notes gets a leading child
/// row showing them.
///
/// Note rows replace the table's columns with [`note_columns`]. Lazy child
/// lists stay lazy.
pub fn attach_notes(roots: &[RowRef<AccountRow>]) -> Vec<RowRef<AccountRow>> {
    let columns = note_columns();
    roots
        .iter()
        .map(|row| attach_row(row, &columns))
        .collect()
}

fn attach_row(row: &RowRef<AccountRow>, columns: &ColumnSet<AccountRow>) -> RowRef<AccountRow> {
    let note = note_row(row, columns);

    let children = match row.children_slot() {
        None => note.map(|note| Children::loaded(vec![note])),
        Some(Children::Loaded(children)) => {
            let mut rows: Vec<RowRef<AccountRow>> = note.into_iter().collect();
            rows.extend(children.iter().map(|child| attach_row(child, columns)));
            Some(Children::loaded(rows))
        }
        Some(Children::Lazy(lazy)) => {
            let lazy = lazy.clone();
            let columns = columns.clone();
            Some(Children::lazy(move || {
                let mut rows: Vec<RowRef<AccountRow>> = note.iter().cloned().collect();
                rows.extend(lazy.load().iter().map(|child| attach_row(child, &columns)));
                rows
            }))
        }
    };

    match (row.children_slot(), &children) {
        (None, None) => row.clone(),
        _ => Arc::new(row.with_children(children)),
    }
}

fn note_row(row: &RowRef<AccountRow>, columns: &ColumnSet<AccountRow>) -> Option<RowRef<AccountRow>> {
    let account = row.data().account()?;
    let text = account.notes.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }
    let data = AccountRow::Note {
        account: account.id,
        text: text.to_string(),
    };
    Some(
        LogicalRow::leaf(note_key(row.key()), data)
            .with_columns(columns.clone())
            .into_ref(),
    )
}
