//! The table pipeline: logical tree in, flat rows out.
//!
//! [`TreeTable`] owns everything the flat sequence depends on (roots,
//! columns, sort, snapshot, default policy and expand state) and keeps the
//! rows in sync with it. Trees are replaced explicitly with
//! [`TreeTable::data_changed`]; expand state always survives a rebuild.

use std::fmt;

use crate::column::{Cell, Column, RenderContext, Snapshot};
use crate::expand::{self, ExpandState, FlatRows};
use crate::flatten::{PhysicalRow, flatten_forest};
use crate::key::RowKey;
use crate::row::{RowRef, find_row};
use crate::sort::{SortOn, sort_forest};
use crate::window::{RowHeight, RowWindow};

/// A hierarchical table.
///
/// # Example
///
/// ```ignore
/// let mut table = TreeTable::new(dashboard_columns(None))
///     .sort_on(SortOn::descending("balance"))
///     .snapshot(series.latest().unwrap_or_default());
/// table.data_changed(built.roots);
/// table.toggle(0);
/// ```
pub struct TreeTable<T> {
    /// Roots as supplied, before sorting.
    source: Vec<RowRef<T>>,
    /// Roots in display order.
    roots: Vec<RowRef<T>>,
    columns: Vec<Column<T>>,
    sort: Option<SortOn>,
    snapshot: Snapshot,
    default_expand: bool,
    expand: ExpandState,
    rows: FlatRows<T>,
}

impl<T> fmt::Debug for TreeTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeTable")
            .field("roots", &self.roots.len())
            .field("columns", &self.columns)
            .field("sort", &self.sort)
            .field("snapshot", &self.snapshot)
            .field("default_expand", &self.default_expand)
            .field("expand", &self.expand.len())
            .field("rows", &self.rows.len())
            .finish()
    }
}

impl<T> TreeTable<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty table with the given columns.
    pub fn new(columns: impl Into<Vec<Column<T>>>) -> Self {
        Self {
            source: Vec::new(),
            roots: Vec::new(),
            columns: columns.into(),
            sort: None,
            snapshot: Snapshot::default(),
            default_expand: false,
            expand: ExpandState::new(),
            rows: Vec::new().into(),
        }
    }

    // -------------------------------------------------------------------------
    // Builder
    // -------------------------------------------------------------------------

    /// Whether rows without an explicit state start expanded.
    pub fn default_expand(mut self, expanded: bool) -> Self {
        self.default_expand = expanded;
        self.reflatten();
        self
    }

    pub fn sort_on(mut self, sort: SortOn) -> Self {
        self.sort = Some(sort);
        self.resort();
        self
    }

    pub fn snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = snapshot;
        self.resort();
        self
    }

    /// Start from a previously saved expand state.
    pub fn initial_expand_state(mut self, state: ExpandState) -> Self {
        self.expand = state;
        self.reflatten();
        self
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    /// Replace the tree. The expand state is carried over.
    pub fn data_changed(&mut self, roots: Vec<RowRef<T>>) {
        self.source = roots;
        self.resort();
        log::debug!(
            "table data changed: {} roots, {} visible rows",
            self.roots.len(),
            self.rows.len()
        );
    }

    pub fn set_sort(&mut self, sort: Option<SortOn>) {
        if self.sort == sort {
            return;
        }
        self.sort = sort;
        self.resort();
    }

    pub fn set_snapshot(&mut self, snapshot: Snapshot) {
        if self.snapshot == snapshot {
            return;
        }
        self.snapshot = snapshot;
        // Value columns sort by what they show at the current snapshot.
        if self.sort.is_some() {
            self.resort();
        }
    }

    pub fn set_default_expand(&mut self, expanded: bool) {
        if self.default_expand == expanded {
            return;
        }
        self.default_expand = expanded;
        self.reflatten();
    }

    pub fn set_expand_state(&mut self, state: ExpandState) {
        if self.expand.same_as(&state) {
            return;
        }
        self.expand = state;
        self.reflatten();
    }

    pub fn set_columns(&mut self, columns: impl Into<Vec<Column<T>>>) {
        self.columns = columns.into();
        self.resort();
    }

    // -------------------------------------------------------------------------
    // Expand / collapse
    // -------------------------------------------------------------------------

    /// Toggle the row at `index`. Returns whether anything changed.
    pub fn toggle(&mut self, index: usize) -> bool {
        let (rows, state) = expand::toggle(&self.rows, &self.expand, index, self.default_expand);
        if state.same_as(&self.expand) {
            return false;
        }
        self.rows = rows;
        self.expand = state;
        true
    }

    /// Toggle the row the caller saw at `index` carrying `key`.
    ///
    /// If the rows moved since, the key is looked up again; a key that is no
    /// longer visible is ignored.
    pub fn toggle_at(&mut self, index: usize, key: RowKey) -> bool {
        if self.rows.get(index).is_some_and(|row| row.key() == key) {
            return self.toggle(index);
        }
        match self.index_of(key) {
            Some(current) => {
                log::debug!("stale toggle of {} at {}, now at {}", key, index, current);
                self.toggle(current)
            }
            None => {
                log::debug!("stale toggle of {} ignored, row not visible", key);
                false
            }
        }
    }

    /// Flip the state of the row with `key`, visible or not.
    pub fn toggle_key(&mut self, key: RowKey) -> bool {
        if let Some(index) = self.index_of(key) {
            return self.toggle(index);
        }
        let current = self.expand.resolve(key, self.default_expand);
        self.set_hidden(key, !current)
    }

    pub fn expand_key(&mut self, key: RowKey) -> bool {
        self.set_key(key, true)
    }

    pub fn collapse_key(&mut self, key: RowKey) -> bool {
        self.set_key(key, false)
    }

    /// Expand every expandable row of the tree.
    pub fn expand_all(&mut self) {
        self.expand = self.expand.with_forest(&self.roots, true);
        self.reflatten();
    }

    /// Collapse every expandable row of the tree.
    pub fn collapse_all(&mut self) {
        self.expand = self.expand.with_forest(&self.roots, false);
        self.reflatten();
    }

    /// Forget all explicit states.
    pub fn reset(&mut self) {
        self.expand = ExpandState::new();
        self.reflatten();
    }

    fn set_key(&mut self, key: RowKey, expanded: bool) -> bool {
        match self.index_of(key) {
            Some(index) if self.rows[index].expandable => {
                if self.rows[index].expanded == expanded {
                    false
                } else {
                    self.toggle(index)
                }
            }
            Some(_) => false,
            None => self.set_hidden(key, expanded),
        }
    }

    /// Record a state for a row that is not currently visible. The flat rows
    /// do not change.
    fn set_hidden(&mut self, key: RowKey, expanded: bool) -> bool {
        let exists = find_row(&self.roots, key).is_some_and(|row| row.is_expandable());
        if !exists || self.expand.get(key) == Some(expanded) {
            return false;
        }
        self.expand = self.expand.with(key, expanded);
        true
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn rows(&self) -> &FlatRows<T> {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&PhysicalRow<T>> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the visible row with `key`.
    pub fn index_of(&self, key: RowKey) -> Option<usize> {
        self.rows.iter().position(|row| row.key() == key)
    }

    pub fn expand_state(&self) -> &ExpandState {
        &self.expand
    }

    /// Roots in display order.
    pub fn roots(&self) -> &[RowRef<T>] {
        &self.roots
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn sort(&self) -> Option<&SortOn> {
        self.sort.as_ref()
    }

    pub fn current_snapshot(&self) -> Snapshot {
        self.snapshot
    }

    pub fn is_default_expanded(&self) -> bool {
        self.default_expand
    }

    /// Columns the row at `index` is rendered with.
    pub fn columns_for(&self, index: usize) -> &[Column<T>] {
        match self.rows.get(index).and_then(|row| row.row.columns_override()) {
            Some(columns) => &columns[..],
            None => &self.columns[..],
        }
    }

    /// A render context over the current roots and snapshot.
    pub fn render_context(&self) -> RenderContext<'_, T> {
        RenderContext::new(&self.roots, self.snapshot)
    }

    /// Footer cell of every table column.
    pub fn totals(&self) -> Vec<Option<Cell>> {
        let ctx = self.render_context();
        self.columns.iter().map(|column| column.render_foot(&ctx)).collect()
    }

    /// The cell the row at `index` shows in the column `column`.
    pub fn cell(&self, index: usize, column: &str) -> Option<Cell> {
        let row = self.rows.get(index)?;
        let column = self.columns_for(index).iter().find(|c| c.id == column)?;
        Some(column.render(&row.row, &self.render_context()))
    }

    /// Window over the current rows.
    pub fn window(&self, height: &RowHeight<T>) -> RowWindow {
        RowWindow::new(&self.rows, height)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn resort(&mut self) {
        self.roots = match &self.sort {
            Some(sort) => sort_forest(&self.source, &self.columns, sort, self.snapshot),
            None => self.source.clone(),
        };
        self.reflatten();
    }

    fn reflatten(&mut self) {
        self.rows = flatten_forest(&self.roots, &self.expand, self.default_expand).into();
    }
}
