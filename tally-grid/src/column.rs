//! Column descriptors, cell values and fold-based aggregation.
//!
//! A column is applied uniformly to every row type of a table. It knows how
//! to produce a cell for a row, optionally how to compare two rows, how to
//! fold a subtree into a single value and what to show in the footer.
//!
//! Aggregated values are always computed from the logical tree, never from
//! the flattened rows, so totals do not move when the user expands or
//! collapses a subtree.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::row::{LogicalRow, RowRef};

// =============================================================================
// Snapshot
// =============================================================================

/// Index into a row's data series (one entry per date or report column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub usize);

impl Snapshot {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Cell
// =============================================================================

/// Renderable content of one cell.
///
/// Numbers are kept raw; formatting (including the placeholder for NaN) is
/// left to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    /// A monetary amount.
    Amount(f64),
    /// A ratio, rendered as a percentage (0.25 is 25%).
    Percent(f64),
}

impl Cell {
    /// Numeric content, if any.
    pub fn number(&self) -> Option<f64> {
        match self {
            Cell::Amount(value) | Cell::Percent(value) => Some(*value),
            Cell::Empty | Cell::Text(_) => None,
        }
    }

    /// Ordering used when a column sorts by its displayed content.
    ///
    /// Text compares case-insensitively, numbers by total order with NaN
    /// last, and empty cells after everything else.
    pub fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Empty, Cell::Empty) => Ordering::Equal,
            (Cell::Empty, _) => Ordering::Greater,
            (_, Cell::Empty) => Ordering::Less,
            (Cell::Text(a), Cell::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Cell::Text(_), _) => Ordering::Less,
            (_, Cell::Text(_)) => Ordering::Greater,
            (a, b) => compare_numbers(a.number(), b.number()),
        }
    }
}

fn compare_numbers(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.total_cmp(&b),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Column width specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Fixed width in characters.
    Fixed(u16),
    /// Share of the remaining width, by weight.
    Flex(u16),
}

impl Default for ColumnWidth {
    fn default() -> Self {
        ColumnWidth::Flex(1)
    }
}

// =============================================================================
// Fold & Measure
// =============================================================================

/// Combines a node's own value with the folded values of its children.
#[derive(Clone)]
pub struct Fold(Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>);

impl Fold {
    pub fn new(fold: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(fold))
    }

    /// Sum of all values. NaN inputs propagate; an empty input is NaN.
    pub fn sum() -> Self {
        Self::new(|values| {
            if values.is_empty() {
                f64::NAN
            } else {
                values.iter().sum()
            }
        })
    }

    /// Smallest value. NaN inputs propagate; an empty input is NaN.
    pub fn min() -> Self {
        Self::new(|values| reduce_propagating(values, f64::min))
    }

    /// Largest value. NaN inputs propagate; an empty input is NaN.
    pub fn max() -> Self {
        Self::new(|values| reduce_propagating(values, f64::max))
    }

    pub fn apply(&self, values: &[f64]) -> f64 {
        (self.0)(values)
    }
}

impl fmt::Debug for Fold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fold")
    }
}

fn reduce_propagating(values: &[f64], op: fn(f64, f64) -> f64) -> f64 {
    values
        .iter()
        .copied()
        .reduce(|a, b| if a.is_nan() || b.is_nan() { f64::NAN } else { op(a, b) })
        .unwrap_or(f64::NAN)
}

/// What a value column displays for a row at the context's snapshot `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Measure {
    /// The value at `N`.
    #[default]
    Value,
    /// The value at `N` divided by the table total at `N`.
    ShareOfTotal,
    /// The value at `N` minus the value at the reference snapshot.
    ChangeFrom(Snapshot),
    /// The change from the reference snapshot relative to the reference value.
    PercentChangeFrom(Snapshot),
}

/// Divide, mapping a zero denominator to NaN.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

// =============================================================================
// RenderContext
// =============================================================================

/// Table-wide inputs needed to render cells: the current roots and snapshot.
///
/// Column totals are memoized per context, so one context should be used for
/// a whole render pass and dropped afterwards.
pub struct RenderContext<'a, T> {
    roots: &'a [RowRef<T>],
    snapshot: Snapshot,
    totals: RefCell<HashMap<(String, Snapshot), Option<f64>>>,
}

impl<'a, T> RenderContext<'a, T> {
    pub fn new(roots: &'a [RowRef<T>], snapshot: Snapshot) -> Self {
        Self {
            roots,
            snapshot,
            totals: RefCell::new(HashMap::new()),
        }
    }

    pub fn roots(&self) -> &'a [RowRef<T>] {
        self.roots
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    /// Table total of `column` at `snapshot`.
    pub fn total(&self, column: &Column<T>, snapshot: Snapshot) -> Option<f64> {
        let cache_key = (column.id.clone(), snapshot);
        if let Some(total) = self.totals.borrow().get(&cache_key) {
            return *total;
        }
        let total = column.total(self.roots, snapshot);
        self.totals.borrow_mut().insert(cache_key, total);
        total
    }

    /// Fix the total of `column` at `snapshot` without walking the roots.
    pub fn pin_total(&self, column: &Column<T>, snapshot: Snapshot, total: Option<f64>) {
        self.totals
            .borrow_mut()
            .insert((column.id.clone(), snapshot), total);
    }
}

// =============================================================================
// Column
// =============================================================================

type CellFn<T> = Arc<dyn Fn(&T) -> Cell + Send + Sync>;
type ValueFn<T> = Arc<dyn Fn(&T, Snapshot) -> Option<f64> + Send + Sync>;
type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;
type FootFn<T> = Arc<dyn Fn(&[RowRef<T>], Snapshot) -> Cell + Send + Sync>;

enum Source<T> {
    Cell(CellFn<T>),
    Value { value: ValueFn<T>, measure: Measure },
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        match self {
            Source::Cell(cell) => Source::Cell(cell.clone()),
            Source::Value { value, measure } => Source::Value {
                value: value.clone(),
                measure: *measure,
            },
        }
    }
}

enum Comparator<T> {
    /// Compare row payloads directly.
    Data(CompareFn<T>),
    /// Compare the cells the column displays.
    Displayed,
}

impl<T> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        match self {
            Comparator::Data(compare) => Comparator::Data(compare.clone()),
            Comparator::Displayed => Comparator::Displayed,
        }
    }
}

enum Foot<T> {
    Custom(FootFn<T>),
    /// The column's measure applied to the table total.
    Total,
}

impl<T> Clone for Foot<T> {
    fn clone(&self) -> Self {
        match self {
            Foot::Custom(foot) => Foot::Custom(foot.clone()),
            Foot::Total => Foot::Total,
        }
    }
}

/// A table column.
///
/// # Example
///
/// ```ignore
/// let balance = Column::value("balance", "Balance", |row: &AccountRow, at| row.balance(at))
///     .fold(Fold::sum())
///     .sortable()
///     .foot_total()
///     .fixed(14);
/// ```
pub struct Column<T> {
    /// Unique identifier for this column.
    pub id: String,
    /// Header text.
    pub head: String,
    /// Styling hook passed through to renderers.
    pub class_name: Option<String>,
    pub width: ColumnWidth,
    pub align: Alignment,
    source: Source<T>,
    compare: Option<Comparator<T>>,
    fold: Option<Fold>,
    foot: Option<Foot<T>>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            head: self.head.clone(),
            class_name: self.class_name.clone(),
            width: self.width,
            align: self.align,
            source: self.source.clone(),
            compare: self.compare.clone(),
            fold: self.fold.clone(),
            foot: self.foot.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("head", &self.head)
            .field("width", &self.width)
            .field("sortable", &self.is_sortable())
            .field("folds", &self.fold.is_some())
            .finish()
    }
}

impl<T> Column<T> {
    fn with_source(id: impl Into<String>, head: impl Into<String>, source: Source<T>) -> Self {
        Self {
            id: id.into(),
            head: head.into(),
            class_name: None,
            width: ColumnWidth::default(),
            align: Alignment::Left,
            source,
            compare: None,
            fold: None,
            foot: None,
        }
    }

    /// A column showing arbitrary cell content.
    pub fn cell(
        id: impl Into<String>,
        head: impl Into<String>,
        cell: impl Fn(&T) -> Cell + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(id, head, Source::Cell(Arc::new(cell)))
    }

    /// A column showing text.
    pub fn text(
        id: impl Into<String>,
        head: impl Into<String>,
        text: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self::cell(id, head, move |data| Cell::Text(text(data)))
    }

    /// A numeric column reading a value per snapshot.
    ///
    /// `value` returns `None` for rows that have no value of their own (such
    /// as grouping rows); those rows show an empty cell unless the column
    /// folds.
    pub fn value(
        id: impl Into<String>,
        head: impl Into<String>,
        value: impl Fn(&T, Snapshot) -> Option<f64> + Send + Sync + 'static,
    ) -> Self {
        let mut column = Self::with_source(
            id,
            head,
            Source::Value {
                value: Arc::new(value),
                measure: Measure::Value,
            },
        );
        column.align = Alignment::Right;
        column
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Set a fixed width for this column.
    pub fn fixed(mut self, width: u16) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    /// Set a flex width for this column.
    pub fn flex(mut self, weight: u16) -> Self {
        self.width = ColumnWidth::Flex(weight);
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Choose what a value column displays. Ignored for cell columns.
    pub fn measure(mut self, measure: Measure) -> Self {
        if let Source::Value { measure: current, .. } = &mut self.source {
            *current = measure;
        }
        self
    }

    /// Aggregate this column over subtrees.
    pub fn fold(mut self, fold: Fold) -> Self {
        self.fold = Some(fold);
        self
    }

    /// Make the column sortable with a payload comparator.
    pub fn compare(mut self, compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.compare = Some(Comparator::Data(Arc::new(compare)));
        self
    }

    /// Make the column sortable by the cells it displays.
    pub fn sortable(mut self) -> Self {
        self.compare = Some(Comparator::Displayed);
        self
    }

    /// Set a custom footer.
    pub fn foot(mut self, foot: impl Fn(&[RowRef<T>], Snapshot) -> Cell + Send + Sync + 'static) -> Self {
        self.foot = Some(Foot::Custom(Arc::new(foot)));
        self
    }

    /// Show the column's measure of the table total in the footer.
    pub fn foot_total(mut self) -> Self {
        self.foot = Some(Foot::Total);
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.compare.is_some()
    }

    pub fn folds(&self) -> bool {
        self.fold.is_some()
    }

    pub fn has_foot(&self) -> bool {
        self.foot.is_some()
    }

    /// The row's own value at `snapshot`, ignoring descendants.
    pub fn own_value(&self, data: &T, snapshot: Snapshot) -> Option<f64> {
        match &self.source {
            Source::Value { value, .. } => value(data, snapshot),
            Source::Cell(cell) => cell(data).number(),
        }
    }

    /// Fold of the row's own value and all descendants' values at `snapshot`.
    ///
    /// Walks the logical tree, so the result is independent of expand state.
    /// Subtrees without any value contribute nothing; if the whole subtree
    /// has none, the result is the fold of no values (NaN for the built-in
    /// folds).
    pub fn folded(&self, row: &LogicalRow<T>, snapshot: Snapshot, fold: &Fold) -> f64 {
        self.fold_subtree(row, snapshot, fold)
            .unwrap_or_else(|| fold.apply(&[]))
    }

    fn fold_subtree(&self, row: &LogicalRow<T>, snapshot: Snapshot, fold: &Fold) -> Option<f64> {
        let mut values = Vec::new();
        if let Some(own) = self.own_value(row.data(), snapshot) {
            values.push(own);
        }
        for child in row.children().iter() {
            if let Some(value) = self.fold_subtree(child, snapshot, fold) {
                values.push(value);
            }
        }
        if values.is_empty() {
            None
        } else {
            Some(fold.apply(&values))
        }
    }

    /// The value this column attributes to `row` at `snapshot`: the fold over
    /// its subtree if the column folds, its own value otherwise.
    ///
    /// Folding columns always produce a value; `None` only comes from a
    /// non-folding column whose row has no value of its own.
    pub fn aggregate(&self, row: &LogicalRow<T>, snapshot: Snapshot) -> Option<f64> {
        match &self.fold {
            Some(fold) => Some(self.folded(row, snapshot, fold)),
            None => self.own_value(row.data(), snapshot),
        }
    }

    /// Combined value of all `roots` at `snapshot`.
    ///
    /// Uses the column's fold, or a sum when the column does not fold. A
    /// folding column over a forest without values yields the fold of no
    /// values; a non-folding one yields `None`.
    pub fn total(&self, roots: &[RowRef<T>], snapshot: Snapshot) -> Option<f64> {
        match &self.fold {
            Some(fold) => {
                let values: Vec<f64> = roots
                    .iter()
                    .filter_map(|root| self.fold_subtree(root, snapshot, fold))
                    .collect();
                Some(fold.apply(&values))
            }
            None => {
                let values: Vec<f64> = roots
                    .iter()
                    .filter_map(|root| self.own_value(root.data(), snapshot))
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some(Fold::sum().apply(&values))
                }
            }
        }
    }

    /// The cell displayed for `row`.
    pub fn render(&self, row: &LogicalRow<T>, ctx: &RenderContext<'_, T>) -> Cell {
        match &self.source {
            Source::Cell(cell) => cell(row.data()),
            Source::Value { measure, .. } => {
                let at = |snapshot| self.aggregate(row, snapshot);
                self.measure_cell(*measure, at, ctx)
            }
        }
    }

    /// The footer cell, or `None` when the column has no footer.
    pub fn render_foot(&self, ctx: &RenderContext<'_, T>) -> Option<Cell> {
        let foot = self.foot.as_ref()?;
        Some(match foot {
            Foot::Custom(foot) => foot(ctx.roots(), ctx.snapshot()),
            Foot::Total => match &self.source {
                Source::Value { measure, .. } => {
                    let at = |snapshot| ctx.total(self, snapshot);
                    self.measure_cell(*measure, at, ctx)
                }
                Source::Cell(_) => Cell::Empty,
            },
        })
    }

    /// Apply a measure given a way to read the subject's value at a snapshot.
    fn measure_cell(
        &self,
        measure: Measure,
        at: impl Fn(Snapshot) -> Option<f64>,
        ctx: &RenderContext<'_, T>,
    ) -> Cell {
        let now = ctx.snapshot();
        match measure {
            Measure::Value => at(now).map(Cell::Amount).unwrap_or(Cell::Empty),
            Measure::ShareOfTotal => match at(now) {
                Some(value) => {
                    let total = ctx.total(self, now).unwrap_or(f64::NAN);
                    Cell::Percent(ratio(value, total))
                }
                None => Cell::Empty,
            },
            Measure::ChangeFrom(reference) => match (at(now), at(reference)) {
                (None, None) => Cell::Empty,
                (current, base) => {
                    Cell::Amount(current.unwrap_or(f64::NAN) - base.unwrap_or(f64::NAN))
                }
            },
            Measure::PercentChangeFrom(reference) => match (at(now), at(reference)) {
                (None, None) => Cell::Empty,
                (current, base) => {
                    let base = base.unwrap_or(f64::NAN);
                    Cell::Percent(ratio(current.unwrap_or(f64::NAN) - base, base.abs()))
                }
            },
        }
    }

    /// Sort key for displayed-content comparison.
    pub(crate) fn sort_key(&self, row: &LogicalRow<T>, ctx: &RenderContext<'_, T>) -> Option<Cell> {
        match self.compare.as_ref()? {
            Comparator::Data(_) => None,
            Comparator::Displayed => Some(self.render(row, ctx)),
        }
    }

    pub(crate) fn data_comparator(&self) -> Option<&CompareFn<T>> {
        match self.compare.as_ref()? {
            Comparator::Data(compare) => Some(compare),
            Comparator::Displayed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_propagates_nan() {
        assert_eq!(Fold::sum().apply(&[1.0, 2.0]), 3.0);
        assert!(Fold::sum().apply(&[1.0, f64::NAN]).is_nan());
        assert!(Fold::sum().apply(&[]).is_nan());
    }

    #[test]
    fn test_min_max_propagate_nan() {
        assert_eq!(Fold::min().apply(&[3.0, -1.0, 2.0]), -1.0);
        assert_eq!(Fold::max().apply(&[3.0, -1.0, 2.0]), 3.0);
        assert!(Fold::max().apply(&[3.0, f64::NAN]).is_nan());
    }

    #[test]
    fn test_ratio_zero_denominator() {
        assert!(ratio(5.0, 0.0).is_nan());
        assert_eq!(ratio(1.0, 4.0), 0.25);
    }

    #[test]
    fn test_cell_compare_orders_nan_and_empty_last() {
        let mut cells = vec![
            Cell::Empty,
            Cell::Amount(f64::NAN),
            Cell::Amount(2.0),
            Cell::Amount(-1.0),
        ];
        cells.sort_by(|a, b| a.compare(b));
        assert_eq!(cells[0], Cell::Amount(-1.0));
        assert_eq!(cells[1], Cell::Amount(2.0));
        assert!(cells[2].number().is_some_and(f64::is_nan));
        assert_eq!(cells[3], Cell::Empty);
    }

    #[test]
    fn test_text_compare_ignores_case() {
        let a = Cell::Text("apple".into());
        let b = Cell::Text("Banana".into());
        assert_eq!(a.compare(&b), Ordering::Less);
    }
}
