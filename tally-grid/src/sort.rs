//! Recursive per-sibling-group sorting.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::column::{Cell, Column, RenderContext, Snapshot};
use crate::row::{Children, RowRef};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Which column a table is sorted on, and in which direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOn {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOn {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

impl fmt::Display for SortOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}", self.column),
            SortDirection::Descending => write!(f, "{}:desc", self.column),
        }
    }
}

/// Error returned when parsing a [`SortOn`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort '{0}', expected <column>[:asc|:desc]")]
pub struct ParseSortError(String);

impl FromStr for SortOn {
    type Err = ParseSortError;

    /// Parses `column`, `column:asc` or `column:desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match s.split_once(':') {
            Some((column, "asc")) => (column, SortDirection::Ascending),
            Some((column, "desc")) => (column, SortDirection::Descending),
            Some(_) => return Err(ParseSortError(s.to_string())),
            None => (s, SortDirection::Ascending),
        };
        if column.trim().is_empty() {
            return Err(ParseSortError(s.to_string()));
        }
        Ok(Self {
            column: column.trim().to_string(),
            direction,
        })
    }
}

/// Sort every sibling group of the forest by the column named in `sort`.
///
/// The parent/child structure is preserved; only siblings are reordered.
/// Lazy children stay lazy and are sorted when they are loaded. If the
/// column does not exist or has no comparator the forest is returned in its
/// current order.
pub fn sort_forest<T>(
    roots: &[RowRef<T>],
    columns: &[Column<T>],
    sort: &SortOn,
    snapshot: Snapshot,
) -> Vec<RowRef<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let Some(column) = columns.iter().find(|c| c.id == sort.column) else {
        log::debug!("sort ignored: unknown column '{}'", sort.column);
        return roots.to_vec();
    };
    if !column.is_sortable() {
        log::debug!("sort ignored: column '{}' has no comparator", sort.column);
        return roots.to_vec();
    }

    // Totals are read once here so the sorter does not hold the roots.
    let ctx = RenderContext::new(roots, snapshot);
    let total_now = ctx.total(column, snapshot);
    let sorter = Arc::new(Sorter {
        column: column.clone(),
        direction: sort.direction,
        snapshot,
        total_now,
    });
    sorter.sort_siblings(roots)
}

struct Sorter<T> {
    column: Column<T>,
    direction: SortDirection,
    snapshot: Snapshot,
    total_now: Option<f64>,
}

impl<T> Sorter<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn sort_siblings(self: &Arc<Self>, rows: &[RowRef<T>]) -> Vec<RowRef<T>> {
        let mut sorted: Vec<RowRef<T>> = rows.iter().map(|row| self.sort_row(row)).collect();

        if let Some(compare) = self.column.data_comparator() {
            sorted.sort_by(|a, b| self.direction.apply(compare(a.data(), b.data())));
            return sorted;
        }

        let mut keyed: Vec<(Cell, RowRef<T>)> = sorted
            .into_iter()
            .map(|row| (self.displayed(&row), row))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| self.direction.apply(a.compare(b)));
        keyed.into_iter().map(|(_, row)| row).collect()
    }

    /// Copy of `row` whose descendants are sorted.
    fn sort_row(self: &Arc<Self>, row: &RowRef<T>) -> RowRef<T> {
        match row.children_slot() {
            None => row.clone(),
            Some(Children::Loaded(children)) => {
                let children = self.sort_siblings(children);
                Arc::new(row.with_children(Some(Children::loaded(children))))
            }
            Some(Children::Lazy(lazy)) => {
                let lazy = lazy.clone();
                let sorter = self.clone();
                Arc::new(row.with_children(Some(Children::lazy(move || {
                    sorter.sort_siblings(&lazy.load())
                }))))
            }
        }
    }

    fn displayed(&self, row: &RowRef<T>) -> Cell {
        let no_roots: Vec<RowRef<T>> = Vec::new();
        let ctx = RenderContext::new(&no_roots, self.snapshot);
        ctx.pin_total(&self.column, self.snapshot, self.total_now);
        self.column.sort_key(row, &ctx).unwrap_or(Cell::Empty)
    }
}
