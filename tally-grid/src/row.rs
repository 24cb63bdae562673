//! Logical rows: the source-of-truth tree behind a table.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::column::Column;
use crate::key::RowKey;

/// Shared handle to a logical row.
///
/// Trees are immutable once built; rebuilding produces new roots while
/// physical rows keep pointing at the tree they were flattened from.
pub type RowRef<T> = Arc<LogicalRow<T>>;

/// Loader for children that are only materialized on demand.
pub type ChildLoader<T> = Arc<dyn Fn() -> Vec<RowRef<T>> + Send + Sync>;

/// A column set that replaces the table's columns for a single row.
pub type ColumnSet<T> = Arc<[Column<T>]>;

// =============================================================================
// Children
// =============================================================================

/// The child list of a logical row.
pub enum Children<T> {
    /// Children that are already materialized.
    Loaded(Arc<[RowRef<T>]>),
    /// Children produced by a loader the first time they are requested.
    Lazy(LazyChildren<T>),
}

impl<T> Children<T> {
    /// Wrap an already materialized child list.
    pub fn loaded(children: Vec<RowRef<T>>) -> Self {
        Self::Loaded(children.into())
    }

    /// Wrap a loader.
    pub fn lazy(loader: impl Fn() -> Vec<RowRef<T>> + Send + Sync + 'static) -> Self {
        Self::Lazy(LazyChildren::new(loader))
    }

    /// Materialize the child list.
    pub fn load(&self) -> Arc<[RowRef<T>]> {
        match self {
            Self::Loaded(children) => children.clone(),
            Self::Lazy(lazy) => lazy.load(),
        }
    }
}

impl<T> Clone for Children<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Loaded(children) => Self::Loaded(children.clone()),
            Self::Lazy(lazy) => Self::Lazy(lazy.clone()),
        }
    }
}

/// A child loader whose result is kept after the first call.
///
/// Clones share the loaded list, so the loader runs at most once per row
/// however many copies of the row exist.
pub struct LazyChildren<T> {
    inner: Arc<LazyInner<T>>,
}

struct LazyInner<T> {
    loader: ChildLoader<T>,
    loaded: OnceLock<Arc<[RowRef<T>]>>,
}

impl<T> LazyChildren<T> {
    pub fn new(loader: impl Fn() -> Vec<RowRef<T>> + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(LazyInner {
                loader: Arc::new(loader),
                loaded: OnceLock::new(),
            }),
        }
    }

    /// The children, running the loader on first use.
    pub fn load(&self) -> Arc<[RowRef<T>]> {
        self.inner
            .loaded
            .get_or_init(|| (self.inner.loader)().into())
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.get().is_some()
    }
}

impl<T> Clone for LazyChildren<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Children<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(children) => f.debug_tuple("Loaded").field(&children.len()).finish(),
            Self::Lazy(lazy) => f.debug_tuple("Lazy").field(&lazy.is_loaded()).finish(),
        }
    }
}

// =============================================================================
// LogicalRow
// =============================================================================

/// A node of the logical tree.
pub struct LogicalRow<T> {
    key: RowKey,
    data: T,
    children: Option<Children<T>>,
    columns_override: Option<ColumnSet<T>>,
}

impl<T> LogicalRow<T> {
    /// Create a row without children.
    pub fn leaf(key: RowKey, data: T) -> Self {
        Self {
            key,
            data,
            children: None,
            columns_override: None,
        }
    }

    /// Create a row with materialized children.
    pub fn branch(key: RowKey, data: T, children: Vec<RowRef<T>>) -> Self {
        Self {
            key,
            data,
            children: Some(Children::loaded(children)),
            columns_override: None,
        }
    }

    /// Create a row whose children are loaded on demand.
    pub fn lazy(
        key: RowKey,
        data: T,
        loader: impl Fn() -> Vec<RowRef<T>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            key,
            data,
            children: Some(Children::lazy(loader)),
            columns_override: None,
        }
    }

    /// Replace the table's columns for this row only.
    pub fn with_columns(mut self, columns: impl Into<ColumnSet<T>>) -> Self {
        self.columns_override = Some(columns.into());
        self
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> RowRef<T> {
        Arc::new(self)
    }

    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// The raw child slot, without loading.
    pub fn children_slot(&self) -> Option<&Children<T>> {
        self.children.as_ref()
    }

    /// Materialized children; empty for leaves.
    pub fn children(&self) -> Arc<[RowRef<T>]> {
        match &self.children {
            Some(children) => children.load(),
            None => Arc::from(Vec::new()),
        }
    }

    /// Whether the row has at least one child.
    pub fn is_expandable(&self) -> bool {
        self.children
            .as_ref()
            .is_some_and(|children| !children.load().is_empty())
    }

    pub fn columns_override(&self) -> Option<&ColumnSet<T>> {
        self.columns_override.as_ref()
    }
}

impl<T: Clone> LogicalRow<T> {
    /// Copy of this row with a different child slot.
    pub fn with_children(&self, children: Option<Children<T>>) -> Self {
        Self {
            key: self.key,
            data: self.data.clone(),
            children,
            columns_override: self.columns_override.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LogicalRow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicalRow")
            .field("key", &self.key)
            .field("data", &self.data)
            .field("children", &self.children)
            .field(
                "columns_override",
                &self.columns_override.as_ref().map(|c| c.len()),
            )
            .finish()
    }
}

/// Depth-first search for a row by key, loading children as needed.
pub fn find_row<T>(roots: &[RowRef<T>], key: RowKey) -> Option<RowRef<T>> {
    for row in roots {
        if row.key() == key {
            return Some(row.clone());
        }
        if let Some(found) = find_row(&row.children(), key) {
            return Some(found);
        }
    }
    None
}

/// Count every row of the logical forest regardless of expand state.
pub fn count_rows<T>(roots: &[RowRef<T>]) -> usize {
    roots
        .iter()
        .map(|row| 1 + count_rows(&row.children()))
        .sum()
}
