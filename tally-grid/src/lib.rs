//! tally-grid: a hierarchical, virtualized table engine.
//!
//! A table is a tree of [`LogicalRow`]s flattened into [`PhysicalRow`]s
//! according to an [`ExpandState`]. Expanding or collapsing a row patches the
//! flat sequence in place of a full rebuild, and folding columns aggregate
//! over the logical tree so collapsed rows still show their subtree totals.
//!
//! # Example
//!
//! ```ignore
//! use tally_grid::prelude::*;
//!
//! let directory = AccountDirectory::load("accounts.json")?;
//! let series = BalanceSeries::load("balances.json")?;
//! let built = TreeBuilder::new(TreeMode::AccountType)
//!     .build(&directory.accounts, |source| AccountRow::from_source(source, &series));
//!
//! let mut table = TreeTable::new(dashboard_columns(None))
//!     .snapshot(series.latest().unwrap_or_default());
//! table.data_changed(built.roots);
//! table.toggle(0);
//!
//! for line in TextRenderer::new(80).render(&table, 0..table.len()) {
//!     println!("{}", line);
//! }
//! ```

pub mod accounts;
pub mod column;
pub mod error;
pub mod expand;
pub mod flatten;
pub mod key;
pub mod render;
pub mod row;
pub mod sort;
pub mod table;
pub mod window;

pub use column::{Alignment, Cell, Column, ColumnWidth, Fold, Measure, RenderContext, Snapshot};
pub use error::DirectoryError;
pub use expand::{ExpandState, FlatRows, toggle};
pub use flatten::{PhysicalRow, flatten, flatten_forest, visible_count};
pub use key::{AccountId, InstitutionId, RowKey};
pub use render::TextRenderer;
pub use row::{Children, ColumnSet, LazyChildren, LogicalRow, RowRef, count_rows, find_row};
pub use sort::{SortDirection, SortOn, sort_forest};
pub use table::TreeTable;
pub use window::{RowHeight, RowWindow};

/// Commonly used types.
pub mod prelude {
    pub use crate::accounts::{
        Account, AccountDirectory, AccountKind, AccountRow, BalanceSeries, TreeBuilder, TreeMode,
        dashboard_columns,
    };
    pub use crate::{
        Cell, Column, ExpandState, Fold, LogicalRow, Measure, PhysicalRow, RowHeight, RowKey,
        RowRef, RowWindow, Snapshot, SortOn, TextRenderer, TreeTable,
    };
}
