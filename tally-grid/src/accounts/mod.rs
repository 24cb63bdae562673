//! Account directory, balance history and the account tree builder.

mod builder;
mod columns;
mod model;
mod row;
mod series;

pub use builder::{
    BuildDiagnostic, BuiltTree, GroupNode, Grouping, NodeSource, ParseTreeModeError, TreeBuilder,
    TreeMode,
};
pub use columns::{
    attach_notes, balance_column, change_column, dashboard_columns, key_column, kind_column,
    name_column, note_columns, note_key, percent_change_column, share_column,
};
pub use model::{Account, AccountDirectory, AccountKind, Institution};
pub use row::AccountRow;
pub use series::{BalanceSeries, value_at};
