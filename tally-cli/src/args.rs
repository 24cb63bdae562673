//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use tally_grid::accounts::TreeMode;
use tally_grid::{RowKey, SortOn};

/// Print an account tree with balances as a text table.
///
/// Flags override the saved settings. Expand/collapse state is remembered
/// between runs unless `--no-persist` is given.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "tally", version)]
pub struct Args {
    /// Account directory (JSON).
    #[arg(long, short = 'a', value_name = "FILE")]
    pub accounts: PathBuf,

    /// Balance history (JSON).
    #[arg(long, short = 'b', value_name = "FILE")]
    pub balances: Option<PathBuf>,

    /// Grouping: flat, user-defined, account-type or institution.
    #[arg(long, short = 'm')]
    pub mode: Option<TreeMode>,

    /// Sort column, optionally suffixed with :asc or :desc.
    #[arg(long, short = 's', value_name = "COLUMN[:DIR]")]
    pub sort: Option<SortOn>,

    /// Show balances as of this date (defaults to the latest).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Add change columns relative to this date.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub reference: Option<NaiveDate>,

    /// Rows without a saved state start expanded.
    #[arg(long, conflicts_with = "default_collapsed")]
    pub default_expanded: bool,

    /// Rows without a saved state start collapsed.
    #[arg(long)]
    pub default_collapsed: bool,

    /// Flip the row with this key (repeatable).
    #[arg(long = "toggle", short = 't', value_name = "KEY", allow_hyphen_values = true)]
    pub toggles: Vec<RowKey>,

    /// Expand every row.
    #[arg(long, conflicts_with = "collapse_all")]
    pub expand_all: bool,

    /// Collapse every row.
    #[arg(long)]
    pub collapse_all: bool,

    /// Forget saved expand/collapse state.
    #[arg(long)]
    pub reset: bool,

    /// Leave closed accounts out.
    #[arg(long)]
    pub hide_closed: bool,

    /// Show account notes as rows below their account.
    #[arg(long)]
    pub notes: bool,

    /// Add a column with each row's key, for use with --toggle.
    #[arg(long)]
    pub show_keys: bool,

    /// Output width in columns.
    #[arg(long, short = 'w')]
    pub width: Option<u16>,

    /// Number of rows to print (all when omitted).
    #[arg(long)]
    pub height: Option<u32>,

    /// First row to print.
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Scroll so that the row with this key is visible.
    #[arg(long, value_name = "KEY", allow_hyphen_values = true)]
    pub focus: Option<RowKey>,

    /// Do not read or write the saved expand/collapse state.
    #[arg(long)]
    pub no_persist: bool,

    /// Store the effective options as the new defaults.
    #[arg(long)]
    pub save_settings: bool,

    /// Log at debug level.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Args {
    /// The default-expand policy requested on the command line, if any.
    pub fn default_expand(&self) -> Option<bool> {
        match (self.default_expanded, self.default_collapsed) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
