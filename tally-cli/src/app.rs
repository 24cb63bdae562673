//! The `tally` report: build the account tree, apply the requested
//! expand/collapse changes and render a window of it as text.

use std::io::{self, Write};
use std::ops::Range;

use chrono::NaiveDate;
use tally_grid::accounts::{
    AccountDirectory, AccountRow, BalanceSeries, TreeBuilder, TreeMode, attach_notes,
    dashboard_columns, key_column,
};
use tally_grid::{ExpandState, RowHeight, RowKey, Snapshot, SortOn, TextRenderer, TreeTable};

use crate::args::Args;
use crate::error::CliError;
use crate::paths;
use crate::settings::{self, Settings};

/// Everything that shapes one report, after merging flags over settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub mode: TreeMode,
    pub default_expand: bool,
    pub sort: Option<SortOn>,
    pub date: Option<NaiveDate>,
    pub reference: Option<NaiveDate>,
    pub toggles: Vec<RowKey>,
    pub expand_all: bool,
    pub collapse_all: bool,
    pub reset: bool,
    pub hide_closed: bool,
    pub show_notes: bool,
    pub show_keys: bool,
    pub width: u16,
    pub height: Option<u32>,
    pub offset: u32,
    pub focus: Option<RowKey>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::new(&Args::default(), &Settings::default())
    }
}

impl ReportOptions {
    pub fn new(args: &Args, settings: &Settings) -> Self {
        Self {
            mode: args.mode.unwrap_or(settings.mode),
            default_expand: args.default_expand().unwrap_or(settings.default_expand),
            sort: args.sort.clone().or_else(|| settings.sort.clone()),
            date: args.date,
            reference: args.reference,
            toggles: args.toggles.clone(),
            expand_all: args.expand_all,
            collapse_all: args.collapse_all,
            reset: args.reset,
            hide_closed: args.hide_closed || settings.hide_closed,
            show_notes: args.notes || settings.show_notes,
            show_keys: args.show_keys,
            width: args.width.unwrap_or(settings.width),
            height: args.height.or(settings.height),
            offset: args.offset,
            focus: args.focus,
        }
    }

    /// The options worth remembering as defaults.
    pub fn to_settings(&self, persist_expand_state: bool) -> Settings {
        Settings {
            mode: self.mode,
            default_expand: self.default_expand,
            sort: self.sort.clone(),
            width: self.width,
            height: self.height,
            hide_closed: self.hide_closed,
            show_notes: self.show_notes,
            persist_expand_state,
        }
    }
}

/// Output of [`render_report`].
#[derive(Debug, Clone)]
pub struct Report {
    pub lines: Vec<String>,
    /// Expand state after applying the requested changes.
    pub expand_state: ExpandState,
    /// Repairs made while building the tree and requests that had no effect.
    pub warnings: Vec<String>,
}

/// Build and render the report for `directory`, starting from `expand`.
pub fn render_report(
    directory: &AccountDirectory,
    balances: &BalanceSeries,
    options: &ReportOptions,
    expand: ExpandState,
) -> Result<Report, CliError> {
    let built = TreeBuilder::new(options.mode)
        .institutions(&directory.institutions)
        .hide_closed(options.hide_closed)
        .build(&directory.accounts, |source| AccountRow::from_source(source, balances));
    let mut warnings: Vec<String> = built.diagnostics.iter().map(ToString::to_string).collect();

    let roots = if options.show_notes {
        attach_notes(&built.roots)
    } else {
        built.roots
    };

    let snapshot = resolve_snapshot(balances, options.date)?;
    let reference = options
        .reference
        .map(|date| resolve_snapshot(balances, Some(date)))
        .transpose()?;

    let mut columns = dashboard_columns(reference);
    if options.show_keys {
        columns.push(key_column());
    }

    let mut table = TreeTable::new(columns)
        .default_expand(options.default_expand)
        .snapshot(snapshot)
        .initial_expand_state(expand);
    if let Some(sort) = &options.sort {
        table = table.sort_on(sort.clone());
    }
    table.data_changed(roots);

    apply_changes(&mut table, options, &mut warnings);

    let range = visible_rows(&table, options, &mut warnings);
    log::debug!(
        "rendering rows {:?} of {} in {} mode at {}",
        range,
        table.len(),
        options.mode,
        snapshot
    );
    let lines = TextRenderer::new(options.width).render(&table, range);

    Ok(Report {
        lines,
        expand_state: table.expand_state().clone(),
        warnings,
    })
}

fn apply_changes(
    table: &mut TreeTable<AccountRow>,
    options: &ReportOptions,
    warnings: &mut Vec<String>,
) {
    if options.reset {
        table.reset();
    }
    if options.expand_all {
        table.expand_all();
    } else if options.collapse_all {
        table.collapse_all();
    }
    for &key in &options.toggles {
        if !table.toggle_key(key) {
            warnings.push(format!("row {} does not exist or has no children", key));
        }
    }
}

fn visible_rows(
    table: &TreeTable<AccountRow>,
    options: &ReportOptions,
    warnings: &mut Vec<String>,
) -> Range<usize> {
    let window = table.window(&RowHeight::default());
    let viewport = options.height.unwrap_or_else(|| window.total_height());

    let mut offset = options.offset;
    if let Some(key) = options.focus {
        match table.index_of(key) {
            Some(index) => offset = window.scroll_into_view(index, offset, viewport),
            None => warnings.push(format!("row {} is not visible", key)),
        }
    }
    window.visible_range(offset, viewport)
}

/// Run the `tally` command.
pub fn run(args: &Args) -> Result<(), CliError> {
    let settings_path = paths::settings_file();
    let settings = match &settings_path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let options = ReportOptions::new(args, &settings);
    let persist = settings.persist_expand_state && !args.no_persist;

    if args.save_settings
        && let Some(path) = &settings_path
    {
        options.to_settings(settings.persist_expand_state).save(path)?;
        log::info!("saved settings to {}", path.display());
    }

    let directory = AccountDirectory::load(&args.accounts)?;
    let balances = match &args.balances {
        Some(path) => BalanceSeries::load(path)?,
        None => BalanceSeries::default(),
    };

    let state_path = paths::expand_state_file().filter(|_| persist);
    let expand = match &state_path {
        Some(path) => settings::load_expand_state(path)?,
        None => ExpandState::new(),
    };

    let report = render_report(&directory, &balances, &options, expand.clone())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in &report.lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;

    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }

    if let Some(path) = &state_path
        && !report.expand_state.same_as(&expand)
    {
        settings::save_expand_state(path, &report.expand_state)?;
        log::info!("saved {} expand entries", report.expand_state.len());
    }
    Ok(())
}

/// Snapshot shown for `date`, or the latest one.
pub fn resolve_snapshot(
    balances: &BalanceSeries,
    date: Option<NaiveDate>,
) -> Result<Snapshot, CliError> {
    match date {
        Some(date) => balances.snapshot_on(date).ok_or(CliError::NoSnapshot(date)),
        None => Ok(balances.latest().unwrap_or_default()),
    }
}
