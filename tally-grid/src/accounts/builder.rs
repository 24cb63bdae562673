//! Building logical trees from a flat account list.
//!
//! The builder never fails: dangling parents, cycles and duplicate ids are
//! repaired by placing the offending account at the root (or dropping the
//! duplicate) and recording a [`BuildDiagnostic`], so one bad record never
//! keeps the rest of the tree from rendering.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::key::{AccountId, InstitutionId, RowKey};
use crate::row::{LogicalRow, RowRef};

use super::model::{Account, AccountKind, Institution};

// =============================================================================
// TreeMode
// =============================================================================

/// Grouping strategy used to turn the account list into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreeMode {
    /// One root per account.
    Flat,
    /// The chart of accounts defined by each account's parent.
    #[default]
    UserDefined,
    /// One group per account kind.
    AccountType,
    /// One group per institution.
    Institution,
}

impl TreeMode {
    pub const ALL: [TreeMode; 4] = [
        TreeMode::Flat,
        TreeMode::UserDefined,
        TreeMode::AccountType,
        TreeMode::Institution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TreeMode::Flat => "flat",
            TreeMode::UserDefined => "user-defined",
            TreeMode::AccountType => "account-type",
            TreeMode::Institution => "institution",
        }
    }
}

impl fmt::Display for TreeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`TreeMode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tree mode '{0}', expected one of: flat, user-defined, account-type, institution")]
pub struct ParseTreeModeError(String);

impl FromStr for TreeMode {
    type Err = ParseTreeModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| ParseTreeModeError(s.to_string()))
    }
}

// =============================================================================
// Group nodes
// =============================================================================

/// The grouping value a synthetic node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grouping {
    Kind(AccountKind),
    /// `None` is the catch-all group for accounts without an institution.
    Institution(Option<InstitutionId>),
}

impl Grouping {
    /// Deterministic key of the group row.
    pub fn key(&self) -> RowKey {
        match self {
            Grouping::Kind(kind) => RowKey::synthetic("kind", kind.tag()),
            Grouping::Institution(Some(id)) => RowKey::synthetic("institution", &id.to_string()),
            Grouping::Institution(None) => RowKey::synthetic("institution", "none"),
        }
    }
}

/// A synthetic grouping row with no backing account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    pub key: RowKey,
    pub grouping: Grouping,
    /// Fallback display name.
    pub name: String,
}

/// What a row payload is created from.
#[derive(Debug, Clone, Copy)]
pub enum NodeSource<'a> {
    Account(&'a Account),
    Group(&'a GroupNode),
}

impl NodeSource<'_> {
    pub fn key(&self) -> RowKey {
        match self {
            NodeSource::Account(account) => RowKey::account(account.id),
            NodeSource::Group(group) => group.key,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NodeSource::Account(account) => &account.name,
            NodeSource::Group(group) => &group.name,
        }
    }
}

// =============================================================================
// Diagnostics
// =============================================================================

/// A repair the builder made to malformed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildDiagnostic {
    /// A later account reused an id; it was dropped.
    DuplicateId { id: AccountId },
    /// The parent chain runs into an account that does not exist; the
    /// account was placed at the root.
    ///
    /// `parent` is the declared parent. `missing` is the id that could not be
    /// found: the parent itself, or an ancestor reached through hidden
    /// closed accounts.
    DanglingParent {
        account: AccountId,
        parent: AccountId,
        missing: AccountId,
    },
    /// The account was its own ancestor; it was placed at the root.
    Cycle { account: AccountId },
}

impl fmt::Display for BuildDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildDiagnostic::DuplicateId { id } => {
                write!(f, "duplicate account id {}, later entry ignored", id)
            }
            BuildDiagnostic::DanglingParent {
                account,
                parent,
                missing,
            } if parent == missing => write!(
                f,
                "account {} references missing parent {}, shown at root",
                account, parent
            ),
            BuildDiagnostic::DanglingParent {
                account,
                parent,
                missing,
            } => write!(
                f,
                "account {} has hidden parent {} below missing account {}, shown at root",
                account, parent, missing
            ),
            BuildDiagnostic::Cycle { account } => {
                write!(f, "account {} is its own ancestor, shown at root", account)
            }
        }
    }
}

/// Result of a build: the roots plus any repairs that were made.
pub struct BuiltTree<T> {
    pub roots: Vec<RowRef<T>>,
    pub diagnostics: Vec<BuildDiagnostic>,
}

impl<T> fmt::Debug for BuiltTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltTree")
            .field("roots", &self.roots.len())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

// =============================================================================
// TreeBuilder
// =============================================================================

/// Builds logical trees from an account list under a [`TreeMode`].
///
/// # Example
///
/// ```ignore
/// let built = TreeBuilder::new(TreeMode::Institution)
///     .institutions(&directory.institutions)
///     .hide_closed(true)
///     .build(&directory.accounts, |source| AccountRow::from_source(source, &series));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    mode: TreeMode,
    institution_names: HashMap<InstitutionId, String>,
    hide_closed: bool,
}

impl TreeBuilder {
    pub fn new(mode: TreeMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Names used for institution groups.
    pub fn institutions<'a>(mut self, institutions: impl IntoIterator<Item = &'a Institution>) -> Self {
        self.institution_names = institutions
            .into_iter()
            .map(|i| (i.id, i.name.clone()))
            .collect();
        self
    }

    /// Leave closed accounts out of the tree.
    ///
    /// Open accounts below a closed one move up to the nearest open ancestor.
    pub fn hide_closed(mut self, hide: bool) -> Self {
        self.hide_closed = hide;
        self
    }

    pub fn mode(&self) -> TreeMode {
        self.mode
    }

    /// Build the tree, creating one payload per row with `create`.
    pub fn build<T, F>(&self, accounts: &[Account], mut create: F) -> BuiltTree<T>
    where
        F: FnMut(NodeSource<'_>) -> T,
    {
        let mut diagnostics = Vec::new();
        let unique = dedupe(accounts, &mut diagnostics);

        let visible: Vec<&Account> = unique
            .iter()
            .copied()
            .filter(|a| !(self.hide_closed && a.closed))
            .collect();

        let roots = match self.mode {
            TreeMode::Flat => sorted_by_name(visible.clone())
                .into_iter()
                .map(|account| account_leaf(account, &mut create))
                .collect(),
            TreeMode::UserDefined => {
                let parents = self.resolve_parents(&unique, &visible, &mut diagnostics);
                build_hierarchy(&visible, parents, &mut create)
            }
            TreeMode::AccountType => {
                build_groups(&visible, |a| Grouping::Kind(a.kind), |g| self.group_name(g), &mut create)
            }
            TreeMode::Institution => build_groups(
                &visible,
                |a| Grouping::Institution(a.institution_id),
                |g| self.group_name(g),
                &mut create,
            ),
        };

        for diagnostic in &diagnostics {
            log::warn!("account tree: {}", diagnostic);
        }
        log::debug!(
            "built {} tree: {} accounts, {} roots, {} diagnostics",
            self.mode,
            visible.len(),
            roots.len(),
            diagnostics.len()
        );

        BuiltTree { roots, diagnostics }
    }

    fn group_name(&self, grouping: Grouping) -> String {
        match grouping {
            Grouping::Kind(kind) => kind.group_label().to_string(),
            Grouping::Institution(Some(id)) => self
                .institution_names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| format!("Institution #{}", id)),
            Grouping::Institution(None) => "No Institution".to_string(),
        }
    }

    /// Effective parent of every visible account, with dangling references
    /// dropped, hidden ancestors skipped and cycles broken.
    fn resolve_parents(
        &self,
        all: &[&Account],
        visible: &[&Account],
        diagnostics: &mut Vec<BuildDiagnostic>,
    ) -> HashMap<AccountId, AccountId> {
        let by_id: HashMap<AccountId, &Account> = all.iter().map(|a| (a.id, *a)).collect();
        let mut parents = HashMap::new();

        for account in visible {
            let Some(declared) = account.parent_id else {
                continue;
            };
            match self.nearest_shown_ancestor(&by_id, declared) {
                Ancestor::Found(parent) => {
                    parents.insert(account.id, parent);
                }
                Ancestor::Missing(missing) => {
                    diagnostics.push(BuildDiagnostic::DanglingParent {
                        account: account.id,
                        parent: declared,
                        missing,
                    });
                }
                Ancestor::None => {}
            }
        }

        break_cycles(visible, &mut parents, diagnostics);
        parents
    }

    /// Walk up from `start`, skipping closed accounts when they are hidden.
    fn nearest_shown_ancestor(
        &self,
        by_id: &HashMap<AccountId, &Account>,
        start: AccountId,
    ) -> Ancestor {
        let mut seen = HashSet::new();
        let mut cursor = start;
        loop {
            let Some(candidate) = by_id.get(&cursor) else {
                return Ancestor::Missing(cursor);
            };
            if !(self.hide_closed && candidate.closed) {
                return Ancestor::Found(candidate.id);
            }
            if !seen.insert(cursor) {
                // A loop made only of hidden accounts.
                return Ancestor::None;
            }
            match candidate.parent_id {
                Some(next) => cursor = next,
                None => return Ancestor::None,
            }
        }
    }
}

enum Ancestor {
    Found(AccountId),
    Missing(AccountId),
    None,
}

/// Keep the first account for every id.
fn dedupe<'a>(accounts: &'a [Account], diagnostics: &mut Vec<BuildDiagnostic>) -> Vec<&'a Account> {
    let mut seen = HashSet::with_capacity(accounts.len());
    let mut unique = Vec::with_capacity(accounts.len());
    for account in accounts {
        if seen.insert(account.id) {
            unique.push(account);
        } else {
            diagnostics.push(BuildDiagnostic::DuplicateId { id: account.id });
        }
    }
    unique
}

/// Remove the parent link of the first account (in input order) of every
/// cycle in `parents`.
///
/// Accounts are visited in order; each walks its current ancestor chain. If
/// the walk returns to the account, the account is made a root, which breaks
/// the cycle for every later member. Chains that run into a cycle not
/// containing the account stop at the first repeated node.
fn break_cycles(
    order: &[&Account],
    parents: &mut HashMap<AccountId, AccountId>,
    diagnostics: &mut Vec<BuildDiagnostic>,
) {
    for account in order {
        let Some(&start) = parents.get(&account.id) else {
            continue;
        };
        let mut seen = HashSet::new();
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            if current == account.id {
                parents.remove(&account.id);
                diagnostics.push(BuildDiagnostic::Cycle { account: account.id });
                break;
            }
            if !seen.insert(current) {
                break;
            }
            cursor = parents.get(&current).copied();
        }
    }
}

/// Alphabetical by display name, ids breaking ties.
fn sorted_by_name(mut accounts: Vec<&Account>) -> Vec<&Account> {
    accounts.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.id.cmp(&b.id))
    });
    accounts
}

fn account_leaf<T>(account: &Account, create: &mut impl FnMut(NodeSource<'_>) -> T) -> RowRef<T> {
    LogicalRow::leaf(RowKey::account(account.id), create(NodeSource::Account(account))).into_ref()
}

fn build_hierarchy<T>(
    visible: &[&Account],
    parents: HashMap<AccountId, AccountId>,
    create: &mut impl FnMut(NodeSource<'_>) -> T,
) -> Vec<RowRef<T>> {
    let mut children: HashMap<AccountId, Vec<&Account>> = HashMap::new();
    let mut roots = Vec::new();
    for account in visible {
        match parents.get(&account.id) {
            Some(parent) => children.entry(*parent).or_default().push(*account),
            None => roots.push(*account),
        }
    }

    sorted_by_name(roots)
        .into_iter()
        .map(|account| build_subtree(account, &mut children, create))
        .collect()
}

fn build_subtree<T>(
    account: &Account,
    children: &mut HashMap<AccountId, Vec<&Account>>,
    create: &mut impl FnMut(NodeSource<'_>) -> T,
) -> RowRef<T> {
    let data = create(NodeSource::Account(account));
    let key = RowKey::account(account.id);
    // Cycles are broken before this point, so each list is taken once.
    match children.remove(&account.id) {
        Some(kids) => {
            let rows = sorted_by_name(kids)
                .into_iter()
                .map(|child| build_subtree(child, children, create))
                .collect();
            LogicalRow::branch(key, data, rows).into_ref()
        }
        None => LogicalRow::leaf(key, data).into_ref(),
    }
}

fn build_groups<T>(
    visible: &[&Account],
    grouping_of: impl Fn(&Account) -> Grouping,
    name_of: impl Fn(Grouping) -> String,
    create: &mut impl FnMut(NodeSource<'_>) -> T,
) -> Vec<RowRef<T>> {
    let mut order: Vec<Grouping> = Vec::new();
    let mut members: HashMap<Grouping, Vec<&Account>> = HashMap::new();
    for &account in visible {
        let grouping = grouping_of(account);
        let entry = members.entry(grouping).or_default();
        if entry.is_empty() {
            order.push(grouping);
        }
        entry.push(account);
    }

    let mut groups: Vec<GroupNode> = order
        .into_iter()
        .map(|grouping| GroupNode {
            key: grouping.key(),
            grouping,
            name: name_of(grouping),
        })
        .collect();
    groups.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.key.cmp(&b.key))
    });

    groups
        .into_iter()
        .map(|group| {
            let accounts = members.remove(&group.grouping).unwrap_or_default();
            let data = create(NodeSource::Group(&group));
            let rows = sorted_by_name(accounts)
                .into_iter()
                .map(|account| account_leaf(account, create))
                .collect();
            LogicalRow::branch(group.key, data, rows).into_ref()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: u32, parent: Option<u32>) -> Account {
        let mut account = Account::new(id, format!("a{}", id), AccountKind::Other);
        account.parent_id = parent.map(AccountId);
        account
    }

    #[test]
    fn test_break_cycles_picks_first_in_order() {
        let accounts = [account(1, Some(3)), account(2, Some(1)), account(3, Some(2))];
        let order: Vec<&Account> = accounts.iter().collect();
        let mut parents: HashMap<AccountId, AccountId> = accounts
            .iter()
            .filter_map(|a| a.parent_id.map(|p| (a.id, p)))
            .collect();
        let mut diagnostics = Vec::new();

        break_cycles(&order, &mut parents, &mut diagnostics);

        assert_eq!(diagnostics, vec![BuildDiagnostic::Cycle { account: AccountId(1) }]);
        assert!(!parents.contains_key(&AccountId(1)));
        assert_eq!(parents.get(&AccountId(2)), Some(&AccountId(1)));
        assert_eq!(parents.get(&AccountId(3)), Some(&AccountId(2)));
    }

    #[test]
    fn test_break_cycles_ignores_tail_into_foreign_cycle() {
        // 4 hangs off the 5 <-> 6 cycle without being part of it.
        let accounts = [account(4, Some(5)), account(5, Some(6)), account(6, Some(5))];
        let order: Vec<&Account> = accounts.iter().collect();
        let mut parents: HashMap<AccountId, AccountId> = accounts
            .iter()
            .filter_map(|a| a.parent_id.map(|p| (a.id, p)))
            .collect();
        let mut diagnostics = Vec::new();

        break_cycles(&order, &mut parents, &mut diagnostics);

        assert_eq!(diagnostics, vec![BuildDiagnostic::Cycle { account: AccountId(5) }]);
        assert_eq!(parents.get(&AccountId(4)), Some(&AccountId(5)));
        assert_eq!(parents.get(&AccountId(6)), Some(&AccountId(5)));
    }

    #[test]
    fn test_tree_mode_parse() {
        assert_eq!("account-type".parse::<TreeMode>().ok(), Some(TreeMode::AccountType));
        assert!("grouped".parse::<TreeMode>().is_err());
        for mode in TreeMode::ALL {
            assert_eq!(mode.to_string().parse::<TreeMode>().ok(), Some(mode));
        }
    }
}
