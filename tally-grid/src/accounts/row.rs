//! Row payload used by account tables.

use std::sync::Arc;

use crate::column::Snapshot;
use crate::key::{AccountId, RowKey};

use super::builder::{GroupNode, NodeSource};
use super::columns::note_key;
use super::model::Account;
use super::series::{BalanceSeries, value_at};

/// Payload of a row in an account table.
#[derive(Debug, Clone)]
pub enum AccountRow {
    /// A real account with its balance history, if any.
    Account {
        account: Account,
        series: Option<Arc<[f64]>>,
    },
    /// A synthetic grouping row.
    Group(GroupNode),
    /// A free-text detail row attached below an account.
    Note { account: AccountId, text: String },
}

impl AccountRow {
    /// Create the payload for a builder node, merging in its balances.
    pub fn from_source(source: NodeSource<'_>, balances: &BalanceSeries) -> Self {
        match source {
            NodeSource::Account(account) => AccountRow::Account {
                account: account.clone(),
                series: balances.series(account.id),
            },
            NodeSource::Group(group) => AccountRow::Group(group.clone()),
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            AccountRow::Account { account, .. } => &account.name,
            AccountRow::Group(group) => &group.name,
            AccountRow::Note { text, .. } => text,
        }
    }

    /// Key of the row this payload belongs to.
    pub fn key(&self) -> RowKey {
        match self {
            AccountRow::Account { account, .. } => RowKey::account(account.id),
            AccountRow::Group(group) => group.key,
            AccountRow::Note { account, .. } => note_key(RowKey::account(*account)),
        }
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            AccountRow::Account { account, .. } => Some(account),
            _ => None,
        }
    }

    /// The row's own balance at `snapshot`.
    ///
    /// `None` for rows without a balance of their own (groups, notes and
    /// accounts with no history); NaN for gaps in an account's history.
    pub fn balance(&self, snapshot: Snapshot) -> Option<f64> {
        match self {
            AccountRow::Account {
                series: Some(series),
                ..
            } => Some(value_at(series, snapshot)),
            _ => None,
        }
    }
}
