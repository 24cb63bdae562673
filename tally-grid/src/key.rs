//! Row identity.
//!
//! Every row in a table carries a [`RowKey`] that is unique across the whole
//! tree, not only among siblings. The same key is used for expand/collapse
//! state and as the row's rendering identity across rebuilds, so keys must
//! be stable when the tree is rebuilt from fresh data.
//!
//! Real accounts map to non-negative keys. Synthetic grouping nodes map to
//! strictly negative keys derived from a hash of their grouping label, so the
//! two namespaces can never collide and a group keeps its key for as long as
//! its grouping value exists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identifier of an account in the account directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u32);

impl AccountId {
    /// Returns the inner value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for AccountId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an institution (bank, broker, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstitutionId(pub u32);

impl fmt::Display for InstitutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tree-wide unique, rebuild-stable key of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(i64);

impl RowKey {
    /// Key of a row backed by a real account.
    pub fn account(id: AccountId) -> Self {
        Self(i64::from(id.0))
    }

    /// Key of a synthetic row identified by `namespace` and `value`.
    ///
    /// The result depends only on its inputs, so the same grouping value
    /// yields the same key on every rebuild and every run.
    pub fn synthetic(namespace: &str, value: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(namespace.as_bytes());
        hasher.update([0u8]);
        hasher.update(value.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let bits = u64::from_be_bytes(bytes) & (i64::MAX as u64);
        // bits is in [0, i64::MAX], so -1 - bits is in [i64::MIN, -1].
        Self(-1 - bits as i64)
    }

    /// Create a key from a raw value.
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub fn raw(&self) -> i64 {
        self.0
    }

    /// Whether this key belongs to a synthetic (grouping) row.
    pub fn is_synthetic(&self) -> bool {
        self.0 < 0
    }

    /// The account id behind this key, if it is not synthetic.
    pub fn account_id(&self) -> Option<AccountId> {
        u32::try_from(self.0).ok().map(AccountId)
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RowKey {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl From<AccountId> for RowKey {
    fn from(id: AccountId) -> Self {
        Self::account(id)
    }
}
