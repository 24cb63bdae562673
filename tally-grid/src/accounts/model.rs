//! Account directory model.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;
use crate::key::{AccountId, InstitutionId};

/// Account taxonomy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Investment,
    Retirement,
    Loan,
    Mortgage,
    Property,
    Cash,
    #[default]
    #[serde(other)]
    Other,
}

impl AccountKind {
    pub const ALL: [AccountKind; 10] = [
        AccountKind::Checking,
        AccountKind::Savings,
        AccountKind::CreditCard,
        AccountKind::Investment,
        AccountKind::Retirement,
        AccountKind::Loan,
        AccountKind::Mortgage,
        AccountKind::Property,
        AccountKind::Cash,
        AccountKind::Other,
    ];

    /// Stable machine tag, as used in the directory file.
    pub fn tag(&self) -> &'static str {
        match self {
            AccountKind::Checking => "checking",
            AccountKind::Savings => "savings",
            AccountKind::CreditCard => "credit_card",
            AccountKind::Investment => "investment",
            AccountKind::Retirement => "retirement",
            AccountKind::Loan => "loan",
            AccountKind::Mortgage => "mortgage",
            AccountKind::Property => "property",
            AccountKind::Cash => "cash",
            AccountKind::Other => "other",
        }
    }

    /// Label for a single account of this kind.
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Checking => "Checking",
            AccountKind::Savings => "Savings",
            AccountKind::CreditCard => "Credit Card",
            AccountKind::Investment => "Investment",
            AccountKind::Retirement => "Retirement",
            AccountKind::Loan => "Loan",
            AccountKind::Mortgage => "Mortgage",
            AccountKind::Property => "Property",
            AccountKind::Cash => "Cash",
            AccountKind::Other => "Other",
        }
    }

    /// Heading for a group of accounts of this kind.
    pub fn group_label(&self) -> &'static str {
        match self {
            AccountKind::Checking => "Checking Accounts",
            AccountKind::Savings => "Savings Accounts",
            AccountKind::CreditCard => "Credit Cards",
            AccountKind::Investment => "Investments",
            AccountKind::Retirement => "Retirement",
            AccountKind::Loan => "Loans",
            AccountKind::Mortgage => "Mortgages",
            AccountKind::Property => "Property",
            AccountKind::Cash => "Cash",
            AccountKind::Other => "Other",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An account from the account directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    #[serde(default)]
    pub parent_id: Option<AccountId>,
    #[serde(default)]
    pub kind: AccountKind,
    #[serde(default)]
    pub institution_id: Option<InstitutionId>,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Account {
    /// Create an open account with no parent and no institution.
    pub fn new(id: impl Into<AccountId>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            kind,
            institution_id: None,
            name: name.into(),
            closed: false,
            notes: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<AccountId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_institution(mut self, institution: InstitutionId) -> Self {
        self.institution_id = Some(institution);
        self
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A financial institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
}

/// The account directory as delivered by the accounts service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountDirectory {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub institutions: Vec<Institution>,
}

impl AccountDirectory {
    /// Parse a directory from JSON.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a directory file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| DirectoryError::io(path, e))?;
        let directory = Self::from_json(&json)?;
        log::debug!(
            "loaded {} accounts and {} institutions from {}",
            directory.accounts.len(),
            directory.institutions.len(),
            path.display()
        );
        Ok(directory)
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn institution_name(&self, id: InstitutionId) -> Option<&str> {
        self.institutions
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.name.as_str())
    }
}
