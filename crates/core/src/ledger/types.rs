//! Ledger domain types for posting requests, transactions and entries.
//!
//! A posting request is the caller's intent. The engine turns it into one
//! [`TransactionRecord`] plus one or two [`LedgerEntryRecord`]s.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ledgerbank_shared::types::{AccountId, LedgerEntryId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// User-facing transaction type.
///
/// Parsing is case-insensitive: `"add"`, `"Add"` and `" ADD "` all resolve to
/// [`TransactionKind::Add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum TransactionKind {
    /// Deposit into the source account. Never checks funds.
    Add,
    /// Withdrawal from the source account.
    Withdrawal,
    /// Move funds from the source account to a destination account.
    Transfer,
}

impl TransactionKind {
    /// Canonical uppercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Transfer => "TRANSFER",
        }
    }

    /// Direction of the entry posted on the source account.
    #[must_use]
    pub const fn source_direction(self) -> EntryDirection {
        match self {
            Self::Add => EntryDirection::Credit,
            Self::Withdrawal | Self::Transfer => EntryDirection::Debit,
        }
    }

    /// Returns true if the source balance must cover the amount.
    #[must_use]
    pub const fn requires_funds(self) -> bool {
        !matches!(self, Self::Add)
    }

    /// Returns true if this kind moves money to a destination account.
    #[must_use]
    pub const fn has_destination(self) -> bool {
        matches!(self, Self::Transfer)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADD" => Ok(Self::Add),
            "WITHDRAWAL" => Ok(Self::Withdrawal),
            "TRANSFER" => Ok(Self::Transfer),
            _ => Err(LedgerError::InvalidTransactionType(s.to_string())),
        }
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Posting direction of a ledger entry.
///
/// Credits increase the account balance, debits decrease it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryDirection {
    /// Increases the balance.
    Credit,
    /// Decreases the balance.
    Debit,
}

impl EntryDirection {
    /// Returns the other direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Credit => Self::Debit,
            Self::Debit => Self::Credit,
        }
    }

    /// Applies the direction's sign to a positive amount.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }

    /// Canonical uppercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }
}

impl fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound transaction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRequest {
    /// Account the money leaves (or, for `ADD`, enters).
    pub source_account_id: AccountId,
    /// Transaction type.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount to move. Must be strictly positive.
    pub amount: Decimal,
    /// Destination account number. Present iff `kind` is `TRANSFER`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_account_number: Option<String>,
}

impl PostingRequest {
    /// Deposit request.
    #[must_use]
    pub fn add(source_account_id: AccountId, amount: Decimal) -> Self {
        Self {
            source_account_id,
            kind: TransactionKind::Add,
            amount,
            destination_account_number: None,
        }
    }

    /// Withdrawal request.
    #[must_use]
    pub fn withdrawal(source_account_id: AccountId, amount: Decimal) -> Self {
        Self {
            source_account_id,
            kind: TransactionKind::Withdrawal,
            amount,
            destination_account_number: None,
        }
    }

    /// Transfer request to the account holding `destination_account_number`.
    #[must_use]
    pub fn transfer(
        source_account_id: AccountId,
        destination_account_number: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            source_account_id,
            kind: TransactionKind::Transfer,
            amount,
            destination_account_number: Some(destination_account_number.into()),
        }
    }
}

/// Transaction row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Source account.
    pub source_account_id: AccountId,
    /// Transaction type.
    pub kind: TransactionKind,
    /// Positive amount.
    pub amount: Decimal,
    /// Resolved destination account, for transfers.
    pub destination_account_id: Option<AccountId>,
    /// Destination number as supplied by the caller, for transfers.
    pub destination_account_number: Option<String>,
}

/// Persisted transaction, also the outbound transaction result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    /// Transaction id.
    pub id: TransactionId,
    /// Source account.
    pub source_account_id: AccountId,
    /// Transaction type.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Positive amount.
    pub amount: Decimal,
    /// Resolved destination account. Internal only.
    #[serde(skip)]
    pub destination_account_id: Option<AccountId>,
    /// Destination number echoed back to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account_number: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Ledger entry row to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLedgerEntry {
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Affected account.
    pub account_id: AccountId,
    /// Posting direction.
    pub direction: EntryDirection,
    /// Positive amount.
    pub amount: Decimal,
}

/// Persisted ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntryRecord {
    /// Entry id.
    pub id: LedgerEntryId,
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Affected account.
    pub account_id: AccountId,
    /// Posting direction.
    #[serde(rename = "type")]
    pub direction: EntryDirection,
    /// Positive amount.
    pub amount: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntryRecord {
    /// Effect of this entry on the account balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount)
    }
}

/// Stages of a single posting.
///
/// Any failure before `Committed` rolls the unit of work back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingStage {
    /// Request checks and destination resolution.
    Validating,
    /// Balances locked and funds confirmed.
    BalanceChecked,
    /// Transaction row written.
    TransactionPersisted,
    /// Source entry written and source balance adjusted.
    PrimaryEntryPosted,
    /// Destination entry written and destination balance adjusted.
    SecondaryEntryPosted,
    /// Unit of work committed.
    Committed,
}

impl PostingStage {
    /// Snake-case name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::BalanceChecked => "balance_checked",
            Self::TransactionPersisted => "transaction_persisted",
            Self::PrimaryEntryPosted => "primary_entry_posted",
            Self::SecondaryEntryPosted => "secondary_entry_posted",
            Self::Committed => "committed",
        }
    }
}

impl fmt::Display for PostingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a committed posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingOutcome {
    /// The transaction row.
    pub transaction: TransactionRecord,
    /// Entries in posting order: source first, destination second.
    pub entries: Vec<LedgerEntryRecord>,
}
