//! Account domain types.

use chrono::{DateTime, Utc};
use ledgerbank_shared::types::{AccountId, ClientId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bank account. Immutable after opening apart from its timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account id.
    pub id: AccountId,
    /// Owning client.
    #[serde(rename = "client_id")]
    pub owner_id: ClientId,
    /// Codec-generated account number, globally unique.
    pub account_number: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// An account together with its current balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountWithBalance {
    /// The account.
    #[serde(flatten)]
    pub account: Account,
    /// Current balance.
    pub balance: Decimal,
}

/// Account row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Owning client.
    pub owner_id: ClientId,
    /// Freshly composed account number.
    pub account_number: String,
}
