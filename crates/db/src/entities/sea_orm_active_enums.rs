//! `SeaORM` active enums mirroring the Postgres enum types.

use ledgerbank_core::ledger::{EntryDirection, TransactionKind};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    #[sea_orm(string_value = "ADD")]
    Add,
    #[sea_orm(string_value = "WITHDRAWAL")]
    Withdrawal,
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_type")]
pub enum EntryType {
    #[sea_orm(string_value = "CREDIT")]
    Credit,
    #[sea_orm(string_value = "DEBIT")]
    Debit,
}

impl From<TransactionKind> for TransactionType {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Add => Self::Add,
            TransactionKind::Withdrawal => Self::Withdrawal,
            TransactionKind::Transfer => Self::Transfer,
        }
    }
}

impl From<TransactionType> for TransactionKind {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Add => Self::Add,
            TransactionType::Withdrawal => Self::Withdrawal,
            TransactionType::Transfer => Self::Transfer,
        }
    }
}

impl From<EntryDirection> for EntryType {
    fn from(direction: EntryDirection) -> Self {
        match direction {
            EntryDirection::Credit => Self::Credit,
            EntryDirection::Debit => Self::Debit,
        }
    }
}

impl From<EntryType> for EntryDirection {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::Credit => Self::Credit,
            EntryType::Debit => Self::Debit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_conversions_round_trip() {
        for kind in [
            TransactionKind::Add,
            TransactionKind::Withdrawal,
            TransactionKind::Transfer,
        ] {
            assert_eq!(TransactionKind::from(TransactionType::from(kind)), kind);
        }
        for direction in [EntryDirection::Credit, EntryDirection::Debit] {
            assert_eq!(EntryDirection::from(EntryType::from(direction)), direction);
        }
    }

    #[test]
    fn test_db_values_match_core_names() {
        assert_eq!(TransactionType::Withdrawal.to_value(), "WITHDRAWAL");
        assert_eq!(EntryType::Debit.to_value(), EntryDirection::Debit.as_str());
    }
}
