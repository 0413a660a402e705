//! Ledger error types for posting, balance and history operations.

use std::time::Duration;

use ledgerbank_shared::types::{AccountId, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::TransactionKind;
use crate::error::ErrorKind;
use crate::iban::IbanError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Lookup Errors ==========
    /// Source account (or its balance row) does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// No account holds the destination number.
    #[error("Destination account not found: {0}")]
    DestinationNotFound(String),

    /// Transaction does not exist.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    // ========== Business Rule Errors ==========
    /// Balance does not cover the withdrawal or transfer.
    #[error("Insufficient funds in account {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account that was charged.
        account_id: AccountId,
        /// Balance at the time of the check.
        balance: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    // ========== Validation Errors ==========
    /// Amount cannot be zero.
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Amount cannot be negative.
    #[error("Amount cannot be negative")]
    NegativeAmount,

    /// Amount carries more decimal places than a balance keeps.
    #[error("Amount {amount} has {scale} decimal places, at most 4 allowed")]
    ExcessivePrecision {
        /// Requested amount.
        amount: Decimal,
        /// Its decimal places, ignoring trailing zeros.
        scale: u32,
    },

    /// Amount above the largest storable value.
    #[error("Amount {0} exceeds the maximum of 999999999999999.9999")]
    AmountTooLarge(Decimal),

    /// Unknown transaction type string.
    #[error("Invalid transaction type: {0:?}")]
    InvalidTransactionType(String),

    /// Transfer without a destination account number.
    #[error("Transfer requires a destination account number")]
    MissingDestination,

    /// Destination account number on a non-transfer request.
    #[error("{0} transactions cannot have a destination account")]
    UnexpectedDestination(TransactionKind),

    /// Transfer whose destination is the source account.
    #[error("Cannot transfer from account {0} to itself")]
    SameAccountTransfer(AccountId),

    /// Account number fails check-digit verification.
    #[error("Invalid account number: {0}")]
    InvalidAccountNumber(String),

    /// Account number codec rejected its input.
    #[error(transparent)]
    Codec(#[from] IbanError),

    /// Page or page size below 1.
    #[error("Invalid page request: page {page}, page size {page_size}")]
    InvalidPage {
        /// Requested page.
        page: u32,
        /// Requested page size.
        page_size: u32,
    },

    // ========== Storage Errors ==========
    /// Posting did not finish before its deadline and was rolled back.
    #[error("Posting deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// Underlying unit-of-work failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) | Self::DestinationNotFound(_) | Self::TransactionNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::ZeroAmount
            | Self::NegativeAmount
            | Self::ExcessivePrecision { .. }
            | Self::AmountTooLarge(_)
            | Self::InvalidTransactionType(_)
            | Self::MissingDestination
            | Self::UnexpectedDestination(_)
            | Self::SameAccountTransfer(_)
            | Self::InvalidAccountNumber(_)
            | Self::Codec(_)
            | Self::InvalidPage { .. } => ErrorKind::InvalidInput,
            Self::DeadlineExceeded(_) | Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DestinationNotFound(_) => "DESTINATION_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::ExcessivePrecision { .. } => "EXCESSIVE_PRECISION",
            Self::AmountTooLarge(_) => "AMOUNT_TOO_LARGE",
            Self::InvalidTransactionType(_) => "INVALID_TRANSACTION_TYPE",
            Self::MissingDestination => "MISSING_DESTINATION",
            Self::UnexpectedDestination(_) => "UNEXPECTED_DESTINATION",
            Self::SameAccountTransfer(_) => "SAME_ACCOUNT_TRANSFER",
            Self::InvalidAccountNumber(_) => "INVALID_ACCOUNT_NUMBER",
            Self::Codec(err) => err.error_code(),
            Self::InvalidPage { .. } => "INVALID_PAGE",
            Self::DeadlineExceeded(_) => "DEADLINE_EXCEEDED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        self.kind().http_status_code()
    }

    /// Returns true if the posting was rejected by a business rule rather
    /// than by bad input or a storage fault.
    #[must_use]
    pub const fn is_business_rule(&self) -> bool {
        matches!(self.kind(), ErrorKind::InsufficientFunds)
    }
}
