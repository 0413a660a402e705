//! Account error types.

use ledgerbank_shared::types::{AccountId, ClientId};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::iban::IbanError;

/// Account-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Client has no accounts.
    #[error("Client {0} has no accounts")]
    OwnerHasNoAccounts(ClientId),

    /// No account holds this number.
    #[error("No account with number {0}")]
    NumberNotFound(String),

    /// Account number fails check-digit verification.
    #[error("Invalid account number: {0}")]
    InvalidAccountNumber(String),

    /// Account number already taken. Retryable with a fresh number.
    #[error("Account number already exists: {0}")]
    DuplicateNumber(String),

    /// Every composed number collided with an existing account.
    #[error("Could not allocate a unique account number after {0} attempts")]
    NumberSpaceExhausted(u32),

    /// Account number composition failed.
    #[error(transparent)]
    Iban(#[from] IbanError),

    /// Underlying storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AccountError {
    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::OwnerHasNoAccounts(_) | Self::NumberNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::InvalidAccountNumber(_) | Self::Iban(_) => ErrorKind::InvalidInput,
            Self::DuplicateNumber(_) | Self::NumberSpaceExhausted(_) | Self::Storage(_) => {
                ErrorKind::Storage
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::OwnerHasNoAccounts(_) => "OWNER_HAS_NO_ACCOUNTS",
            Self::NumberNotFound(_) => "ACCOUNT_NUMBER_NOT_FOUND",
            Self::InvalidAccountNumber(_) => "INVALID_ACCOUNT_NUMBER",
            Self::DuplicateNumber(_) => "DUPLICATE_ACCOUNT_NUMBER",
            Self::NumberSpaceExhausted(_) => "ACCOUNT_NUMBER_EXHAUSTED",
            Self::Iban(err) => err.error_code(),
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        self.kind().http_status_code()
    }

    /// Returns true if retrying with a freshly composed number may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DuplicateNumber(_))
    }
}
