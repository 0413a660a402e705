//! Error classification shared by every core error type.

use serde::Serialize;

/// Coarse error category that the boundary layer maps to a response.
///
/// Every core error enum exposes `kind()` so callers can tell business-rule
/// rejections (`InsufficientFunds`) apart from system faults (`Storage`)
/// without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Account, destination or transaction is missing.
    NotFound,
    /// Withdrawal or transfer exceeds the available balance.
    InsufficientFunds,
    /// Bad amount, type, account number, page or codec input.
    InvalidInput,
    /// Underlying unit-of-work failure.
    Storage,
}

impl ErrorKind {
    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn http_status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::InvalidInput => 400,
            Self::InsufficientFunds => 409,
            Self::Storage => 500,
        }
    }
}
