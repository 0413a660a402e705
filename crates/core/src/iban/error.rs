//! Account number codec errors.

use thiserror::Error;

use crate::error::ErrorKind;

/// Errors produced while composing or parsing account numbers.
///
/// All of them are local input problems; none is a storage fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IbanError {
    /// A digit string does not have the length its weight vector requires.
    #[error("{field} must be {expected} characters long, got {actual}")]
    InvalidInputLength {
        /// Name of the offending field.
        field: &'static str,
        /// Required length.
        expected: usize,
        /// Length received.
        actual: usize,
    },

    /// A field that must be all decimal digits contains something else.
    #[error("{field} must contain only digits: {value:?}")]
    InvalidDigit {
        /// Name of the offending field.
        field: &'static str,
        /// The value received.
        value: String,
    },

    /// Country code is not two uppercase ASCII letters.
    #[error("Invalid country code: {0:?}")]
    InvalidCountryCode(String),

    /// Character outside `0-9A-Z` in a MOD-97-10 input.
    #[error("Invalid character {0:?} in account number")]
    InvalidCharacter(char),

    /// The composed number is not the fixed structural length.
    #[error("Generated account number has invalid length: {0}")]
    InvalidLength(usize),

    /// Parsed number whose check digits do not match its contents.
    #[error("Account number check digits do not match: {0}")]
    ChecksumMismatch(String),
}

impl IbanError {
    /// Codec errors are always input errors.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInputLength { .. } => "INVALID_INPUT_LENGTH",
            Self::InvalidDigit { .. } => "INVALID_DIGIT",
            Self::InvalidCountryCode(_) => "INVALID_COUNTRY_CODE",
            Self::InvalidCharacter(_) => "INVALID_CHARACTER",
            Self::InvalidLength(_) => "INVALID_LENGTH",
            Self::ChecksumMismatch(_) => "CHECKSUM_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IbanError::InvalidInputLength {
            field: "body",
            expected: 10,
            actual: 9,
        };
        assert_eq!(err.to_string(), "body must be 10 characters long, got 9");
        assert_eq!(
            IbanError::InvalidLength(23).to_string(),
            "Generated account number has invalid length: 23"
        );
    }

    #[test]
    fn test_every_codec_error_is_invalid_input() {
        assert_eq!(IbanError::InvalidCharacter('*').kind(), ErrorKind::InvalidInput);
        assert_eq!(IbanError::InvalidLength(3).kind().http_status_code(), 400);
        assert_eq!(
            IbanError::ChecksumMismatch("ES00".into()).error_code(),
            "CHECKSUM_MISMATCH"
        );
    }
}
