//! BBAN and IBAN value types.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::codec::{ACCOUNT_NUMBER_LENGTH, AccountNumberCodec};
use super::error::IbanError;

/// Basic Bank Account Number: `BBBB GGGG DD AAAAAAAAAA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bban {
    pub(crate) bank_code: String,
    pub(crate) branch_code: String,
    pub(crate) domestic_check: String,
    pub(crate) body: String,
}

impl Bban {
    /// Four-digit bank code.
    #[must_use]
    pub fn bank_code(&self) -> &str {
        &self.bank_code
    }

    /// Four-digit branch code.
    #[must_use]
    pub fn branch_code(&self) -> &str {
        &self.branch_code
    }

    /// Two domestic check digits.
    #[must_use]
    pub fn domestic_check(&self) -> &str {
        &self.domestic_check
    }

    /// Ten-digit account body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for Bban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.bank_code, self.branch_code, self.domestic_check, self.body
        )
    }
}

/// Full account number: country code, international check digits and BBAN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Iban {
    pub(crate) country_code: String,
    pub(crate) check_digits: String,
    pub(crate) bban: Bban,
}

impl Iban {
    /// Splits a number into its fields by fixed offsets without checking digits.
    ///
    /// Only the structure is validated: exact length, an uppercase two-letter
    /// country and decimal digits everywhere else.
    pub(crate) fn split(number: &str) -> Result<Self, IbanError> {
        if number.len() != ACCOUNT_NUMBER_LENGTH || !number.is_ascii() {
            return Err(IbanError::InvalidInputLength {
                field: "account_number",
                expected: ACCOUNT_NUMBER_LENGTH,
                actual: number.chars().count(),
            });
        }

        let country_code = &number[0..2];
        if !country_code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(IbanError::InvalidCountryCode(country_code.to_string()));
        }
        if !number[2..].bytes().all(|b| b.is_ascii_digit()) {
            return Err(IbanError::InvalidDigit {
                field: "account_number",
                value: number.to_string(),
            });
        }

        Ok(Self {
            country_code: country_code.to_string(),
            check_digits: number[2..4].to_string(),
            bban: Bban {
                bank_code: number[4..8].to_string(),
                branch_code: number[8..12].to_string(),
                domestic_check: number[12..14].to_string(),
                body: number[14..].to_string(),
            },
        })
    }

    /// Two-letter country code.
    #[must_use]
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Two international check digits.
    #[must_use]
    pub fn check_digits(&self) -> &str {
        &self.check_digits
    }

    /// The embedded BBAN.
    #[must_use]
    pub fn bban(&self) -> &Bban {
        &self.bban
    }
}

impl fmt::Display for Iban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.country_code, self.check_digits, self.bban)
    }
}

impl FromStr for Iban {
    type Err = IbanError;

    /// Parses and fully verifies an account number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let iban = Self::split(s)?;
        if !AccountNumberCodec::verify(s) {
            return Err(IbanError::ChecksumMismatch(s.to_string()));
        }
        Ok(iban)
    }
}

impl Serialize for Iban {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
