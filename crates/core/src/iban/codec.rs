//! Account number composition and verification.
//!
//! Domestic check digits use weighted modulo-11 sums:
//! - bank + branch (`BBBBGGGG`) with weights `[1, 2, 4, 8, 5, 10, 9, 7]`
//! - account body (`AAAAAAAAAA`) with weights `[1, 2, 4, 8, 5, 10, 9, 7, 3, 6]`
//!
//! Each digit is `11 - (sum mod 11)`, with 11 mapped to 0 and 10 mapped to 1.
//!
//! International check digits use MOD-97-10 over `BBAN ‖ country ‖ "00"` with
//! letters re-based to two-digit numerals (A=10 … Z=35).

use ledgerbank_shared::config::BankConfig;
use rand::Rng;

use super::error::IbanError;
use super::types::{Bban, Iban};

/// Length of the bank code.
pub const BANK_CODE_LENGTH: usize = 4;
/// Length of the branch code.
pub const BRANCH_CODE_LENGTH: usize = 4;
/// Length of the random account body.
pub const BODY_LENGTH: usize = 10;
/// Total length of a composed account number.
pub const ACCOUNT_NUMBER_LENGTH: usize = 24;

const BANK_BRANCH_WEIGHTS: [u32; BANK_CODE_LENGTH + BRANCH_CODE_LENGTH] =
    [1, 2, 4, 8, 5, 10, 9, 7];
const BODY_WEIGHTS: [u32; BODY_LENGTH] = [1, 2, 4, 8, 5, 10, 9, 7, 3, 6];

/// Digits per long-division step; remainder (≤ 2 digits) + 9 digits fits in `u64`.
const MOD97_CHUNK: usize = 9;

/// Issues and verifies account numbers for one bank branch.
///
/// The bank code, branch code and country code are fixed at construction;
/// only the account body varies between issued numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNumberCodec {
    bank_code: String,
    branch_code: String,
    country_code: String,
}

impl AccountNumberCodec {
    /// Creates a codec for the given bank, branch and country.
    ///
    /// # Errors
    ///
    /// Returns an error if the bank or branch code is not four digits or the
    /// country code is not two uppercase letters.
    pub fn new(
        bank_code: impl Into<String>,
        branch_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Result<Self, IbanError> {
        let bank_code = bank_code.into();
        let branch_code = branch_code.into();
        let country_code = country_code.into();

        parse_digits("bank_code", &bank_code, BANK_CODE_LENGTH)?;
        parse_digits("branch_code", &branch_code, BRANCH_CODE_LENGTH)?;
        validate_country_code(&country_code)?;

        Ok(Self {
            bank_code,
            branch_code,
            country_code,
        })
    }

    /// Creates a codec from the configured bank constants.
    pub fn from_config(bank: &BankConfig) -> Result<Self, IbanError> {
        Self::new(
            bank.bank_code.clone(),
            bank.branch_code.clone(),
            bank.country_code.clone(),
        )
    }

    /// Bank code used for every issued number.
    #[must_use]
    pub fn bank_code(&self) -> &str {
        &self.bank_code
    }

    /// Branch code used for every issued number.
    #[must_use]
    pub fn branch_code(&self) -> &str {
        &self.branch_code
    }

    /// Country code used for every issued number.
    #[must_use]
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Draws a string of `length` decimal digits from `rng`.
    pub fn generate_body<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
        (0..length)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect()
    }

    /// Computes the two domestic check digits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInputLength` if a field does not match its weight vector
    /// and `InvalidDigit` if a field contains a non-digit.
    pub fn domestic_check_digits(
        bank_code: &str,
        branch_code: &str,
        body: &str,
    ) -> Result<String, IbanError> {
        let mut bank_branch = parse_digits("bank_code", bank_code, BANK_CODE_LENGTH)?;
        bank_branch.extend(parse_digits("branch_code", branch_code, BRANCH_CODE_LENGTH)?);
        let body = parse_digits("body", body, BODY_LENGTH)?;

        let first = weighted_check_digit(&bank_branch, &BANK_BRANCH_WEIGHTS);
        let second = weighted_check_digit(&body, &BODY_WEIGHTS);

        Ok(format!("{first}{second}"))
    }

    /// Computes the two international check digits for `bban` in `country_code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the country code is malformed or the BBAN holds a
    /// character outside `0-9A-Z`.
    pub fn international_check_digits(
        bban: &str,
        country_code: &str,
    ) -> Result<String, IbanError> {
        validate_country_code(country_code)?;

        let numeral = numeric_form(&format!("{bban}{country_code}00"))?;
        // remainder is at most 96, so the result stays within 2..=98
        let check = 98 - mod97(&numeral);

        Ok(format!("{check:02}"))
    }

    /// Composes a fresh account number with a random body.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLength` if the composed number is not exactly
    /// [`ACCOUNT_NUMBER_LENGTH`] characters.
    pub fn compose<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Iban, IbanError> {
        let body = Self::generate_body(rng, BODY_LENGTH);
        self.compose_with_body(body)
    }

    /// Composes an account number around a caller-supplied body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not ten digits or the composed number
    /// is not exactly [`ACCOUNT_NUMBER_LENGTH`] characters.
    pub fn compose_with_body(&self, body: String) -> Result<Iban, IbanError> {
        let domestic_check =
            Self::domestic_check_digits(&self.bank_code, &self.branch_code, &body)?;

        let bban = Bban {
            bank_code: self.bank_code.clone(),
            branch_code: self.branch_code.clone(),
            domestic_check,
            body,
        };
        let check_digits =
            Self::international_check_digits(&bban.to_string(), &self.country_code)?;

        let iban = Iban {
            country_code: self.country_code.clone(),
            check_digits,
            bban,
        };

        let length = iban.to_string().len();
        if length != ACCOUNT_NUMBER_LENGTH {
            return Err(IbanError::InvalidLength(length));
        }

        Ok(iban)
    }

    /// Returns true if both check-digit pairs embedded in `number` match the
    /// values recomputed from its other fields.
    ///
    /// Malformed input of any kind yields `false`.
    #[must_use]
    pub fn verify(number: &str) -> bool {
        let Ok(iban) = Iban::split(number) else {
            return false;
        };
        let bban = &iban.bban;

        let domestic =
            Self::domestic_check_digits(&bban.bank_code, &bban.branch_code, &bban.body);
        if domestic.as_deref() != Ok(bban.domestic_check.as_str()) {
            return false;
        }

        Self::international_check_digits(&bban.to_string(), &iban.country_code)
            .is_ok_and(|check| check == iban.check_digits)
    }
}

fn validate_country_code(country_code: &str) -> Result<(), IbanError> {
    if country_code.len() == 2 && country_code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(IbanError::InvalidCountryCode(country_code.to_string()))
    }
}

fn parse_digits(field: &'static str, value: &str, expected: usize) -> Result<Vec<u32>, IbanError> {
    if value.chars().count() != expected {
        return Err(IbanError::InvalidInputLength {
            field,
            expected,
            actual: value.chars().count(),
        });
    }

    value
        .chars()
        .map(|c| {
            c.to_digit(10).ok_or_else(|| IbanError::InvalidDigit {
                field,
                value: value.to_string(),
            })
        })
        .collect()
}

fn weighted_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();

    match 11 - sum % 11 {
        11 => 0,
        10 => 1,
        digit => digit,
    }
}

/// Re-bases letters to two-digit numerals, leaving digits untouched.
fn numeric_form(input: &str) -> Result<String, IbanError> {
    let mut numeral = String::with_capacity(input.len() * 2);

    for c in input.chars() {
        match c {
            '0'..='9' => numeral.push(c),
            'A'..='Z' => numeral.push_str(&(u32::from(c) - u32::from('A') + 10).to_string()),
            other => return Err(IbanError::InvalidCharacter(other)),
        }
    }

    Ok(numeral)
}

/// Reduces an all-digit numeral modulo 97 by chunked long division.
///
/// Each step prefixes the running remainder to the next chunk of digits.
fn mod97(numeral: &str) -> u64 {
    numeral
        .as_bytes()
        .chunks(MOD97_CHUNK)
        .fold(0, |remainder, chunk| {
            let value = chunk
                .iter()
                .fold(remainder, |acc, digit| acc * 10 + u64::from(digit - b'0'));
            value % 97
        })
}
