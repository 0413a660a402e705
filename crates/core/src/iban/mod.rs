//! IBAN-style account numbers.
//!
//! Numbers have the layout `CCkk BBBB GGGG DD AAAAAAAAAA`:
//! - `CC` country code, `kk` international check digits (MOD-97-10)
//! - `BBBB` bank code, `GGGG` branch code
//! - `DD` domestic check digits (weighted modulo 11)
//! - `AAAAAAAAAA` random account body
//!
//! The codec is pure: randomness is passed in by the caller.

pub mod codec;
pub mod error;
pub mod types;

#[cfg(test)]
mod codec_props;

pub use codec::{ACCOUNT_NUMBER_LENGTH, AccountNumberCodec, BODY_LENGTH};
pub use error::IbanError;
pub use types::{Bban, Iban};
