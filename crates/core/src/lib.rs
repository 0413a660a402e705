//! Core business logic for LedgerBank.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the store traits, which the db crate
//! implements on top of Postgres and [`memory::MemoryBank`] implements in-process.
//!
//! # Modules
//!
//! - `iban` - Account number generation and verification (MOD-97-10)
//! - `ledger` - Double-entry posting engine
//! - `account` - Account opening
//! - `memory` - In-process store used by tests and local runs

pub mod account;
pub mod error;
pub mod iban;
pub mod ledger;
pub mod memory;

pub use error::ErrorKind;
