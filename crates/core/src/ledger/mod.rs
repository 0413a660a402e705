//! Double-entry posting.
//!
//! This module implements the ledger:
//! - Domain types for posting requests, transactions and entries
//! - Error types for ledger operations
//! - Pure validation and planning rules
//! - Store traits the persistence layer implements
//! - The posting engine that runs one unit of work per request

pub mod engine;
pub mod error;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::{DEFAULT_POSTING_TIMEOUT, LedgerEngine};
pub use error::LedgerError;
pub use service::{AMOUNT_SCALE, LedgerService, MAX_AMOUNT, PostingLeg};
pub use store::{LedgerStore, LedgerUnitOfWork};
pub use types::{
    EntryDirection, LedgerEntryRecord, NewLedgerEntry, NewTransaction, PostingOutcome,
    PostingRequest, PostingStage, TransactionKind, TransactionRecord,
};
