//! Repository implementations for data access.
//!
//! Each repository implements a core store trait over a `SeaORM` connection.

pub mod account;
pub mod ledger;

pub use account::AccountRepository;
pub use ledger::{DbUnitOfWork, LedgerRepository};
