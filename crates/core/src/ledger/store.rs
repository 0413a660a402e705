//! Persistence traits for the ledger.
//!
//! These traits are implemented by the db crate on Postgres and by
//! [`crate::memory::MemoryBank`] in-process.

use ledgerbank_shared::types::{AccountId, Page, PageRequest, TransactionId};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{LedgerEntryRecord, NewLedgerEntry, NewTransaction, TransactionRecord};

/// Read side of the ledger plus the entry point to a unit of work.
pub trait LedgerStore: Send + Sync {
    /// Atomic unit of work handed out by [`LedgerStore::begin`].
    type UnitOfWork: LedgerUnitOfWork;

    /// Opens a unit of work.
    fn begin(&self) -> impl std::future::Future<Output = Result<Self::UnitOfWork, LedgerError>> + Send;

    /// Resolves an account number to its account id.
    fn find_account_id_by_number(
        &self,
        number: &str,
    ) -> impl std::future::Future<Output = Result<Option<AccountId>, LedgerError>> + Send;

    /// Reads a balance outside any unit of work.
    ///
    /// Fails with `AccountNotFound` if the account has no balance row.
    fn balance(
        &self,
        account_id: AccountId,
    ) -> impl std::future::Future<Output = Result<Decimal, LedgerError>> + Send;

    /// Fetches a transaction by id.
    fn find_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> impl std::future::Future<Output = Result<Option<TransactionRecord>, LedgerError>> + Send;

    /// Lists the entries of a transaction ordered by entry id.
    fn entries_for_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> impl std::future::Future<Output = Result<Vec<LedgerEntryRecord>, LedgerError>> + Send;

    /// Lists transactions whose source is `account_id`, newest first.
    fn list_transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<Page<TransactionRecord>, LedgerError>> + Send;
}

/// All-or-nothing group of ledger writes.
///
/// Nothing written through a unit of work is visible to other readers until
/// [`LedgerUnitOfWork::commit`] succeeds. Dropping a unit of work without
/// committing discards its writes.
pub trait LedgerUnitOfWork: Send {
    /// Reads a balance and holds it against concurrent mutation until the
    /// unit of work ends.
    ///
    /// Fails with `AccountNotFound` if the account has no balance row.
    fn balance_for_update(
        &mut self,
        account_id: AccountId,
    ) -> impl std::future::Future<Output = Result<Decimal, LedgerError>> + Send;

    /// Inserts the transaction row, assigning its id and timestamps.
    fn insert_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> impl std::future::Future<Output = Result<TransactionRecord, LedgerError>> + Send;

    /// Appends a ledger entry.
    fn insert_entry(
        &mut self,
        entry: NewLedgerEntry,
    ) -> impl std::future::Future<Output = Result<LedgerEntryRecord, LedgerError>> + Send;

    /// Applies `balance += delta`.
    fn adjust_balance(
        &mut self,
        account_id: AccountId,
        delta: Decimal,
    ) -> impl std::future::Future<Output = Result<(), LedgerError>> + Send;

    /// Publishes every write of this unit of work.
    fn commit(self) -> impl std::future::Future<Output = Result<(), LedgerError>> + Send;

    /// Discards every write of this unit of work.
    fn rollback(self) -> impl std::future::Future<Output = Result<(), LedgerError>> + Send;
}
