//! In-process bank store.
//!
//! [`MemoryBank`] implements [`LedgerStore`] and [`AccountStore`] over a single
//! state value behind an async mutex. A unit of work holds the lock for its
//! whole life and writes to a staged copy of the state; commit publishes the
//! copy, rollback or drop discards it. Postings are therefore fully
//! serialized.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use ledgerbank_shared::types::{
    AccountId, ClientId, LedgerEntryId, Page, PageRequest, TransactionId,
};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::account::{Account, AccountError, AccountStore, AccountWithBalance, NewAccount};
use crate::ledger::{
    LedgerEntryRecord, LedgerError, LedgerService, LedgerStore, LedgerUnitOfWork, NewLedgerEntry,
    NewTransaction, TransactionRecord,
};

#[derive(Debug, Clone, Default)]
struct BankState {
    accounts: BTreeMap<AccountId, Account>,
    numbers: HashMap<String, AccountId>,
    balances: HashMap<AccountId, Decimal>,
    transactions: BTreeMap<TransactionId, TransactionRecord>,
    entries: BTreeMap<LedgerEntryId, LedgerEntryRecord>,
    last_account_id: i64,
    last_transaction_id: i64,
    last_entry_id: i64,
}

impl BankState {
    fn with_balance(&self, account: &Account) -> AccountWithBalance {
        AccountWithBalance {
            account: account.clone(),
            balance: self
                .balances
                .get(&account.id)
                .copied()
                .unwrap_or_default(),
        }
    }
}

/// In-memory implementation of every store trait.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryBank {
    state: Arc<Mutex<BankState>>,
}

impl MemoryBank {
    /// Creates an empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry ever posted for `account_id`, in posting order.
    pub async fn entries_for_account(&self, account_id: AccountId) -> Vec<LedgerEntryRecord> {
        self.state
            .lock()
            .await
            .entries
            .values()
            .filter(|entry| entry.account_id == account_id)
            .cloned()
            .collect()
    }

    /// Number of committed transactions.
    pub async fn transaction_count(&self) -> usize {
        self.state.lock().await.transactions.len()
    }
}

/// Unit of work over a staged copy of the bank state.
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<BankState>,
    staged: BankState,
}

impl LedgerUnitOfWork for MemoryUnitOfWork {
    async fn balance_for_update(&mut self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        self.staged
            .balances
            .get(&account_id)
            .copied()
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    async fn insert_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, LedgerError> {
        self.staged.last_transaction_id += 1;
        let now = Utc::now();
        let record = TransactionRecord {
            id: TransactionId::new(self.staged.last_transaction_id),
            source_account_id: transaction.source_account_id,
            kind: transaction.kind,
            amount: transaction.amount,
            destination_account_id: transaction.destination_account_id,
            destination_account_number: transaction.destination_account_number,
            created_at: now,
            updated_at: now,
        };
        self.staged.transactions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntryRecord, LedgerError> {
        if !self.staged.transactions.contains_key(&entry.transaction_id) {
            return Err(LedgerError::TransactionNotFound(entry.transaction_id));
        }
        if !self.staged.accounts.contains_key(&entry.account_id) {
            return Err(LedgerError::AccountNotFound(entry.account_id));
        }

        self.staged.last_entry_id += 1;
        let record = LedgerEntryRecord {
            id: LedgerEntryId::new(self.staged.last_entry_id),
            transaction_id: entry.transaction_id,
            account_id: entry.account_id,
            direction: entry.direction,
            amount: entry.amount,
            created_at: Utc::now(),
        };
        self.staged.entries.insert(record.id, record.clone());
        Ok(record)
    }

    async fn adjust_balance(&mut self, account_id: AccountId, delta: Decimal) -> Result<(), LedgerError> {
        let balance = self
            .staged
            .balances
            .get_mut(&account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        *balance = LedgerService::apply_delta(account_id, *balance, delta)?;
        Ok(())
    }

    async fn commit(self) -> Result<(), LedgerError> {
        let Self { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), LedgerError> {
        Ok(())
    }
}

impl LedgerStore for MemoryBank {
    type UnitOfWork = MemoryUnitOfWork;

    async fn begin(&self) -> Result<MemoryUnitOfWork, LedgerError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryUnitOfWork { guard, staged })
    }

    async fn find_account_id_by_number(&self, number: &str) -> Result<Option<AccountId>, LedgerError> {
        Ok(self.state.lock().await.numbers.get(number).copied())
    }

    async fn balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        self.state
            .lock()
            .await
            .balances
            .get(&account_id)
            .copied()
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    async fn find_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(self.state.lock().await.transactions.get(&transaction_id).cloned())
    }

    async fn entries_for_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Vec<LedgerEntryRecord>, LedgerError> {
        Ok(self
            .state
            .lock()
            .await
            .entries
            .values()
            .filter(|entry| entry.transaction_id == transaction_id)
            .cloned()
            .collect())
    }

    async fn list_transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<Page<TransactionRecord>, LedgerError> {
        let state = self.state.lock().await;

        let mut matching: Vec<&TransactionRecord> = state
            .transactions
            .values()
            .filter(|tx| tx.source_account_id == account_id)
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(Page::new(items, page, total))
    }
}

impl AccountStore for MemoryBank {
    async fn create_account(&self, input: NewAccount) -> Result<Account, AccountError> {
        let mut state = self.state.lock().await;

        if state.numbers.contains_key(&input.account_number) {
            return Err(AccountError::DuplicateNumber(input.account_number));
        }

        state.last_account_id += 1;
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(state.last_account_id),
            owner_id: input.owner_id,
            account_number: input.account_number,
            created_at: now,
            updated_at: now,
        };

        state.numbers.insert(account.account_number.clone(), account.id);
        state.balances.insert(account.id, Decimal::ZERO);
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<AccountWithBalance>, AccountError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .get(&account_id)
            .map(|account| state.with_balance(account)))
    }

    async fn list_by_owner(&self, owner_id: ClientId) -> Result<Vec<AccountWithBalance>, AccountError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .filter(|account| account.owner_id == owner_id)
            .map(|account| state.with_balance(account))
            .collect())
    }

    async fn find_id_by_number(&self, account_number: &str) -> Result<Option<AccountId>, AccountError> {
        Ok(self.state.lock().await.numbers.get(account_number).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{EntryDirection, MAX_AMOUNT, TransactionKind};
    use rust_decimal_macros::dec;

    const NUMBER: &str = "ES0301820600061234567890";

    async fn bank_with_account() -> (MemoryBank, AccountId) {
        let bank = MemoryBank::new();
        let account = bank
            .create_account(NewAccount {
                owner_id: ClientId::new(1),
                account_number: NUMBER.to_string(),
            })
            .await
            .unwrap();
        (bank, account.id)
    }

    fn deposit(account_id: AccountId, amount: Decimal) -> NewTransaction {
        NewTransaction {
            source_account_id: account_id,
            kind: TransactionKind::Add,
            amount,
            destination_account_id: None,
            destination_account_number: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_number_is_rejected() {
        let (bank, _) = bank_with_account().await;
        let err = bank
            .create_account(NewAccount {
                owner_id: ClientId::new(2),
                account_number: NUMBER.to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::DuplicateNumber(NUMBER.to_string()));
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let (bank, account_id) = bank_with_account().await;

        let mut uow = bank.begin().await.unwrap();
        let tx = uow.insert_transaction(deposit(account_id, dec!(25))).await.unwrap();
        uow.insert_entry(NewLedgerEntry {
            transaction_id: tx.id,
            account_id,
            direction: EntryDirection::Credit,
            amount: dec!(25),
        })
        .await
        .unwrap();
        uow.adjust_balance(account_id, dec!(25)).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(bank.balance(account_id).await.unwrap(), dec!(25));
        assert_eq!(bank.entries_for_transaction(tx.id).await.unwrap().len(), 1);
        assert!(bank.find_transaction(tx.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_drop_discards_writes() {
        let (bank, account_id) = bank_with_account().await;

        {
            let mut uow = bank.begin().await.unwrap();
            uow.insert_transaction(deposit(account_id, dec!(5))).await.unwrap();
            uow.adjust_balance(account_id, dec!(5)).await.unwrap();
        }

        assert_eq!(bank.balance(account_id).await.unwrap(), Decimal::ZERO);
        assert_eq!(bank.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_balance_cannot_go_negative() {
        let (bank, account_id) = bank_with_account().await;
        let mut uow = bank.begin().await.unwrap();
        let err = uow.adjust_balance(account_id, dec!(-0.01)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
    }

    #[tokio::test]
    async fn test_balance_overflow_is_a_storage_error() {
        let (bank, account_id) = bank_with_account().await;
        let mut uow = bank.begin().await.unwrap();
        uow.adjust_balance(account_id, MAX_AMOUNT).await.unwrap();

        let err = uow.adjust_balance(account_id, Decimal::MAX).await.unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        let err = uow.adjust_balance(account_id, dec!(0.0001)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
    }

    #[tokio::test]
    async fn test_unknown_balance_is_not_found() {
        let bank = MemoryBank::new();
        assert_eq!(
            bank.balance(AccountId::new(3)).await,
            Err(LedgerError::AccountNotFound(AccountId::new(3)))
        );
    }

    #[tokio::test]
    async fn test_find_account_includes_balance() {
        let (bank, account_id) = bank_with_account().await;
        let found = bank.find_account(account_id).await.unwrap().unwrap();
        assert_eq!(found.account.account_number, NUMBER);
        assert_eq!(found.balance, Decimal::ZERO);
        assert_eq!(
            bank.find_account_id_by_number(NUMBER).await.unwrap(),
            Some(account_id)
        );
    }
}
