//! Ledger repository: Postgres-backed [`LedgerStore`].
//!
//! A unit of work is one database transaction. Balance rows are read with
//! `SELECT ... FOR UPDATE`, so concurrent postings on the same account
//! serialize on the row lock and apply in commit order.

use chrono::Utc;
use ledgerbank_core::ledger::{
    LedgerEntryRecord, LedgerError, LedgerStore, LedgerUnitOfWork, NewLedgerEntry,
    NewTransaction, TransactionRecord,
};
use ledgerbank_shared::types::{
    AccountId, LedgerEntryId, Page, PageRequest, TransactionId,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::error;

use crate::entities::{account_balances, accounts, ledger_entries, transactions};

fn storage(err: DbErr) -> LedgerError {
    error!(error = %err, "Ledger storage failure");
    LedgerError::Storage(err.to_string())
}

fn transaction_record(model: transactions::Model) -> TransactionRecord {
    TransactionRecord {
        id: TransactionId::new(model.id),
        source_account_id: AccountId::new(model.account_id),
        kind: model.transaction_type.into(),
        amount: model.amount,
        destination_account_id: model.to_account_id.map(AccountId::new),
        destination_account_number: model.to_account_number,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn entry_record(model: ledger_entries::Model) -> LedgerEntryRecord {
    LedgerEntryRecord {
        id: LedgerEntryId::new(model.id),
        transaction_id: TransactionId::new(model.transaction_id),
        account_id: AccountId::new(model.account_id),
        direction: model.entry_type.into(),
        amount: model.amount,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Ledger repository over a connection pool.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// One database transaction used as a ledger unit of work.
///
/// Dropping it without calling `commit` rolls the transaction back.
pub struct DbUnitOfWork {
    txn: DatabaseTransaction,
}

impl LedgerUnitOfWork for DbUnitOfWork {
    async fn balance_for_update(&mut self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        account_balances::Entity::find_by_id(account_id.into_inner())
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(storage)?
            .map(|row| row.balance)
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    async fn insert_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, LedgerError> {
        let now = Utc::now().into();
        let model = transactions::ActiveModel {
            id: NotSet,
            account_id: Set(transaction.source_account_id.into_inner()),
            transaction_type: Set(transaction.kind.into()),
            amount: Set(transaction.amount),
            to_account_id: Set(transaction.destination_account_id.map(AccountId::into_inner)),
            to_account_number: Set(transaction.destination_account_number),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.txn)
        .await
        .map_err(storage)?;

        Ok(transaction_record(model))
    }

    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntryRecord, LedgerError> {
        let model = ledger_entries::ActiveModel {
            id: NotSet,
            transaction_id: Set(entry.transaction_id.into_inner()),
            account_id: Set(entry.account_id.into_inner()),
            entry_type: Set(entry.direction.into()),
            amount: Set(entry.amount),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.txn)
        .await
        .map_err(storage)?;

        Ok(entry_record(model))
    }

    async fn adjust_balance(&mut self, account_id: AccountId, delta: Decimal) -> Result<(), LedgerError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let result = account_balances::Entity::update_many()
            .col_expr(
                account_balances::Column::Balance,
                Expr::col(account_balances::Column::Balance).add(delta),
            )
            .col_expr(account_balances::Column::UpdatedAt, Expr::value(now))
            .filter(account_balances::Column::AccountId.eq(account_id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(storage)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::AccountNotFound(account_id));
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), LedgerError> {
        self.txn.commit().await.map_err(storage)
    }

    async fn rollback(self) -> Result<(), LedgerError> {
        self.txn.rollback().await.map_err(storage)
    }
}

impl LedgerStore for LedgerRepository {
    type UnitOfWork = DbUnitOfWork;

    async fn begin(&self) -> Result<DbUnitOfWork, LedgerError> {
        let txn = self.db.begin().await.map_err(storage)?;
        Ok(DbUnitOfWork { txn })
    }

    async fn find_account_id_by_number(&self, number: &str) -> Result<Option<AccountId>, LedgerError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(number))
            .one(&self.db)
            .await
            .map_err(storage)?;

        Ok(account.map(|a| AccountId::new(a.id)))
    }

    async fn balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        account_balances::Entity::find_by_id(account_id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(|row| row.balance)
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    async fn find_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        let model = transactions::Entity::find_by_id(transaction_id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;

        Ok(model.map(transaction_record))
    }

    async fn entries_for_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Vec<LedgerEntryRecord>, LedgerError> {
        let rows = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::TransactionId.eq(transaction_id.into_inner()))
            .order_by_asc(ledger_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?;

        Ok(rows.into_iter().map(entry_record).collect())
    }

    async fn list_transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<Page<TransactionRecord>, LedgerError> {
        let query = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id.into_inner()));

        // Get total count first
        let total = query.clone().count(&self.db).await.map_err(storage)?;

        let rows = query
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(storage)?;

        Ok(Page::new(
            rows.into_iter().map(transaction_record).collect(),
            page,
            total,
        ))
    }
}
