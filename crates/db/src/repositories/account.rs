//! Account repository: Postgres-backed [`AccountStore`].

use chrono::Utc;
use ledgerbank_core::account::{Account, AccountError, AccountStore, AccountWithBalance, NewAccount};
use ledgerbank_shared::types::{AccountId, ClientId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, error};

use crate::entities::{account_balances, accounts};

fn storage(err: DbErr) -> AccountError {
    error!(error = %err, "Account storage failure");
    AccountError::Storage(err.to_string())
}

fn account(model: accounts::Model) -> Account {
    Account {
        id: AccountId::new(model.id),
        owner_id: ClientId::new(model.client_id),
        account_number: model.account_number,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn with_balance(
    (model, balance): (accounts::Model, Option<account_balances::Model>),
) -> AccountWithBalance {
    AccountWithBalance {
        account: account(model),
        balance: balance.map_or(Decimal::ZERO, |b| b.balance),
    }
}

/// Account repository for opening and looking up accounts.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl AccountStore for AccountRepository {
    async fn create_account(&self, input: NewAccount) -> Result<Account, AccountError> {
        let txn = self.db.begin().await.map_err(storage)?;

        let now = Utc::now().into();
        let inserted = accounts::ActiveModel {
            id: NotSet,
            client_id: Set(input.owner_id.into_inner()),
            account_number: Set(input.account_number.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await;

        let model = match inserted {
            Ok(model) => model,
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(account_number = %input.account_number, "Account number already taken");
                return Err(AccountError::DuplicateNumber(input.account_number));
            }
            Err(err) => return Err(storage(err)),
        };

        account_balances::ActiveModel {
            account_id: Set(model.id),
            balance: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(storage)?;

        txn.commit().await.map_err(storage)?;

        Ok(account(model))
    }

    async fn find_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<AccountWithBalance>, AccountError> {
        let row = accounts::Entity::find_by_id(account_id.into_inner())
            .find_also_related(account_balances::Entity)
            .one(&self.db)
            .await
            .map_err(storage)?;

        Ok(row.map(with_balance))
    }

    async fn list_by_owner(&self, owner_id: ClientId) -> Result<Vec<AccountWithBalance>, AccountError> {
        let rows = accounts::Entity::find()
            .filter(accounts::Column::ClientId.eq(owner_id.into_inner()))
            .order_by_asc(accounts::Column::Id)
            .find_also_related(account_balances::Entity)
            .all(&self.db)
            .await
            .map_err(storage)?;

        Ok(rows.into_iter().map(with_balance).collect())
    }

    async fn find_id_by_number(&self, account_number: &str) -> Result<Option<AccountId>, AccountError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(account_number))
            .one(&self.db)
            .await
            .map_err(storage)?;

        Ok(model.map(|m| AccountId::new(m.id)))
    }
}
