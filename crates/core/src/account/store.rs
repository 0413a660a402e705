//! Persistence trait for accounts.

use ledgerbank_shared::types::{AccountId, ClientId};

use super::error::AccountError;
use super::types::{Account, AccountWithBalance, NewAccount};

/// Repository trait for account persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait AccountStore: Send + Sync {
    /// Inserts the account and its zero balance in one unit of work.
    ///
    /// Fails with `DuplicateNumber` if the number is already taken.
    fn create_account(
        &self,
        input: NewAccount,
    ) -> impl std::future::Future<Output = Result<Account, AccountError>> + Send;

    /// Find account by ID, with its balance.
    fn find_account(
        &self,
        account_id: AccountId,
    ) -> impl std::future::Future<Output = Result<Option<AccountWithBalance>, AccountError>> + Send;

    /// List every account of a client, with balances, ordered by account id.
    fn list_by_owner(
        &self,
        owner_id: ClientId,
    ) -> impl std::future::Future<Output = Result<Vec<AccountWithBalance>, AccountError>> + Send;

    /// Find account id by account number.
    fn find_id_by_number(
        &self,
        account_number: &str,
    ) -> impl std::future::Future<Output = Result<Option<AccountId>, AccountError>> + Send;
}
