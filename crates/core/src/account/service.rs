//! Account opening and lookups.

use std::sync::{Arc, Mutex, PoisonError};

use ledgerbank_shared::types::{AccountId, ClientId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use super::error::AccountError;
use super::store::AccountStore;
use super::types::{Account, AccountWithBalance, NewAccount};
use crate::iban::AccountNumberCodec;

/// How many freshly composed numbers account opening tries before giving up.
pub const MAX_NUMBER_ATTEMPTS: u32 = 3;

/// Account service for opening accounts and resolving account numbers.
pub struct AccountService<S: AccountStore> {
    store: Arc<S>,
    codec: AccountNumberCodec,
    rng: Mutex<StdRng>,
}

impl<S: AccountStore> AccountService<S> {
    /// Create a new account service with an OS-seeded generator.
    #[must_use]
    pub fn new(store: Arc<S>, codec: AccountNumberCodec) -> Self {
        Self::with_rng(store, codec, StdRng::from_os_rng())
    }

    /// Create a new account service drawing numbers from `rng`.
    #[must_use]
    pub fn with_rng(store: Arc<S>, codec: AccountNumberCodec, rng: StdRng) -> Self {
        Self {
            store,
            codec,
            rng: Mutex::new(rng),
        }
    }

    /// The codec used for new numbers.
    #[must_use]
    pub fn codec(&self) -> &AccountNumberCodec {
        &self.codec
    }

    /// Opens an account for `owner_id` with a fresh number and a zero balance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Number composition fails
    /// - Every attempt collides with an existing number
    /// - Storage fails
    pub async fn open_account(&self, owner_id: ClientId) -> Result<Account, AccountError> {
        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let account_number = self.next_number()?;

            match self
                .store
                .create_account(NewAccount {
                    owner_id,
                    account_number,
                })
                .await
            {
                Ok(account) => {
                    info!(
                        account_id = %account.id,
                        owner_id = %owner_id,
                        "Account opened"
                    );
                    return Ok(account);
                }
                Err(err) if err.is_retryable() => {
                    warn!(attempt, error = %err, "Account number collision, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(AccountError::NumberSpaceExhausted(MAX_NUMBER_ATTEMPTS))
    }

    /// Account by id, with its balance.
    pub async fn find_account(
        &self,
        account_id: AccountId,
    ) -> Result<AccountWithBalance, AccountError> {
        self.store
            .find_account(account_id)
            .await?
            .ok_or(AccountError::NotFound(account_id))
    }

    /// Every account of a client, with balances.
    ///
    /// # Errors
    ///
    /// Returns `OwnerHasNoAccounts` if the client has none.
    pub async fn list_accounts_by_owner(
        &self,
        owner_id: ClientId,
    ) -> Result<Vec<AccountWithBalance>, AccountError> {
        let accounts = self.store.list_by_owner(owner_id).await?;
        if accounts.is_empty() {
            return Err(AccountError::OwnerHasNoAccounts(owner_id));
        }
        Ok(accounts)
    }

    /// Resolves an account number to its account id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAccountNumber` before any lookup if the check digits do
    /// not verify, and `NumberNotFound` if no account holds the number.
    pub async fn find_account_id_by_number(
        &self,
        account_number: &str,
    ) -> Result<AccountId, AccountError> {
        if !AccountNumberCodec::verify(account_number) {
            return Err(AccountError::InvalidAccountNumber(account_number.to_string()));
        }

        self.store
            .find_id_by_number(account_number)
            .await?
            .ok_or_else(|| AccountError::NumberNotFound(account_number.to_string()))
    }

    fn next_number(&self) -> Result<String, AccountError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.codec.compose(&mut *rng)?.to_string())
    }
}
