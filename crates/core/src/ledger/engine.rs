//! Posting engine.
//!
//! Runs one unit of work per posting request:
//! 1. Validate the request and resolve the destination number
//! 2. Lock the involved balances in ascending id order and check funds
//! 3. Insert the transaction row
//! 4. Post the source entry and adjust the source balance
//! 5. For transfers, post the destination entry and adjust its balance
//! 6. Commit
//!
//! Any failure after the unit of work opens rolls it back in full.

use std::sync::Arc;
use std::time::Duration;

use ledgerbank_shared::types::{AccountId, Page, PageRequest, TransactionId};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use super::error::LedgerError;
use super::service::{LedgerService, PostingLeg};
use super::store::{LedgerStore, LedgerUnitOfWork};
use super::types::{
    LedgerEntryRecord, NewLedgerEntry, NewTransaction, PostingOutcome, PostingRequest,
    PostingStage, TransactionRecord,
};

/// Deadline applied by [`LedgerEngine::post_with_default_deadline`] unless
/// configured otherwise.
pub const DEFAULT_POSTING_TIMEOUT: Duration = Duration::from_secs(5);

/// Double-entry posting engine over a [`LedgerStore`].
pub struct LedgerEngine<S: LedgerStore> {
    store: Arc<S>,
    posting_timeout: Duration,
}

impl<S: LedgerStore> Clone for LedgerEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            posting_timeout: self.posting_timeout,
        }
    }
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Create a new engine with the default posting deadline.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            posting_timeout: DEFAULT_POSTING_TIMEOUT,
        }
    }

    /// Overrides the default posting deadline.
    #[must_use]
    pub fn with_posting_timeout(mut self, posting_timeout: Duration) -> Self {
        self.posting_timeout = posting_timeout;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Posts a transaction request atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is not positive, or the destination number is missing,
    ///   unexpected or fails verification (`InvalidInput`)
    /// - The destination number resolves to the source account (`InvalidInput`)
    /// - The source account or destination number is unknown (`NotFound`)
    /// - The source balance does not cover a withdrawal or transfer
    ///   (`InsufficientFunds`)
    /// - The store fails (`Storage`)
    ///
    /// In every error case nothing is persisted.
    #[tracing::instrument(
        skip(self, request),
        fields(
            account_id = %request.source_account_id,
            kind = %request.kind,
            amount = %request.amount,
        )
    )]
    pub async fn post(&self, request: PostingRequest) -> Result<PostingOutcome, LedgerError> {
        LedgerService::validate_request(&request)?;

        let destination = self.resolve_destination(&request).await?;
        let legs = LedgerService::plan_legs(
            request.kind,
            request.source_account_id,
            destination,
            request.amount,
        )?;

        let mut uow = self.store.begin().await?;
        let mut stage = PostingStage::Validating;

        match Self::apply(&mut uow, &request, destination, &legs, &mut stage).await {
            Ok(outcome) => {
                uow.commit().await?;
                info!(
                    transaction_id = %outcome.transaction.id,
                    entries = outcome.entries.len(),
                    stage = %PostingStage::Committed,
                    "Posting committed"
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    stage = %stage,
                    code = err.error_code(),
                    error = %err,
                    "Posting rolled back"
                );
                if let Err(rollback_err) = uow.rollback().await {
                    error!(error = %rollback_err, "Failed to roll back posting");
                }
                Err(err)
            }
        }
    }

    /// Posts a request, abandoning it if it does not commit within `deadline`.
    ///
    /// An abandoned unit of work is dropped uncommitted, so nothing it wrote
    /// becomes visible.
    ///
    /// # Errors
    ///
    /// Returns `DeadlineExceeded` on expiry, otherwise whatever
    /// [`LedgerEngine::post`] returns.
    #[tracing::instrument(skip(self, request))]
    pub async fn post_with_deadline(
        &self,
        request: PostingRequest,
        deadline: Duration,
    ) -> Result<PostingOutcome, LedgerError> {
        if let Ok(result) = tokio::time::timeout(deadline, self.post(request)).await {
            result
        } else {
            warn!(deadline = ?deadline, "Posting deadline exceeded");
            Err(LedgerError::DeadlineExceeded(deadline))
        }
    }

    /// Posts a request under the engine's configured deadline.
    pub async fn post_with_default_deadline(
        &self,
        request: PostingRequest,
    ) -> Result<PostingOutcome, LedgerError> {
        self.post_with_deadline(request, self.posting_timeout).await
    }

    /// Current balance of an account.
    pub async fn balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        self.store.balance(account_id).await
    }

    /// Transaction by id.
    pub async fn transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        self.store
            .find_transaction(transaction_id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))
    }

    /// Entries of a transaction in posting order.
    pub async fn entries(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Vec<LedgerEntryRecord>, LedgerError> {
        self.store.entries_for_transaction(transaction_id).await
    }

    /// Paginated transaction history of an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPage` if the page or page size is below 1.
    #[tracing::instrument(skip(self))]
    pub async fn history(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<Page<TransactionRecord>, LedgerError> {
        LedgerService::validate_page(page)?;
        self.store.list_transactions(account_id, page).await
    }

    async fn resolve_destination(
        &self,
        request: &PostingRequest,
    ) -> Result<Option<AccountId>, LedgerError> {
        let Some(number) = request.destination_account_number.as_deref() else {
            return Ok(None);
        };

        let destination = self
            .store
            .find_account_id_by_number(number)
            .await?
            .ok_or_else(|| LedgerError::DestinationNotFound(number.to_string()))?;

        debug!(destination_account_id = %destination, "Destination resolved");
        Ok(Some(destination))
    }

    async fn apply(
        uow: &mut S::UnitOfWork,
        request: &PostingRequest,
        destination: Option<AccountId>,
        legs: &[PostingLeg],
        stage: &mut PostingStage,
    ) -> Result<PostingOutcome, LedgerError> {
        for account_id in LedgerService::lock_order(legs) {
            let balance = uow.balance_for_update(account_id).await?;
            if account_id == request.source_account_id {
                LedgerService::validate_funds(account_id, request.kind, balance, request.amount)?;
            }
        }
        *stage = PostingStage::BalanceChecked;

        let transaction = uow
            .insert_transaction(NewTransaction {
                source_account_id: request.source_account_id,
                kind: request.kind,
                amount: request.amount,
                destination_account_id: destination,
                destination_account_number: request.destination_account_number.clone(),
            })
            .await?;
        *stage = PostingStage::TransactionPersisted;

        let mut entries = Vec::with_capacity(legs.len());
        for (index, leg) in legs.iter().enumerate() {
            let entry = uow
                .insert_entry(NewLedgerEntry {
                    transaction_id: transaction.id,
                    account_id: leg.account_id,
                    direction: leg.direction,
                    amount: leg.amount,
                })
                .await?;
            uow.adjust_balance(leg.account_id, leg.delta()).await?;
            entries.push(entry);

            *stage = if index == 0 {
                PostingStage::PrimaryEntryPosted
            } else {
                PostingStage::SecondaryEntryPosted
            };
        }

        Ok(PostingOutcome {
            transaction,
            entries,
        })
    }
}
