//! Ledger service for posting validation and planning.
//!
//! This module holds the pure rules of a posting: what a well-formed request
//! looks like, when funds are sufficient, and which balance changes a posting
//! makes. The engine applies them inside a unit of work.

use ledgerbank_shared::types::{AccountId, PageRequest};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryDirection, LedgerEntryRecord, PostingRequest, TransactionKind};
use crate::iban::AccountNumberCodec;

/// Decimal places a stored amount or balance keeps (`NUMERIC(19, 4)`).
pub const AMOUNT_SCALE: u32 = 4;

/// Largest amount or balance a `NUMERIC(19, 4)` column holds:
/// 999,999,999,999,999.9999.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x89E7_FFFF, 0x8AC7_2304, 0, false, AMOUNT_SCALE);

/// One balance change of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingLeg {
    /// Affected account.
    pub account_id: AccountId,
    /// Direction of the entry posted for this leg.
    pub direction: EntryDirection,
    /// Positive amount.
    pub amount: Decimal,
}

impl PostingLeg {
    /// Signed balance delta this leg applies.
    #[must_use]
    pub fn delta(&self) -> Decimal {
        self.direction.signed(self.amount)
    }
}

/// Ledger service for posting validation.
///
/// This service contains pure business logic with no storage dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validates the shape of a posting request.
    ///
    /// Checks, in order:
    /// 1. Amount is strictly positive
    /// 2. A transfer carries a non-blank destination number
    /// 3. Other kinds carry no destination number
    /// 4. The destination number passes check-digit verification
    pub fn validate_request(request: &PostingRequest) -> Result<(), LedgerError> {
        Self::validate_amount(request.amount)?;

        match (request.kind, request.destination_account_number.as_deref()) {
            (TransactionKind::Transfer, None) => Err(LedgerError::MissingDestination),
            (TransactionKind::Transfer, Some(number)) if number.trim().is_empty() => {
                Err(LedgerError::MissingDestination)
            }
            (TransactionKind::Transfer, Some(number)) => Self::validate_account_number(number),
            (kind, Some(_)) => Err(LedgerError::UnexpectedDestination(kind)),
            (_, None) => Ok(()),
        }
    }

    /// Validates that an amount is strictly positive and storable.
    ///
    /// Trailing zeros do not count towards the scale, so `1.50000` passes
    /// while `0.00001` does not.
    pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if amount.is_sign_negative() {
            return Err(LedgerError::NegativeAmount);
        }
        let scale = amount.normalize().scale();
        if scale > AMOUNT_SCALE {
            return Err(LedgerError::ExcessivePrecision { amount, scale });
        }
        if amount > MAX_AMOUNT {
            return Err(LedgerError::AmountTooLarge(amount));
        }
        Ok(())
    }

    /// Applies a signed delta to a balance.
    ///
    /// Fails with `Storage` when the result is negative or outside the
    /// storable range, the same way the balance column rejects it.
    pub fn apply_delta(
        account_id: AccountId,
        balance: Decimal,
        delta: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let updated = balance
            .checked_add(delta)
            .filter(|updated| *updated <= MAX_AMOUNT)
            .ok_or_else(|| {
                LedgerError::Storage(format!(
                    "balance of account {account_id} would exceed {MAX_AMOUNT}"
                ))
            })?;
        if updated < Decimal::ZERO {
            return Err(LedgerError::Storage(format!(
                "balance of account {account_id} would become negative"
            )));
        }
        Ok(updated)
    }

    /// Rejects numbers whose check digits do not verify.
    pub fn validate_account_number(number: &str) -> Result<(), LedgerError> {
        if AccountNumberCodec::verify(number) {
            Ok(())
        } else {
            Err(LedgerError::InvalidAccountNumber(number.to_string()))
        }
    }

    /// Rejects a transfer whose destination resolves to the source.
    pub fn ensure_distinct_accounts(
        source: AccountId,
        destination: AccountId,
    ) -> Result<(), LedgerError> {
        if source == destination {
            return Err(LedgerError::SameAccountTransfer(source));
        }
        Ok(())
    }

    /// Checks the source balance against the requested amount.
    ///
    /// `ADD` always passes. Other kinds fail when `balance < amount`; an
    /// exact match is allowed and leaves the balance at zero.
    pub fn validate_funds(
        account_id: AccountId,
        kind: TransactionKind,
        balance: Decimal,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if kind.requires_funds() && balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account_id,
                balance,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Plans the balance changes of a posting.
    ///
    /// The source leg comes first. Transfers add an opposite-direction leg on
    /// the destination for the same amount.
    pub fn plan_legs(
        kind: TransactionKind,
        source: AccountId,
        destination: Option<AccountId>,
        amount: Decimal,
    ) -> Result<Vec<PostingLeg>, LedgerError> {
        let primary = PostingLeg {
            account_id: source,
            direction: kind.source_direction(),
            amount,
        };

        match (kind.has_destination(), destination) {
            (true, Some(destination)) => {
                Self::ensure_distinct_accounts(source, destination)?;
                Ok(vec![
                    primary,
                    PostingLeg {
                        account_id: destination,
                        direction: primary.direction.opposite(),
                        amount,
                    },
                ])
            }
            (true, None) => Err(LedgerError::MissingDestination),
            (false, Some(_)) => Err(LedgerError::UnexpectedDestination(kind)),
            (false, None) => Ok(vec![primary]),
        }
    }

    /// Order in which balance rows must be locked.
    ///
    /// Ascending id order, without duplicates, so two opposite transfers
    /// cannot each hold the lock the other one waits for.
    #[must_use]
    pub fn lock_order(legs: &[PostingLeg]) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = legs.iter().map(|leg| leg.account_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Recomputes a balance from its entry trail: credits minus debits.
    ///
    /// Returns `None` if the running sum overflows.
    #[must_use]
    pub fn balance_from_entries<'a>(
        entries: impl IntoIterator<Item = &'a LedgerEntryRecord>,
    ) -> Option<Decimal> {
        entries
            .into_iter()
            .map(LedgerEntryRecord::signed_amount)
            .try_fold(Decimal::ZERO, Decimal::checked_add)
    }

    /// Validates a history page request.
    pub fn validate_page(page: PageRequest) -> Result<(), LedgerError> {
        if page.is_valid() {
            Ok(())
        } else {
            Err(LedgerError::InvalidPage {
                page: page.page,
                page_size: page.page_size,
            })
        }
    }
}
