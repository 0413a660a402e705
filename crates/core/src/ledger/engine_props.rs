//! Property-based tests for LedgerEngine.
//!
//! - Balance invariant: every balance equals its credits minus its debits
//! - Non-negativity: no posting sequence drives a balance below zero
//! - Double-entry: every transfer has two opposite entries of equal amount

use std::sync::Arc;

use ledgerbank_shared::types::ClientId;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;

use super::engine::LedgerEngine;
use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{EntryDirection, PostingRequest, TransactionKind};
use crate::account::{Account, AccountService};
use crate::iban::AccountNumberCodec;
use crate::memory::MemoryBank;

const ACCOUNTS: usize = 3;

/// One step of a generated posting sequence.
#[derive(Debug, Clone)]
struct Step {
    kind: TransactionKind,
    source: usize,
    destination: usize,
    amount: Decimal,
}

/// Strategy to generate positive decimal amounts (0.01 to 1,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Add),
        Just(TransactionKind::Withdrawal),
        Just(TransactionKind::Transfer),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    (kind_strategy(), 0..ACCOUNTS, 0..ACCOUNTS, positive_amount()).prop_map(
        |(kind, source, destination, amount)| Step {
            kind,
            source,
            destination,
            amount,
        },
    )
}

fn request(step: &Step, accounts: &[Account]) -> PostingRequest {
    let source = accounts[step.source].id;
    match step.kind {
        TransactionKind::Add => PostingRequest::add(source, step.amount),
        TransactionKind::Withdrawal => PostingRequest::withdrawal(source, step.amount),
        TransactionKind::Transfer => PostingRequest::transfer(
            source,
            accounts[step.destination].account_number.clone(),
            step.amount,
        ),
    }
}

fn run(steps: &[Step]) -> Result<(), TestCaseError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let bank = MemoryBank::new();
        let engine = LedgerEngine::new(Arc::new(bank.clone()));
        let codec = AccountNumberCodec::new("0182", "0600", "ES").unwrap();
        let service = AccountService::with_rng(Arc::new(bank.clone()), codec, StdRng::seed_from_u64(0));

        let mut accounts = Vec::with_capacity(ACCOUNTS);
        for _ in 0..ACCOUNTS {
            accounts.push(service.open_account(ClientId::new(1)).await.unwrap());
        }

        for step in steps {
            match engine.post(request(step, &accounts)).await {
                Ok(outcome) => {
                    if step.kind == TransactionKind::Transfer {
                        let entries = &outcome.entries;
                        prop_assert_eq!(entries.len(), 2);
                        prop_assert_eq!(entries[0].transaction_id, entries[1].transaction_id);
                        prop_assert_eq!(entries[0].direction, EntryDirection::Debit);
                        prop_assert_eq!(entries[1].direction, EntryDirection::Credit);
                        prop_assert_eq!(entries[0].amount, entries[1].amount);
                        prop_assert_ne!(entries[0].account_id, entries[1].account_id);
                    } else {
                        prop_assert_eq!(outcome.entries.len(), 1);
                    }
                }
                Err(LedgerError::InsufficientFunds { .. }) => {
                    prop_assert!(step.kind.requires_funds());
                }
                Err(LedgerError::SameAccountTransfer(_)) => {
                    prop_assert_eq!(step.source, step.destination);
                }
                Err(other) => return Err(TestCaseError::fail(format!("unexpected error: {other}"))),
            }
        }

        for account in &accounts {
            let balance = engine.balance(account.id).await.unwrap();
            let entries = bank.entries_for_account(account.id).await;
            prop_assert_eq!(Some(balance), LedgerService::balance_from_entries(&entries));
            prop_assert!(balance >= Decimal::ZERO);
        }
        Ok(())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_balances_match_entry_trail(steps in prop::collection::vec(step_strategy(), 1..40)) {
        run(&steps)?;
    }
}
