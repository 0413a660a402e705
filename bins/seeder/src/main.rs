//! Demo data seeder for LedgerBank development.
//!
//! Opens two accounts for each demo client and runs a small sequence of
//! deposits, withdrawals and transfers through the posting engine, so every
//! balance in the seeded database is backed by ledger entries.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use ledgerbank_core::account::{Account, AccountService};
use ledgerbank_core::iban::AccountNumberCodec;
use ledgerbank_core::ledger::{LedgerEngine, PostingRequest};
use ledgerbank_db::{AccountRepository, LedgerRepository};
use ledgerbank_shared::AppConfig;
use ledgerbank_shared::telemetry::init_tracing;
use ledgerbank_shared::types::ClientId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

/// Demo clients, each with an opening deposit.
const DEMO_CLIENTS: [(i64, Decimal); 3] = [(1, dec!(2000.65)), (2, dec!(1000)), (3, dec!(250.50))];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = ledgerbank_db::connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let codec = AccountNumberCodec::from_config(&config.bank).context("Invalid bank configuration")?;
    let accounts = AccountService::new(Arc::new(AccountRepository::new(db.clone())), codec);
    let engine = LedgerEngine::new(Arc::new(LedgerRepository::new(db)))
        .with_posting_timeout(config.ledger.posting_timeout());

    let mut opened: Vec<(Account, Account)> = Vec::with_capacity(DEMO_CLIENTS.len());
    for (client, deposit) in DEMO_CLIENTS {
        let owner = ClientId::new(client);
        let checking = accounts.open_account(owner).await?;
        let savings = accounts.open_account(owner).await?;

        engine
            .post_with_default_deadline(PostingRequest::add(checking.id, deposit))
            .await?;
        info!(
            client_id = %owner,
            checking = %checking.account_number,
            savings = %savings.account_number,
            amount = %deposit,
            "Seeded demo client"
        );
        opened.push((checking, savings));
    }

    for (checking, savings) in &opened {
        engine
            .post_with_default_deadline(PostingRequest::withdrawal(checking.id, dec!(100)))
            .await?;
        engine
            .post_with_default_deadline(PostingRequest::transfer(
                checking.id,
                savings.account_number.clone(),
                dec!(50),
            ))
            .await?;
    }

    // Cross-client transfer chain
    for pair in opened.windows(2) {
        let (from, _) = &pair[0];
        let (to, _) = &pair[1];
        let request = PostingRequest::transfer(from.id, to.account_number.clone(), dec!(25.25));
        if let Err(e) = engine.post_with_default_deadline(request).await {
            warn!(error = %e, code = e.error_code(), "Demo transfer rejected");
        }
    }

    for (checking, savings) in &opened {
        info!(
            checking = %checking.account_number,
            checking_balance = %engine.balance(checking.id).await?,
            savings = %savings.account_number,
            savings_balance = %engine.balance(savings.id).await?,
            "Final demo balances"
        );
    }

    info!("Seeding complete");
    Ok(())
}
