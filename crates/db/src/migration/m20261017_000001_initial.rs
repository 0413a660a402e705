//! Initial database migration.
//!
//! Creates the enums, the four ledger tables and the append-only guard on
//! ledger entries.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ACCOUNTS & BALANCES
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ACCOUNT_BALANCES_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS & LEDGER
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- User-facing transaction type
CREATE TYPE transaction_type AS ENUM ('ADD', 'WITHDRAWAL', 'TRANSFER');

-- Ledger posting direction
CREATE TYPE entry_type AS ENUM ('CREDIT', 'DEBIT');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id              BIGSERIAL PRIMARY KEY,
    client_id       BIGINT NOT NULL,
    account_number  VARCHAR(24) NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_accounts_account_number UNIQUE (account_number),
    CONSTRAINT chk_accounts_account_number_length CHECK (char_length(account_number) = 24)
);

CREATE INDEX idx_accounts_client_id ON accounts(client_id);
";

const ACCOUNT_BALANCES_SQL: &str = r"
CREATE TABLE account_balances (
    account_id  BIGINT PRIMARY KEY REFERENCES accounts(id) ON DELETE RESTRICT,
    balance     NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_account_balances_non_negative CHECK (balance >= 0)
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id                  BIGSERIAL PRIMARY KEY,
    account_id          BIGINT NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    transaction_type    transaction_type NOT NULL,
    amount              NUMERIC(19, 4) NOT NULL,
    to_account_id       BIGINT REFERENCES accounts(id) ON DELETE RESTRICT,
    to_account_number   VARCHAR(24),
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_transactions_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_transactions_destination CHECK (
        (transaction_type = 'TRANSFER') = (to_account_id IS NOT NULL)
    ),
    CONSTRAINT chk_transactions_distinct_accounts CHECK (to_account_id IS NULL OR to_account_id <> account_id)
);

CREATE INDEX idx_transactions_history ON transactions(account_id, created_at DESC, id DESC);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id              BIGSERIAL PRIMARY KEY,
    transaction_id  BIGINT NOT NULL REFERENCES transactions(id) ON DELETE RESTRICT,
    account_id      BIGINT NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    entry_type      entry_type NOT NULL,
    amount          NUMERIC(19, 4) NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_ledger_entries_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_ledger_entries_transaction ON ledger_entries(transaction_id);
CREATE INDEX idx_ledger_entries_account ON ledger_entries(account_id);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION prevent_ledger_entry_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'ledger_entries is append-only (% on entry %)', TG_OP, OLD.id;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_ledger_entries_append_only
    BEFORE UPDATE OR DELETE ON ledger_entries
    FOR EACH ROW EXECUTE FUNCTION prevent_ledger_entry_mutation();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_ledger_entries_append_only ON ledger_entries;
DROP FUNCTION IF EXISTS prevent_ledger_entry_mutation();
DROP TABLE IF EXISTS ledger_entries;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS account_balances;
DROP TABLE IF EXISTS accounts;
DROP TYPE IF EXISTS entry_type;
DROP TYPE IF EXISTS transaction_type;
";
