//! Initial database migration.
//!
//! Creates branches, users, float accounts and their movement log, the
//! general ledger, card batches and domain transactions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: BRANCHES & USERS
        // ============================================================
        db.execute_unprepared(BRANCHES_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 2: FLOATS
        // ============================================================
        db.execute_unprepared(FLOAT_ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: GENERAL LEDGER
        // ============================================================
        db.execute_unprepared(GL_SQL).await?;

        // ============================================================
        // PART 4: CARD BATCHES & DOMAIN TRANSACTIONS
        // ============================================================
        db.execute_unprepared(CARD_BATCHES_SQL).await?;
        db.execute_unprepared(DOMAIN_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(FLOAT_MOVEMENTS_SQL).await?;

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

const BRANCHES_SQL: &str = r"
CREATE TABLE branches (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    branch_id UUID NOT NULL REFERENCES branches(id),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    role VARCHAR(20) NOT NULL
        CHECK (role IN ('admin', 'finance', 'manager', 'operations', 'cashier')),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_branch ON users(branch_id);
";

const FLOAT_ACCOUNTS_SQL: &str = r"
CREATE TABLE float_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    branch_id UUID NOT NULL REFERENCES branches(id),
    account_type VARCHAR(20) NOT NULL
        CHECK (account_type IN ('cash-in-till', 'momo', 'agency-banking', 'power', 'e-zwich', 'jumia')),
    provider VARCHAR(100),
    account_number VARCHAR(100),
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    min_threshold NUMERIC(19, 4) NOT NULL DEFAULT 0,
    max_threshold NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_float_balance_non_negative CHECK (current_balance >= 0),
    CONSTRAINT chk_float_thresholds CHECK (
        min_threshold >= 0 AND max_threshold >= 0
        AND (max_threshold = 0 OR min_threshold <= max_threshold)
    )
);

-- One active float per branch, type and provider
CREATE UNIQUE INDEX uq_float_accounts_active
    ON float_accounts(branch_id, account_type, COALESCE(provider, ''))
    WHERE is_active;

CREATE INDEX idx_float_accounts_branch ON float_accounts(branch_id, account_type);
";

const GL_SQL: &str = r"
CREATE TABLE gl_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(10) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    account_type VARCHAR(20) NOT NULL
        CHECK (account_type IN ('asset', 'liability', 'equity', 'revenue', 'expense')),
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE gl_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    date DATE NOT NULL,
    source_module VARCHAR(50) NOT NULL,
    source_transaction_id UUID,
    source_transaction_type VARCHAR(50) NOT NULL,
    description TEXT NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'posted'
        CHECK (status IN ('posted', 'reversed')),
    created_by UUID NOT NULL,
    branch_id UUID NOT NULL REFERENCES branches(id),
    metadata JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_gl_transactions_branch_date ON gl_transactions(branch_id, date DESC);
CREATE INDEX idx_gl_transactions_source ON gl_transactions(source_module, source_transaction_id);

CREATE TABLE gl_journal_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id UUID NOT NULL REFERENCES gl_transactions(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES gl_accounts(id),
    account_code VARCHAR(10) NOT NULL,
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    description TEXT NOT NULL,

    CONSTRAINT chk_line_amounts CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT chk_line_one_side CHECK (debit = 0 OR credit = 0),
    CONSTRAINT uq_line_no UNIQUE (transaction_id, line_no)
);

CREATE INDEX idx_gl_lines_account ON gl_journal_lines(account_id);
";

const CARD_BATCHES_SQL: &str = r"
CREATE TABLE card_batches (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    branch_id UUID NOT NULL REFERENCES branches(id),
    batch_code VARCHAR(50) NOT NULL,
    quantity_received INTEGER NOT NULL,
    quantity_issued INTEGER NOT NULL DEFAULT 0,
    card_type VARCHAR(50) NOT NULL DEFAULT 'standard',
    unit_cost NUMERIC(19, 4) NOT NULL DEFAULT 0,
    received_date DATE NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_card_batch_code UNIQUE (branch_id, batch_code),
    CONSTRAINT chk_batch_quantities CHECK (
        quantity_received > 0 AND quantity_issued >= 0
        AND quantity_issued <= quantity_received
    )
);
";

const DOMAIN_TRANSACTIONS_SQL: &str = r"
CREATE TABLE domain_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    branch_id UUID NOT NULL REFERENCES branches(id),
    module VARCHAR(30) NOT NULL
        CHECK (module IN ('power', 'momo', 'agency-banking', 'e-zwich',
                          'jumia-collection', 'jumia-settlement', 'expenses')),
    status VARCHAR(20) NOT NULL
        CHECK (status IN ('pending', 'completed', 'failed', 'reversed', 'deleted')),
    amount NUMERIC(19, 4) NOT NULL,
    fee NUMERIC(19, 4) NOT NULL DEFAULT 0,
    reference VARCHAR(100),
    payment_float_id UUID REFERENCES float_accounts(id),
    service_float_id UUID REFERENCES float_accounts(id),
    details JSONB NOT NULL DEFAULT '{}',
    gl_transaction_id UUID REFERENCES gl_transactions(id),
    notes TEXT,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    completed_at TIMESTAMPTZ,

    CONSTRAINT chk_tx_amounts CHECK (amount >= 0 AND fee >= 0)
);

CREATE INDEX idx_domain_tx_branch_created ON domain_transactions(branch_id, created_at DESC);
CREATE INDEX idx_domain_tx_module_status ON domain_transactions(module, status);
CREATE INDEX idx_domain_tx_payment_float ON domain_transactions(payment_float_id);
CREATE INDEX idx_domain_tx_service_float ON domain_transactions(service_float_id);
";

const FLOAT_MOVEMENTS_SQL: &str = r"
-- Append-only audit of every float balance change
CREATE TABLE float_movements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    float_account_id UUID NOT NULL REFERENCES float_accounts(id),
    transaction_id UUID REFERENCES domain_transactions(id),
    delta NUMERIC(19, 4) NOT NULL,
    balance_before NUMERIC(19, 4) NOT NULL,
    balance_after NUMERIC(19, 4) NOT NULL,
    memo TEXT NOT NULL,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_movement_arithmetic CHECK (balance_after = balance_before + delta),
    CONSTRAINT chk_movement_non_zero CHECK (delta <> 0)
);

CREATE INDEX idx_float_movements_account ON float_movements(float_account_id, created_at DESC);
CREATE INDEX idx_float_movements_tx ON float_movements(transaction_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS float_movements CASCADE;
DROP TABLE IF EXISTS domain_transactions CASCADE;
DROP TABLE IF EXISTS card_batches CASCADE;
DROP TABLE IF EXISTS gl_journal_lines CASCADE;
DROP TABLE IF EXISTS gl_transactions CASCADE;
DROP TABLE IF EXISTS gl_accounts CASCADE;
DROP TABLE IF EXISTS float_accounts CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS branches CASCADE;
";
