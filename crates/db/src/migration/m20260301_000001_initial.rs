//! Initial database migration.
//!
//! Creates the reference tables, the ledger tables, the document tables and
//! the deferred balance trigger.

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
        // PART 2: CHART OF ACCOUNTS & ITEMS
        // ============================================================
        db.execute_unprepared(ACCOUNT_TYPES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ITEMS_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS & SPLITS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(SPLITS_SQL).await?;

        // ============================================================
        // PART 4: DOCUMENTS
        // ============================================================
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(DOCUMENT_LINES_SQL).await?;
        db.execute_unprepared(APPLIED_CREDITS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
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
CREATE TYPE account_category AS ENUM (
    'asset',
    'liability',
    'equity',
    'income',
    'expense'
);

CREATE TYPE item_type AS ENUM (
    'inventory',
    'non-inventory',
    'service',
    'discount',
    'payment'
);

CREATE TYPE document_type AS ENUM (
    'invoice',
    'check',
    'credit-memo',
    'journal',
    'sales-receipt',
    'invoice-payment',
    'payment-applied-discount'
);

-- Transaction and document status
CREATE TYPE transaction_status AS ENUM ('active', 'voided');

-- Split, line and applied credit status
CREATE TYPE record_status AS ENUM ('active', 'superseded');

-- Debit or credit; also an account's normal side
CREATE TYPE entry_type AS ENUM ('debit', 'credit');
";

const ACCOUNT_TYPES_SQL: &str = r"
CREATE TABLE account_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    category account_category NOT NULL,
    is_ar_ap BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    account_type_id UUID NOT NULL REFERENCES account_types(id),
    normal_side entry_type NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_accounts_type ON accounts(account_type_id);
";

const ITEMS_SQL: &str = r"
CREATE TABLE items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    item_type item_type NOT NULL,
    asset_account_id UUID REFERENCES accounts(id),
    income_account_id UUID REFERENCES accounts(id),
    cogs_account_id UUID REFERENCES accounts(id),
    expense_account_id UUID REFERENCES accounts(id),
    rate NUMERIC(19, 4),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    document_type document_type NOT NULL,
    transaction_date DATE NOT NULL,
    memo TEXT,
    reference VARCHAR(100),
    status transaction_status NOT NULL DEFAULT 'active',
    building_id UUID NOT NULL,
    created_by UUID NOT NULL,
    unit_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_txn_building_date ON transactions(building_id, transaction_date);
CREATE INDEX idx_txn_date ON transactions(transaction_date) WHERE status = 'active';
";

const SPLITS_SQL: &str = r"
CREATE TABLE splits (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id UUID NOT NULL REFERENCES transactions(id),
    position INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    party_id UUID,
    unit_id UUID,
    debit NUMERIC(19, 4),
    credit NUMERIC(19, 4),
    memo VARCHAR(500),
    status record_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_one_side CHECK (
        (debit IS NOT NULL AND credit IS NULL AND debit > 0)
        OR (debit IS NULL AND credit IS NOT NULL AND credit > 0)
    )
);

CREATE INDEX idx_splits_transaction ON splits(transaction_id, created_at, position);
CREATE INDEX idx_splits_account_active ON splits(account_id) WHERE status = 'active';
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    document_type document_type NOT NULL,
    building_id UUID NOT NULL,
    transaction_id UUID NOT NULL UNIQUE REFERENCES transactions(id),
    number VARCHAR(100),
    party_id UUID,
    unit_id UUID,
    document_date DATE NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    invoice_id UUID REFERENCES documents(id),
    payload JSONB NOT NULL,
    status transaction_status NOT NULL DEFAULT 'active',
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Numbers are unique per building and type among active documents
CREATE UNIQUE INDEX uq_documents_active_number
    ON documents(building_id, document_type, number)
    WHERE status = 'active' AND number IS NOT NULL;

CREATE INDEX idx_documents_invoice ON documents(invoice_id) WHERE invoice_id IS NOT NULL;
";

const DOCUMENT_LINES_SQL: &str = r"
CREATE TABLE document_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    document_id UUID NOT NULL REFERENCES documents(id),
    position INTEGER NOT NULL,
    account_id UUID REFERENCES accounts(id),
    item_id UUID REFERENCES items(id),
    description TEXT,
    quantity NUMERIC(19, 6),
    rate VARCHAR(64),
    amount NUMERIC(19, 4) NOT NULL,
    entry_type entry_type,
    party_id UUID,
    unit_id UUID,
    status record_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_document_lines_document ON document_lines(document_id, created_at, position);
";

const APPLIED_CREDITS_SQL: &str = r"
CREATE TABLE applied_credits (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    building_id UUID NOT NULL,
    credit_memo_id UUID NOT NULL REFERENCES documents(id),
    invoice_id UUID NOT NULL REFERENCES documents(id),
    amount NUMERIC(19, 4) NOT NULL,
    applied_date DATE NOT NULL,
    status record_status NOT NULL DEFAULT 'active',
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_applied_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_applied_credits_memo ON applied_credits(credit_memo_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_transaction_balance
-- Active splits of a transaction must balance to the cent at commit
-- ============================================================
CREATE OR REPLACE FUNCTION check_transaction_balance()
RETURNS TRIGGER AS $$
DECLARE
    total_debit NUMERIC(19, 4);
    total_credit NUMERIC(19, 4);
    active_count INTEGER;
BEGIN
    SELECT
        COALESCE(SUM(debit), 0),
        COALESCE(SUM(credit), 0),
        COUNT(*)
    INTO total_debit, total_credit, active_count
    FROM splits
    WHERE transaction_id = NEW.transaction_id
      AND status = 'active';

    IF active_count < 2 THEN
        RAISE EXCEPTION 'Transaction % has % active splits, at least 2 required',
            NEW.transaction_id, active_count;
    END IF;

    IF ROUND(total_debit, 2) <> ROUND(total_credit, 2) THEN
        RAISE EXCEPTION 'Transaction is not balanced. Debit: %, Credit: %',
            total_debit, total_credit;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_balance
AFTER INSERT OR UPDATE ON splits
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_transaction_balance();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_check_balance ON splits;
DROP FUNCTION IF EXISTS check_transaction_balance();

DROP TABLE IF EXISTS applied_credits CASCADE;
DROP TABLE IF EXISTS document_lines CASCADE;
DROP TABLE IF EXISTS documents CASCADE;
DROP TABLE IF EXISTS splits CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS items CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS account_types CASCADE;

DROP TYPE IF EXISTS entry_type;
DROP TYPE IF EXISTS record_status;
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS document_type;
DROP TYPE IF EXISTS item_type;
DROP TYPE IF EXISTS account_category;
";
