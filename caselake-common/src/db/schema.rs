//! Table definitions for the Bronze, Silver and Gold layers.
//!
//! All statements are `CREATE TABLE IF NOT EXISTS` so schema creation is
//! idempotent and runs on every startup.
//!
//! Layer conventions:
//! - Bronze tables are append-mostly; only `status`, `error_detail` and
//!   `processed_at` are ever updated after insert. Rows are never deleted.
//! - Silver tables carry a `bronze_id` lineage column and either a natural
//!   unique key or a `dedup_key` unique index so replay cannot duplicate rows.
//! - Gold tables are fully re-derived per case and owned exclusively by the
//!   Gold normalization engine.

use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Create all caselake tables
pub async fn create_all_tables(pool: &SqlitePool) -> Result<()> {
    create_cases_table(pool).await?;

    create_bronze_tables(pool).await?;

    create_tax_years_table(pool).await?;
    create_account_activity_table(pool).await?;
    create_income_documents_table(pool).await?;
    create_return_lines_table(pool).await?;
    create_tolling_events_table(pool).await?;
    create_interview_facts_table(pool).await?;

    create_employment_records_table(pool).await?;
    create_household_records_table(pool).await?;
    create_income_sources_table(pool).await?;
    create_monthly_expenses_table(pool).await?;
    create_financial_accounts_table(pool).await?;
    create_vehicles_table(pool).await?;
    create_real_properties_table(pool).await?;

    info!("Database schema up to date");
    Ok(())
}

async fn create_cases_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cases (
            id TEXT PRIMARY KEY,
            case_number TEXT NOT NULL UNIQUE,
            status_code TEXT NOT NULL DEFAULT 'NEW',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Bronze raw-document tables, one per source type.
///
/// All four share the same shape; the split keeps per-source replay and
/// monitoring queries trivial, matching the upstream provider split.
async fn create_bronze_tables(pool: &SqlitePool) -> Result<()> {
    for table in [
        "bronze_account_raw",
        "bronze_wage_income_raw",
        "bronze_return_raw",
        "bronze_interview_raw",
    ] {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                bronze_id TEXT PRIMARY KEY,
                case_number TEXT NOT NULL,
                payload TEXT NOT NULL,
                source TEXT NOT NULL,
                endpoint TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                error_detail TEXT,
                inserted_at TEXT NOT NULL,
                processed_at TEXT
            )
            "#
        ))
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_case ON {table} (case_number)"
        ))
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn create_tax_years_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tax_years (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            tax_year INTEGER NOT NULL,
            return_filed INTEGER,
            filing_status TEXT,
            agi REAL,
            taxable_income REAL,
            tax_per_return REAL,
            account_balance REAL,
            return_filed_date TEXT,
            bronze_id TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (case_id, tax_year)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_account_activity_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS account_activity (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            tax_year INTEGER NOT NULL,
            activity_date TEXT,
            code TEXT NOT NULL,
            explanation TEXT,
            amount REAL,
            transaction_type TEXT NOT NULL,
            affects_balance INTEGER NOT NULL,
            affects_csed INTEGER NOT NULL,
            indicates_collection_action INTEGER NOT NULL,
            balance_sign INTEGER NOT NULL,
            bronze_id TEXT NOT NULL,
            dedup_key TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_account_activity_case_year
         ON account_activity (case_id, tax_year)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_income_documents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS income_documents (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            tax_year INTEGER NOT NULL,
            document_type TEXT NOT NULL,
            gross_amount REAL,
            federal_withholding REAL,
            issuer_name TEXT,
            issuer_id TEXT,
            recipient_name TEXT,
            recipient_id TEXT,
            category TEXT NOT NULL,
            is_self_employment INTEGER NOT NULL,
            is_excluded INTEGER NOT NULL DEFAULT 0,
            bronze_id TEXT NOT NULL,
            dedup_key TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_income_documents_case_year
         ON income_documents (case_id, tax_year)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_return_lines_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS return_lines (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            tax_year INTEGER NOT NULL,
            form_name TEXT,
            line_label TEXT NOT NULL,
            amount REAL,
            bronze_id TEXT NOT NULL,
            dedup_key TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_tolling_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tolling_events (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            tax_year INTEGER NOT NULL,
            category TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            tolling_days INTEGER,
            bronze_id TEXT NOT NULL,
            dedup_key TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// One wide row per case holding the typed interview resolution plus the
/// original nested sections verbatim for replay and audit.
async fn create_interview_facts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interview_facts (
            case_id TEXT PRIMARY KEY REFERENCES cases(id),
            bronze_id TEXT NOT NULL,
            resolved TEXT NOT NULL,
            employment_json TEXT,
            household_json TEXT,
            assets_json TEXT,
            income_json TEXT,
            expenses_json TEXT,
            standards_json TEXT,
            payload_json TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_employment_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employment_records (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            role TEXT NOT NULL,
            employer TEXT,
            start_date TEXT,
            gross_income REAL,
            net_income REAL,
            pay_frequency TEXT,
            monthly_income REAL,
            annual_income REAL,
            source_map TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (case_id, role)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_household_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS household_records (
            case_id TEXT PRIMARY KEY REFERENCES cases(id),
            household_members INTEGER NOT NULL,
            members_under_65 INTEGER,
            members_over_65 INTEGER,
            occupancy_status TEXT,
            residency_length TEXT,
            filing_status TEXT NOT NULL,
            state TEXT,
            county TEXT,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_income_sources_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS income_sources (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            frequency TEXT NOT NULL,
            monthly_amount REAL NOT NULL,
            net_amount REAL,
            updated_at TEXT NOT NULL,
            UNIQUE (case_id, category)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_monthly_expenses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monthly_expenses (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            category TEXT NOT NULL,
            expense_class TEXT NOT NULL,
            amount REAL NOT NULL,
            frequency TEXT NOT NULL,
            monthly_amount REAL NOT NULL,
            irs_standard REAL,
            updated_at TEXT NOT NULL,
            UNIQUE (case_id, category)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_financial_accounts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS financial_accounts (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            account_kind TEXT NOT NULL,
            current_value REAL NOT NULL,
            loan_balance REAL NOT NULL,
            equity REAL NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (case_id, account_kind)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_vehicles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vehicles (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            slot INTEGER NOT NULL,
            current_value REAL NOT NULL,
            loan_balance REAL NOT NULL,
            equity REAL NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (case_id, slot)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_real_properties_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS real_properties (
            id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(id),
            slot INTEGER NOT NULL,
            current_value REAL NOT NULL,
            loan_balance REAL NOT NULL,
            equity REAL NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (case_id, slot)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
