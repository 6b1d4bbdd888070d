//! Gold row storage: atomic per-case set reconciliation
//!
//! Each fan-out entity is replaced by reconciling the desired row set against
//! the stored one inside a single transaction: rows whose natural key is no
//! longer desired are deleted, the rest are upserted in place. There is no
//! visible delete-then-reinsert gap, and a mid-run failure rolls the whole
//! case back to its prior Gold state.

use crate::models::{
    EmploymentRecord, FinancialAccount, GoldSnapshot, HouseholdRecord, IncomeSource,
    MonthlyExpense, PayFrequency, PersonRole, RealProperty, Vehicle,
};
use caselake_common::{Error, Result};
use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

const DATE_FMT: &str = "%Y-%m-%d";

/// Replace the full Gold state for one case.
pub async fn replace_snapshot(
    pool: &SqlitePool,
    case_id: Uuid,
    snapshot: &GoldSnapshot,
) -> Result<()> {
    let mut tx = pool.begin().await?;
    let now = Utc::now().to_rfc3339();

    replace_employment(&mut tx, case_id, &snapshot.employment, &now).await?;
    replace_household(&mut tx, case_id, snapshot.household.as_ref(), &now).await?;
    replace_income_sources(&mut tx, case_id, &snapshot.income_sources, &now).await?;
    replace_monthly_expenses(&mut tx, case_id, &snapshot.monthly_expenses, &now).await?;
    replace_financial_accounts(&mut tx, case_id, &snapshot.financial_accounts, &now).await?;
    replace_vehicles(&mut tx, case_id, &snapshot.vehicles, &now).await?;
    replace_real_properties(&mut tx, case_id, &snapshot.real_properties, &now).await?;

    tx.commit().await?;
    Ok(())
}

/// Delete rows for `case_id` whose natural-key column value is not in `keep`.
async fn delete_not_in(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    key_column: &str,
    case_id: Uuid,
    keep: &[String],
) -> Result<()> {
    if keep.is_empty() {
        sqlx::query(&format!("DELETE FROM {table} WHERE case_id = ?"))
            .bind(case_id.to_string())
            .execute(&mut **tx)
            .await?;
        return Ok(());
    }

    let placeholders = vec!["?"; keep.len()].join(", ");
    let sql =
        format!("DELETE FROM {table} WHERE case_id = ? AND {key_column} NOT IN ({placeholders})");
    let mut query = sqlx::query(&sql).bind(case_id.to_string());
    for key in keep {
        query = query.bind(key);
    }
    query.execute(&mut **tx).await?;
    Ok(())
}

async fn replace_employment(
    tx: &mut Transaction<'_, Sqlite>,
    case_id: Uuid,
    rows: &[EmploymentRecord],
    now: &str,
) -> Result<()> {
    let keep: Vec<String> = rows.iter().map(|r| r.role.as_str().to_string()).collect();
    delete_not_in(tx, "employment_records", "role", case_id, &keep).await?;

    for row in rows {
        let source_map = serde_json::to_string(&row.source_map)
            .map_err(|e| Error::Internal(format!("source map serialization: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO employment_records (
                id, case_id, role, employer, start_date, gross_income, net_income,
                pay_frequency, monthly_income, annual_income, source_map, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (case_id, role) DO UPDATE SET
                employer = excluded.employer,
                start_date = excluded.start_date,
                gross_income = excluded.gross_income,
                net_income = excluded.net_income,
                pay_frequency = excluded.pay_frequency,
                monthly_income = excluded.monthly_income,
                annual_income = excluded.annual_income,
                source_map = excluded.source_map,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(case_id.to_string())
        .bind(row.role.as_str())
        .bind(row.employer.as_deref())
        .bind(row.start_date.map(|d| d.format(DATE_FMT).to_string()))
        .bind(row.gross_income)
        .bind(row.net_income)
        .bind(row.pay_frequency.map(|f| f.as_str()))
        .bind(row.monthly_income)
        .bind(row.annual_income)
        .bind(source_map)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn replace_household(
    tx: &mut Transaction<'_, Sqlite>,
    case_id: Uuid,
    row: Option<&HouseholdRecord>,
    now: &str,
) -> Result<()> {
    let Some(row) = row else {
        sqlx::query("DELETE FROM household_records WHERE case_id = ?")
            .bind(case_id.to_string())
            .execute(&mut **tx)
            .await?;
        return Ok(());
    };

    sqlx::query(
        r#"
        INSERT INTO household_records (
            case_id, household_members, members_under_65, members_over_65,
            occupancy_status, residency_length, filing_status, state, county, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (case_id) DO UPDATE SET
            household_members = excluded.household_members,
            members_under_65 = excluded.members_under_65,
            members_over_65 = excluded.members_over_65,
            occupancy_status = excluded.occupancy_status,
            residency_length = excluded.residency_length,
            filing_status = excluded.filing_status,
            state = excluded.state,
            county = excluded.county,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(case_id.to_string())
    .bind(row.household_members)
    .bind(row.members_under_65)
    .bind(row.members_over_65)
    .bind(row.occupancy_status.as_deref())
    .bind(row.residency_length.as_deref())
    .bind(&row.filing_status)
    .bind(row.state.as_deref())
    .bind(row.county.as_deref())
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn replace_income_sources(
    tx: &mut Transaction<'_, Sqlite>,
    case_id: Uuid,
    rows: &[IncomeSource],
    now: &str,
) -> Result<()> {
    let keep: Vec<String> = rows
        .iter()
        .map(|r| r.category.as_str().to_string())
        .collect();
    delete_not_in(tx, "income_sources", "category", case_id, &keep).await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO income_sources (
                id, case_id, category, amount, frequency, monthly_amount, net_amount, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (case_id, category) DO UPDATE SET
                amount = excluded.amount,
                frequency = excluded.frequency,
                monthly_amount = excluded.monthly_amount,
                net_amount = excluded.net_amount,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(case_id.to_string())
        .bind(row.category.as_str())
        .bind(row.amount)
        .bind(row.frequency.as_str())
        .bind(row.monthly_amount)
        .bind(row.net_amount)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn replace_monthly_expenses(
    tx: &mut Transaction<'_, Sqlite>,
    case_id: Uuid,
    rows: &[MonthlyExpense],
    now: &str,
) -> Result<()> {
    let keep: Vec<String> = rows.iter().map(|r| r.category.clone()).collect();
    delete_not_in(tx, "monthly_expenses", "category", case_id, &keep).await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO monthly_expenses (
                id, case_id, category, expense_class, amount, frequency, monthly_amount,
                irs_standard, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (case_id, category) DO UPDATE SET
                expense_class = excluded.expense_class,
                amount = excluded.amount,
                frequency = excluded.frequency,
                monthly_amount = excluded.monthly_amount,
                irs_standard = excluded.irs_standard,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(case_id.to_string())
        .bind(&row.category)
        .bind(row.expense_class.as_str())
        .bind(row.amount)
        .bind(row.frequency.as_str())
        .bind(row.monthly_amount)
        .bind(row.irs_standard)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn replace_financial_accounts(
    tx: &mut Transaction<'_, Sqlite>,
    case_id: Uuid,
    rows: &[FinancialAccount],
    now: &str,
) -> Result<()> {
    let keep: Vec<String> = rows.iter().map(|r| r.kind.as_str().to_string()).collect();
    delete_not_in(tx, "financial_accounts", "account_kind", case_id, &keep).await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO financial_accounts (
                id, case_id, account_kind, current_value, loan_balance, equity, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (case_id, account_kind) DO UPDATE SET
                current_value = excluded.current_value,
                loan_balance = excluded.loan_balance,
                equity = excluded.equity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(case_id.to_string())
        .bind(row.kind.as_str())
        .bind(row.current_value)
        .bind(row.loan_balance)
        .bind(row.equity)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn replace_vehicles(
    tx: &mut Transaction<'_, Sqlite>,
    case_id: Uuid,
    rows: &[Vehicle],
    now: &str,
) -> Result<()> {
    let keep: Vec<String> = rows.iter().map(|r| r.slot.to_string()).collect();
    delete_not_in(tx, "vehicles", "slot", case_id, &keep).await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO vehicles (
                id, case_id, slot, current_value, loan_balance, equity, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (case_id, slot) DO UPDATE SET
                current_value = excluded.current_value,
                loan_balance = excluded.loan_balance,
                equity = excluded.equity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(case_id.to_string())
        .bind(row.slot)
        .bind(row.current_value)
        .bind(row.loan_balance)
        .bind(row.equity)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn replace_real_properties(
    tx: &mut Transaction<'_, Sqlite>,
    case_id: Uuid,
    rows: &[RealProperty],
    now: &str,
) -> Result<()> {
    let keep: Vec<String> = rows.iter().map(|r| r.slot.to_string()).collect();
    delete_not_in(tx, "real_properties", "slot", case_id, &keep).await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO real_properties (
                id, case_id, slot, current_value, loan_balance, equity, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (case_id, slot) DO UPDATE SET
                current_value = excluded.current_value,
                loan_balance = excluded.loan_balance,
                equity = excluded.equity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(case_id.to_string())
        .bind(row.slot)
        .bind(row.current_value)
        .bind(row.loan_balance)
        .bind(row.equity)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Load employment rows for a case.
pub async fn load_employment(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<EmploymentRecord>> {
    let rows: Vec<(
        String,
        Option<String>,
        Option<String>,
        Option<f64>,
        Option<f64>,
        Option<String>,
        Option<f64>,
        Option<f64>,
        String,
    )> = sqlx::query_as(
        r#"
        SELECT role, employer, start_date, gross_income, net_income, pay_frequency,
               monthly_income, annual_income, source_map
        FROM employment_records
        WHERE case_id = ?
        ORDER BY role DESC
        "#,
    )
    .bind(case_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(
            |(role, employer, start, gross, net, freq, monthly, annual, source_map)| {
                Ok(EmploymentRecord {
                    role: PersonRole::parse(&role)
                        .ok_or_else(|| Error::Internal(format!("unknown role {role:?}")))?,
                    employer,
                    start_date: start
                        .as_deref()
                        .map(|d| {
                            NaiveDate::parse_from_str(d, DATE_FMT).map_err(|e| {
                                Error::Internal(format!("malformed date {d:?}: {e}"))
                            })
                        })
                        .transpose()?,
                    gross_income: gross,
                    net_income: net,
                    pay_frequency: freq.as_deref().and_then(PayFrequency::parse),
                    monthly_income: monthly,
                    annual_income: annual,
                    source_map: serde_json::from_str(&source_map).unwrap_or_default(),
                })
            },
        )
        .collect()
}

/// Load monthly expense rows for a case.
pub async fn load_monthly_expenses(
    pool: &SqlitePool,
    case_id: Uuid,
) -> Result<Vec<MonthlyExpenseRow>> {
    let rows: Vec<(String, String, f64, String, f64, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT category, expense_class, amount, frequency, monthly_amount, irs_standard
        FROM monthly_expenses
        WHERE case_id = ?
        ORDER BY category
        "#,
    )
    .bind(case_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(category, expense_class, amount, frequency, monthly_amount, irs_standard)| {
                MonthlyExpenseRow {
                    category,
                    expense_class,
                    amount,
                    frequency,
                    monthly_amount,
                    irs_standard,
                }
            },
        )
        .collect())
}

/// A stored monthly expense row as read back for calculations.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyExpenseRow {
    pub category: String,
    pub expense_class: String,
    pub amount: f64,
    pub frequency: String,
    pub monthly_amount: f64,
    pub irs_standard: Option<f64>,
}

/// Count stored rows per Gold table for a case (status reporting and tests).
pub async fn count_rows(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<(&'static str, i64)>> {
    let mut counts = Vec::new();
    for table in [
        "employment_records",
        "household_records",
        "income_sources",
        "monthly_expenses",
        "financial_accounts",
        "vehicles",
        "real_properties",
    ] {
        let (count,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM {table} WHERE case_id = ?"))
                .bind(case_id.to_string())
                .fetch_one(pool)
                .await?;
        counts.push((table, count));
    }
    Ok(counts)
}

/// Load stored income source rows for a case.
pub async fn load_income_sources(
    pool: &SqlitePool,
    case_id: Uuid,
) -> Result<Vec<IncomeSourceRow>> {
    let rows: Vec<(String, f64, String, f64, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT category, amount, frequency, monthly_amount, net_amount
        FROM income_sources
        WHERE case_id = ?
        ORDER BY category
        "#,
    )
    .bind(case_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(category, amount, frequency, monthly_amount, net_amount)| IncomeSourceRow {
            category,
            amount,
            frequency,
            monthly_amount,
            net_amount,
        })
        .collect())
}

/// A stored income source row as read back for calculations.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeSourceRow {
    pub category: String,
    pub amount: f64,
    pub frequency: String,
    pub monthly_amount: f64,
    pub net_amount: Option<f64>,
}
