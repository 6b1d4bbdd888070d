//! Silver row storage
//!
//! Transcript rows are written one at a time with natural-key upserts or
//! dedup-key INSERT OR IGNORE, so replaying a Bronze record re-confirms
//! existing rows instead of duplicating them, and a mid-record failure leaves
//! already-committed rows in place.

use crate::models::{
    ActivityRow, IncomeDocument, InterviewFacts, InterviewSections, ReturnLine, TaxYearFacts,
    TollingEvent,
};
use caselake_common::{Error, Result};
use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

const DATE_FMT: &str = "%Y-%m-%d";

/// Content hash used as the replay-dedup key for transcript sub-rows.
fn dedup_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FMT).to_string())
        .unwrap_or_default()
}

fn parse_date_col(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FMT)
        .map_err(|e| Error::Internal(format!("malformed date {raw:?}: {e}")))
}

/// Upsert per-year header facts on (case, tax_year). Fields absent from the
/// new resolution keep their previously stored values.
pub async fn upsert_tax_year(
    pool: &SqlitePool,
    case_id: Uuid,
    bronze_id: Uuid,
    facts: &TaxYearFacts,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tax_years (
            id, case_id, tax_year, return_filed, filing_status, agi, taxable_income,
            tax_per_return, account_balance, return_filed_date, bronze_id, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (case_id, tax_year) DO UPDATE SET
            return_filed = COALESCE(excluded.return_filed, tax_years.return_filed),
            filing_status = COALESCE(excluded.filing_status, tax_years.filing_status),
            agi = COALESCE(excluded.agi, tax_years.agi),
            taxable_income = COALESCE(excluded.taxable_income, tax_years.taxable_income),
            tax_per_return = COALESCE(excluded.tax_per_return, tax_years.tax_per_return),
            account_balance = COALESCE(excluded.account_balance, tax_years.account_balance),
            return_filed_date = COALESCE(excluded.return_filed_date, tax_years.return_filed_date),
            bronze_id = excluded.bronze_id,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(case_id.to_string())
    .bind(facts.tax_year)
    .bind(facts.return_filed)
    .bind(facts.filing_status.as_deref())
    .bind(facts.agi)
    .bind(facts.taxable_income)
    .bind(facts.tax_per_return)
    .bind(facts.account_balance)
    .bind(facts.return_filed_date.map(|d| d.format(DATE_FMT).to_string()))
    .bind(bronze_id.to_string())
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert one account transaction. Returns false when the dedup key shows the
/// row was already present (replay).
pub async fn insert_activity(
    pool: &SqlitePool,
    case_id: Uuid,
    bronze_id: Uuid,
    row: &ActivityRow,
) -> Result<bool> {
    let key = dedup_key(&[
        &case_id.to_string(),
        &row.tax_year.to_string(),
        &row.code,
        &fmt_date(row.activity_date),
        &row.amount.map(|a| a.to_string()).unwrap_or_default(),
        row.explanation.as_deref().unwrap_or_default(),
    ]);

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO account_activity (
            id, case_id, tax_year, activity_date, code, explanation, amount,
            transaction_type, affects_balance, affects_csed,
            indicates_collection_action, balance_sign, bronze_id, dedup_key
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(case_id.to_string())
    .bind(row.tax_year)
    .bind(row.activity_date.map(|d| d.format(DATE_FMT).to_string()))
    .bind(&row.code)
    .bind(row.explanation.as_deref())
    .bind(row.amount)
    .bind(&row.transaction_type)
    .bind(row.affects_balance)
    .bind(row.affects_csed)
    .bind(row.indicates_collection_action)
    .bind(row.balance_sign as i32)
    .bind(bronze_id.to_string())
    .bind(key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert one wage-and-income document, dedup-keyed on its identifying
/// content.
pub async fn insert_income_document(
    pool: &SqlitePool,
    case_id: Uuid,
    bronze_id: Uuid,
    doc: &IncomeDocument,
) -> Result<bool> {
    let key = dedup_key(&[
        &case_id.to_string(),
        &doc.tax_year.to_string(),
        &doc.document_type,
        &doc.gross_amount.map(|a| a.to_string()).unwrap_or_default(),
        doc.issuer_name.as_deref().unwrap_or_default(),
        doc.issuer_id.as_deref().unwrap_or_default(),
        doc.recipient_id.as_deref().unwrap_or_default(),
    ]);

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO income_documents (
            id, case_id, tax_year, document_type, gross_amount, federal_withholding,
            issuer_name, issuer_id, recipient_name, recipient_id,
            category, is_self_employment, is_excluded, bronze_id, dedup_key
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(case_id.to_string())
    .bind(doc.tax_year)
    .bind(&doc.document_type)
    .bind(doc.gross_amount)
    .bind(doc.federal_withholding)
    .bind(doc.issuer_name.as_deref())
    .bind(doc.issuer_id.as_deref())
    .bind(doc.recipient_name.as_deref())
    .bind(doc.recipient_id.as_deref())
    .bind(&doc.category)
    .bind(doc.is_self_employment)
    .bind(doc.is_excluded)
    .bind(bronze_id.to_string())
    .bind(key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert one return-transcript line.
pub async fn insert_return_line(
    pool: &SqlitePool,
    case_id: Uuid,
    bronze_id: Uuid,
    line: &ReturnLine,
) -> Result<bool> {
    let key = dedup_key(&[
        &case_id.to_string(),
        &line.tax_year.to_string(),
        line.form_name.as_deref().unwrap_or_default(),
        &line.line_label,
    ]);

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO return_lines (
            id, case_id, tax_year, form_name, line_label, amount, bronze_id, dedup_key
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(case_id.to_string())
    .bind(line.tax_year)
    .bind(line.form_name.as_deref())
    .bind(&line.line_label)
    .bind(line.amount)
    .bind(bronze_id.to_string())
    .bind(key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Upsert one tolling episode, keyed on (case, year, category, start). A
/// replay that sees the closing code updates the stored end date and day
/// count in place.
pub async fn upsert_tolling_event(
    pool: &SqlitePool,
    case_id: Uuid,
    bronze_id: Uuid,
    event: &TollingEvent,
) -> Result<()> {
    let key = dedup_key(&[
        &case_id.to_string(),
        &event.tax_year.to_string(),
        &event.category,
        &event.start_date.format(DATE_FMT).to_string(),
    ]);

    sqlx::query(
        r#"
        INSERT INTO tolling_events (
            id, case_id, tax_year, category, start_date, end_date, tolling_days,
            bronze_id, dedup_key
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (dedup_key) DO UPDATE SET
            end_date = excluded.end_date,
            tolling_days = excluded.tolling_days,
            bronze_id = excluded.bronze_id
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(case_id.to_string())
    .bind(event.tax_year)
    .bind(&event.category)
    .bind(event.start_date.format(DATE_FMT).to_string())
    .bind(event.end_date.map(|d| d.format(DATE_FMT).to_string()))
    .bind(event.tolling_days)
    .bind(bronze_id.to_string())
    .bind(key)
    .execute(pool)
    .await?;

    Ok(())
}

/// Upsert the wide interview row for a case: the typed resolution plus the
/// original sections verbatim.
pub async fn upsert_interview_facts(
    pool: &SqlitePool,
    case_id: Uuid,
    bronze_id: Uuid,
    facts: &InterviewFacts,
    sections: &InterviewSections,
) -> Result<()> {
    let resolved = serde_json::to_string(facts)
        .map_err(|e| Error::Internal(format!("interview facts serialization: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO interview_facts (
            case_id, bronze_id, resolved, employment_json, household_json, assets_json,
            income_json, expenses_json, standards_json, payload_json, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (case_id) DO UPDATE SET
            bronze_id = excluded.bronze_id,
            resolved = excluded.resolved,
            employment_json = excluded.employment_json,
            household_json = excluded.household_json,
            assets_json = excluded.assets_json,
            income_json = excluded.income_json,
            expenses_json = excluded.expenses_json,
            standards_json = excluded.standards_json,
            payload_json = excluded.payload_json,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(case_id.to_string())
    .bind(bronze_id.to_string())
    .bind(resolved)
    .bind(sections.employment.as_ref().map(|v| v.to_string()))
    .bind(sections.household.as_ref().map(|v| v.to_string()))
    .bind(sections.assets.as_ref().map(|v| v.to_string()))
    .bind(sections.income.as_ref().map(|v| v.to_string()))
    .bind(sections.expenses.as_ref().map(|v| v.to_string()))
    .bind(sections.standards.as_ref().map(|v| v.to_string()))
    .bind(sections.payload.to_string())
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the governing interview row for a case, if any.
pub async fn load_interview_facts(
    pool: &SqlitePool,
    case_id: Uuid,
) -> Result<Option<InterviewFacts>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT resolved FROM interview_facts WHERE case_id = ?")
            .bind(case_id.to_string())
            .fetch_optional(pool)
            .await?;

    row.map(|(resolved,)| {
        serde_json::from_str(&resolved)
            .map_err(|e| Error::Internal(format!("stored interview facts: {e}")))
    })
    .transpose()
}

/// Load account activity for a case and tax year.
pub async fn load_activity(
    pool: &SqlitePool,
    case_id: Uuid,
    tax_year: i32,
) -> Result<Vec<ActivityRow>> {
    let rows: Vec<(
        i64,
        Option<String>,
        String,
        Option<String>,
        Option<f64>,
        String,
        bool,
        bool,
        bool,
        i64,
    )> = sqlx::query_as(
        r#"
        SELECT tax_year, activity_date, code, explanation, amount, transaction_type,
               affects_balance, affects_csed, indicates_collection_action, balance_sign
        FROM account_activity
        WHERE case_id = ? AND tax_year = ?
        ORDER BY activity_date, code
        "#,
    )
    .bind(case_id.to_string())
    .bind(tax_year)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(
            |(year, date, code, explanation, amount, ttype, bal, csed, coll, sign)| {
                Ok(ActivityRow {
                    tax_year: year as i32,
                    activity_date: date.as_deref().map(parse_date_col).transpose()?,
                    code,
                    explanation,
                    amount,
                    transaction_type: ttype,
                    affects_balance: bal,
                    affects_csed: csed,
                    indicates_collection_action: coll,
                    balance_sign: sign as i8,
                })
            },
        )
        .collect()
}

/// Load income documents for a case and tax year.
pub async fn load_income_documents(
    pool: &SqlitePool,
    case_id: Uuid,
    tax_year: i32,
) -> Result<Vec<IncomeDocument>> {
    let rows: Vec<(
        i64,
        String,
        Option<f64>,
        Option<f64>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        String,
        bool,
        bool,
    )> = sqlx::query_as(
        r#"
        SELECT tax_year, document_type, gross_amount, federal_withholding,
               issuer_name, issuer_id, recipient_name, recipient_id,
               category, is_self_employment, is_excluded
        FROM income_documents
        WHERE case_id = ? AND tax_year = ?
        ORDER BY document_type, issuer_name
        "#,
    )
    .bind(case_id.to_string())
    .bind(tax_year)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(year, dtype, gross, withheld, iname, iid, rname, rid, category, se, excluded)| {
                IncomeDocument {
                    tax_year: year as i32,
                    document_type: dtype,
                    gross_amount: gross,
                    federal_withholding: withheld,
                    issuer_name: iname,
                    issuer_id: iid,
                    recipient_name: rname,
                    recipient_id: rid,
                    category,
                    is_self_employment: se,
                    is_excluded: excluded,
                }
            },
        )
        .collect())
}

/// Load tolling events for a case and tax year.
pub async fn load_tolling_events(
    pool: &SqlitePool,
    case_id: Uuid,
    tax_year: i32,
) -> Result<Vec<TollingEvent>> {
    let rows: Vec<(i64, String, String, Option<String>, Option<i64>)> = sqlx::query_as(
        r#"
        SELECT tax_year, category, start_date, end_date, tolling_days
        FROM tolling_events
        WHERE case_id = ? AND tax_year = ?
        ORDER BY start_date
        "#,
    )
    .bind(case_id.to_string())
    .bind(tax_year)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(year, category, start, end, days)| {
            Ok(TollingEvent {
                tax_year: year as i32,
                category,
                start_date: parse_date_col(&start)?,
                end_date: end.as_deref().map(parse_date_col).transpose()?,
                tolling_days: days,
            })
        })
        .collect()
}

/// Load per-year header facts for a case (ascending year order).
pub async fn load_tax_years(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<TaxYearFacts>> {
    let rows: Vec<(
        i64,
        Option<bool>,
        Option<String>,
        Option<f64>,
        Option<f64>,
        Option<f64>,
        Option<f64>,
        Option<String>,
    )> = sqlx::query_as(
        r#"
        SELECT tax_year, return_filed, filing_status, agi, taxable_income,
               tax_per_return, account_balance, return_filed_date
        FROM tax_years
        WHERE case_id = ?
        ORDER BY tax_year
        "#,
    )
    .bind(case_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(
            |(year, filed, status, agi, taxable, per_return, balance, filed_date)| {
                Ok(TaxYearFacts {
                    tax_year: year as i32,
                    return_filed: filed,
                    filing_status: status,
                    agi,
                    taxable_income: taxable,
                    tax_per_return: per_return,
                    account_balance: balance,
                    return_filed_date: filed_date.as_deref().map(parse_date_col).transpose()?,
                })
            },
        )
        .collect()
}

/// Earliest return-filed transaction date for a case/year, if any.
pub async fn return_filed_date(
    pool: &SqlitePool,
    case_id: Uuid,
    tax_year: i32,
) -> Result<Option<NaiveDate>> {
    let row: Option<(Option<String>,)> = sqlx::query_as(
        "SELECT MIN(activity_date) FROM account_activity
         WHERE case_id = ? AND tax_year = ? AND code = ? AND activity_date IS NOT NULL",
    )
    .bind(case_id.to_string())
    .bind(tax_year)
    .bind(crate::lookups::transaction_rules::RETURN_FILED_CODE)
    .fetch_optional(pool)
    .await?;

    row.and_then(|(date,)| date)
        .as_deref()
        .map(parse_date_col)
        .transpose()
}
