//! Account-transcript resolution
//!
//! Walks the per-year record array, upserts one `tax_years` row per year,
//! inserts one classified `account_activity` row per transaction, and derives
//! statute tolling episodes by pairing tolling start/end codes.

use super::{alias, PipelineError, ResolutionReport};
use crate::db;
use crate::lookups::{LookupTables, TollingRule, TransactionRule};
use crate::models::{ActivityRow, BronzeRecord, TaxYearFacts, TollingEvent};
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

const CONTAINER_KEYS: &[&str] = &["at_records", "records", "data"];
const TRANSACTION_KEYS: &[&str] = &["transactions", "account_transactions"];

// Ordered alias table: per-year header fields
const YEAR: &[&str] = &["tax_year", "year", "period"];
const RETURN_FILED: &[&str] = &["return_filed", "filing_requirement"];
const FILING_STATUS: &[&str] = &["filing_status"];
const AGI: &[&str] = &["adjusted_gross_income", "agi"];
const TAXABLE_INCOME: &[&str] = &["taxable_income"];
const TAX_PER_RETURN: &[&str] = &["tax_per_return", "tax_liability"];
const ACCOUNT_BALANCE: &[&str] = &["total_balance", "account_balance", "balance"];

// Ordered alias table: transaction fields
const TX_CODE: &[&str] = &["code", "transaction_code"];
const TX_DATE: &[&str] = &["date", "transaction_date", "posted_date"];
const TX_EXPLANATION: &[&str] = &["description", "explanation", "meaning"];
const TX_AMOUNT: &[&str] = &["amount"];

pub(super) async fn resolve(
    pool: &SqlitePool,
    lookups: &dyn LookupTables,
    case_id: Uuid,
    record: &BronzeRecord,
) -> Result<ResolutionReport, PipelineError> {
    let records =
        alias::find_container(&record.payload, CONTAINER_KEYS).ok_or_else(|| {
            PipelineError::MissingContainer {
                tried: CONTAINER_KEYS.join(", "),
            }
        })?;

    let mut report = ResolutionReport::default();

    for year_record in records {
        let Some(tax_year) = alias::resolve_year(year_record, YEAR) else {
            warn!(bronze_id = %record.bronze_id, "transcript record without a tax year, skipped");
            continue;
        };

        let mut facts = TaxYearFacts {
            tax_year,
            return_filed: alias::resolve_filed(year_record, RETURN_FILED),
            filing_status: alias::resolve_text(year_record, FILING_STATUS),
            agi: alias::resolve_decimal(year_record, AGI),
            taxable_income: alias::resolve_decimal(year_record, TAXABLE_INCOME),
            tax_per_return: alias::resolve_decimal(year_record, TAX_PER_RETURN),
            account_balance: alias::resolve_decimal(year_record, ACCOUNT_BALANCE),
            return_filed_date: None,
        };

        let transactions = alias::find_container(year_record, TRANSACTION_KEYS)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        let mut marks: Vec<(String, NaiveDate)> = Vec::new();
        let mut activity_rows = 0u32;

        for transaction in transactions {
            let Some(row) = resolve_transaction(tax_year, transaction, lookups) else {
                warn!(
                    bronze_id = %record.bronze_id,
                    tax_year,
                    "transaction without a code, skipped"
                );
                continue;
            };

            if row.code == crate::lookups::transaction_rules::RETURN_FILED_CODE {
                if let Some(date) = row.activity_date {
                    facts.return_filed = Some(true);
                    facts.return_filed_date = Some(match facts.return_filed_date {
                        Some(existing) => existing.min(date),
                        None => date,
                    });
                }
            }

            if let Some(date) = row.activity_date {
                marks.push((row.code.clone(), date));
            }

            if db::silver::insert_activity(pool, case_id, record.bronze_id, &row).await? {
                activity_rows += 1;
            }
        }

        db::silver::upsert_tax_year(pool, case_id, record.bronze_id, &facts).await?;
        report.silver_rows += 1 + activity_rows;

        for event in derive_tolling_events(tax_year, &marks, lookups.tolling_rules()) {
            db::silver::upsert_tolling_event(pool, case_id, record.bronze_id, &event).await?;
            report.silver_rows += 1;
        }
    }

    Ok(report)
}

/// Resolve one transaction element; None when no code is present.
fn resolve_transaction(
    tax_year: i32,
    transaction: &Value,
    lookups: &dyn LookupTables,
) -> Option<ActivityRow> {
    let code = alias::resolve_text(transaction, TX_CODE)?;
    let rule = lookups
        .transaction_rule(&code)
        .cloned()
        .unwrap_or_else(TransactionRule::unknown);

    Some(ActivityRow {
        tax_year,
        activity_date: alias::resolve_date(transaction, TX_DATE),
        explanation: alias::resolve_text(transaction, TX_EXPLANATION),
        amount: alias::resolve_decimal(transaction, TX_AMOUNT),
        transaction_type: rule.transaction_type.as_str().to_string(),
        affects_balance: rule.affects_balance,
        affects_csed: rule.affects_csed,
        indicates_collection_action: rule.indicates_collection_action,
        balance_sign: rule.balance_sign,
        code,
    })
}

/// Pair tolling start/end codes into episodes.
///
/// Starts and ends are matched chronologically per category; an unmatched
/// start stays open (NULL end, days counted at evaluation time). Closed
/// episodes record span days plus the rule's statutory extra days.
pub(crate) fn derive_tolling_events(
    tax_year: i32,
    marks: &[(String, NaiveDate)],
    rules: &[TollingRule],
) -> Vec<TollingEvent> {
    let mut events = Vec::new();

    for rule in rules {
        let mut starts: Vec<NaiveDate> = marks
            .iter()
            .filter(|(code, _)| rule.start_codes.contains(&code.as_str()))
            .map(|(_, date)| *date)
            .collect();
        let mut ends: Vec<NaiveDate> = marks
            .iter()
            .filter(|(code, _)| rule.end_codes.contains(&code.as_str()))
            .map(|(_, date)| *date)
            .collect();
        starts.sort_unstable();
        ends.sort_unstable();

        let mut ends = ends.into_iter().peekable();
        for start in starts {
            // Consume ends that precede this start; they belong to no episode
            while ends.peek().is_some_and(|end| *end < start) {
                ends.next();
            }
            let end = ends.next();
            events.push(TollingEvent {
                tax_year,
                category: rule.category.to_string(),
                start_date: start,
                end_date: end,
                tolling_days: end
                    .map(|end| (end - start).num_days() + rule.extra_days),
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookups::tolling_rules;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn closed_episode_counts_span_plus_extra_days() {
        let marks = vec![
            ("520".to_string(), date(2018, 1, 10)),
            ("521".to_string(), date(2018, 7, 10)),
        ];
        let events = derive_tolling_events(2016, &marks, &tolling_rules::curated());
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.category, "bankruptcy");
        assert_eq!(event.end_date, Some(date(2018, 7, 10)));
        assert_eq!(event.tolling_days, Some(181 + 180));
    }

    #[test]
    fn unmatched_start_stays_open() {
        let marks = vec![("480".to_string(), date(2020, 3, 1))];
        let events = derive_tolling_events(2017, &marks, &tolling_rules::curated());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, "offer_in_compromise");
        assert_eq!(events[0].end_date, None);
        assert_eq!(events[0].tolling_days, None);
    }

    #[test]
    fn end_before_start_is_ignored() {
        let marks = vec![
            ("521".to_string(), date(2015, 1, 1)),
            ("520".to_string(), date(2016, 1, 1)),
        ];
        let events = derive_tolling_events(2014, &marks, &tolling_rules::curated());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start_date, date(2016, 1, 1));
        assert_eq!(events[0].end_date, None);
    }
}
