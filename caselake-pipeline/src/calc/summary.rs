//! Per-case summary assembled from the other derived calculations

use super::{account_balance, csed_estimate, se_tax, se_taxable_total, CsedEstimate, CsedFallback};
use crate::models::{ActivityRow, IncomeDocument, TaxYearFacts, TollingEvent};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// One tax year's derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct YearSummary {
    pub tax_year: i32,
    pub return_filed: Option<bool>,
    pub filing_status: Option<String>,
    pub account_balance: f64,
    pub se_taxable_income: f64,
    pub se_tax: f64,
    pub csed: Option<CsedEstimate>,
}

/// Case-level rollup: monthly aggregates plus every known tax year.
#[derive(Debug, Clone, Serialize)]
pub struct CaseSummary {
    pub case_id: Uuid,
    pub case_number: String,
    pub total_monthly_income: f64,
    pub total_monthly_expenses: f64,
    pub disposable_income: f64,
    pub years: Vec<YearSummary>,
}

/// Assemble one year's summary from its loaded Silver rows. Pure.
pub fn build_year_summary(
    facts: &TaxYearFacts,
    activity: &[ActivityRow],
    documents: &[IncomeDocument],
    tolling: &[TollingEvent],
    return_filed_date: Option<NaiveDate>,
    today: NaiveDate,
    fallback: CsedFallback,
) -> YearSummary {
    let se_taxable_income = se_taxable_total(documents);
    YearSummary {
        tax_year: facts.tax_year,
        return_filed: facts.return_filed,
        filing_status: facts.filing_status.clone(),
        account_balance: account_balance(activity),
        se_tax: se_tax(se_taxable_income),
        se_taxable_income,
        csed: csed_estimate(
            return_filed_date.or(facts.return_filed_date),
            tolling,
            today,
            fallback,
        ),
    }
}
