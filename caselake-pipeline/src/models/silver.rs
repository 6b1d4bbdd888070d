//! Silver layer types: typed rows resolved from Bronze documents
//!
//! Every Silver row carries a lineage reference (`bronze_id`) back to the raw
//! record that produced it; lineage is bound at the storage layer, so the
//! types here hold only the resolved business fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-year header facts resolved from a transcript record.
///
/// Upserted on (case, tax_year): a later transcript for the same year updates
/// the fields it carries and leaves the rest alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxYearFacts {
    pub tax_year: i32,
    pub return_filed: Option<bool>,
    pub filing_status: Option<String>,
    pub agi: Option<f64>,
    pub taxable_income: Option<f64>,
    pub tax_per_return: Option<f64>,
    pub account_balance: Option<f64>,
    pub return_filed_date: Option<NaiveDate>,
}

/// One account-transcript transaction, with its classification denormalized
/// from the transaction rule table at write time.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRow {
    pub tax_year: i32,
    pub activity_date: Option<NaiveDate>,
    pub code: String,
    pub explanation: Option<String>,
    pub amount: Option<f64>,
    pub transaction_type: String,
    pub affects_balance: bool,
    pub affects_csed: bool,
    pub indicates_collection_action: bool,
    /// +1 entries increase the balance owed, -1 entries (payments) reduce it
    pub balance_sign: i8,
}

/// One wage-and-income document (W-2, 1099, ...), classified via the form
/// rule table.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeDocument {
    pub tax_year: i32,
    pub document_type: String,
    pub gross_amount: Option<f64>,
    pub federal_withholding: Option<f64>,
    pub issuer_name: Option<String>,
    pub issuer_id: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_id: Option<String>,
    pub category: String,
    pub is_self_employment: bool,
    /// Analyst-controlled exclusion from income aggregation
    pub is_excluded: bool,
}

/// One line item from a return transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnLine {
    pub tax_year: i32,
    pub form_name: Option<String>,
    pub line_label: String,
    pub amount: Option<f64>,
}

/// One statute-tolling episode derived from paired transaction codes.
///
/// `tolling_days` is populated once the closing code is seen; an open episode
/// keeps NULL and accrues days up to the evaluation date at calculation time.
#[derive(Debug, Clone, PartialEq)]
pub struct TollingEvent {
    pub tax_year: i32,
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub tolling_days: Option<i64>,
}

// ---------------------------------------------------------------------------
// Interview facts (one wide row per case)
// ---------------------------------------------------------------------------

/// Per-person employment answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonEmployment {
    pub employer: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub gross_income: Option<f64>,
    pub net_income: Option<f64>,
    pub pay_frequency: Option<String>,
    pub monthly_income: Option<f64>,
}

impl PersonEmployment {
    /// True when the interview carried any answer for this person
    pub fn is_present(&self) -> bool {
        self.employer.is_some()
            || self.gross_income.is_some()
            || self.net_income.is_some()
            || self.monthly_income.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmploymentFacts {
    pub taxpayer: PersonEmployment,
    pub spouse: PersonEmployment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseholdFacts {
    pub household_members: Option<i64>,
    pub spouse_claimed: Option<String>,
    pub residency_length: Option<String>,
    pub occupancy_status: Option<String>,
    pub members_under_65: Option<i64>,
    pub members_over_65: Option<i64>,
    pub filing_status: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
}

/// A declared asset value with its outstanding loan, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetSlot {
    pub value: Option<f64>,
    pub loan: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetFacts {
    pub checking: AssetSlot,
    pub cash_on_hand: AssetSlot,
    pub investments: AssetSlot,
    pub life_insurance: AssetSlot,
    pub retirement: AssetSlot,
    pub real_estate: AssetSlot,
    pub vehicles: [AssetSlot; 4],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeFacts {
    pub taxpayer_wages: Option<f64>,
    pub taxpayer_social_security: Option<f64>,
    pub taxpayer_pension: Option<f64>,
    pub spouse_wages: Option<f64>,
    pub spouse_social_security: Option<f64>,
    pub spouse_pension: Option<f64>,
    pub dividends_interest: Option<f64>,
    pub rental_gross: Option<f64>,
    pub rental_expenses: Option<f64>,
    pub distributions: Option<f64>,
    pub alimony: Option<f64>,
    pub child_support: Option<f64>,
    pub other_income: Option<f64>,
    pub additional_income_1: Option<f64>,
    pub additional_income_2: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFacts {
    pub food: Option<f64>,
    pub housekeeping: Option<f64>,
    pub apparel: Option<f64>,
    pub personal_care: Option<f64>,
    pub miscellaneous: Option<f64>,
    pub mortgage_primary: Option<f64>,
    pub mortgage_secondary: Option<f64>,
    pub rent: Option<f64>,
    pub homeowner_insurance: Option<f64>,
    pub property_tax: Option<f64>,
    pub gas: Option<f64>,
    pub electricity: Option<f64>,
    pub water: Option<f64>,
    pub sewer: Option<f64>,
    pub cable: Option<f64>,
    pub trash: Option<f64>,
    pub phone: Option<f64>,
    pub health_insurance: Option<f64>,
    pub prescriptions: Option<f64>,
    pub copays: Option<f64>,
    pub current_taxes: Option<f64>,
    pub court_payments: Option<f64>,
    pub child_care: Option<f64>,
    pub whole_life_insurance: Option<f64>,
    pub term_life_insurance: Option<f64>,
    pub vehicle_operating: Option<f64>,
    pub public_transportation: Option<f64>,
    pub auto_insurance: Option<f64>,
    pub auto_payment_1: Option<f64>,
    pub auto_payment_2: Option<f64>,
}

/// IRS collection financial standards supplied alongside the interview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardsFacts {
    pub food: Option<f64>,
    pub housekeeping: Option<f64>,
    pub apparel: Option<f64>,
    pub personal_care: Option<f64>,
    pub miscellaneous: Option<f64>,
    pub national_total: Option<f64>,
    pub housing: Option<f64>,
    pub transportation: Option<f64>,
    pub total_monthly: Option<f64>,
    pub total_annual: Option<f64>,
}

/// The original nested interview sections, preserved verbatim alongside the
/// typed resolution for replay and audit.
#[derive(Debug, Clone, Default)]
pub struct InterviewSections {
    pub employment: Option<serde_json::Value>,
    pub household: Option<serde_json::Value>,
    pub assets: Option<serde_json::Value>,
    pub income: Option<serde_json::Value>,
    pub expenses: Option<serde_json::Value>,
    pub standards: Option<serde_json::Value>,
    pub payload: serde_json::Value,
}

/// The typed interview resolution for one case: the governing Silver row for
/// all Gold fan-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewFacts {
    pub employment: EmploymentFacts,
    pub household: HouseholdFacts,
    pub assets: AssetFacts,
    pub income: IncomeFacts,
    pub expenses: ExpenseFacts,
    pub standards: StandardsFacts,
}

impl InterviewFacts {
    /// Spouse data is considered present when any spouse employment or income
    /// answer exists
    pub fn has_spouse(&self) -> bool {
        self.employment.spouse.is_present()
            || self.income.spouse_wages.is_some()
            || self.income.spouse_social_security.is_some()
            || self.income.spouse_pension.is_some()
    }
}
