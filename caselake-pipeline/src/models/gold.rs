//! Gold layer types: normalized per-case business entities
//!
//! Every Gold row is derivable purely from the case's current interview facts
//! plus the lookup tables; derived numeric fields (equity, normalized monthly
//! amount, net rental income) are computed here and never stored as inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Round to cents. Applied wherever a derived dollar amount is produced.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Person role on a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonRole {
    Taxpayer,
    Spouse,
}

impl PersonRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonRole::Taxpayer => "taxpayer",
            PersonRole::Spouse => "spouse",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "taxpayer" => Some(PersonRole::Taxpayer),
            "spouse" => Some(PersonRole::Spouse),
            _ => None,
        }
    }
}

/// Declared payment frequency, normalized from free-form interview answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayFrequency {
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
    Quarterly,
    Annual,
}

impl PayFrequency {
    /// Parse a declared frequency string. Unrecognized values yield None so
    /// the caller can apply its documented default.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "weekly" | "week" | "everyweek" => Some(PayFrequency::Weekly),
            "biweekly" | "every2weeks" | "everytwoweeks" => Some(PayFrequency::Biweekly),
            "semimonthly" | "twicemonthly" | "twiceamonth" => Some(PayFrequency::Semimonthly),
            "monthly" | "month" => Some(PayFrequency::Monthly),
            "quarterly" | "quarter" => Some(PayFrequency::Quarterly),
            "annual" | "annually" | "yearly" | "year" => Some(PayFrequency::Annual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayFrequency::Weekly => "weekly",
            PayFrequency::Biweekly => "biweekly",
            PayFrequency::Semimonthly => "semimonthly",
            PayFrequency::Monthly => "monthly",
            PayFrequency::Quarterly => "quarterly",
            PayFrequency::Annual => "annual",
        }
    }
}

/// Convert an amount declared at `frequency` to a monthly amount using the
/// fixed conversion table, rounded to cents:
/// weekly ×4.33, biweekly ×2.17, semimonthly ×2, monthly ×1, quarterly ÷3,
/// annual ÷12.
pub fn normalized_monthly(amount: f64, frequency: PayFrequency) -> f64 {
    let monthly = match frequency {
        PayFrequency::Weekly => amount * 4.33,
        PayFrequency::Biweekly => amount * 2.17,
        PayFrequency::Semimonthly => amount * 2.0,
        PayFrequency::Monthly => amount,
        PayFrequency::Quarterly => amount / 3.0,
        PayFrequency::Annual => amount / 12.0,
    };
    round2(monthly)
}

/// One employment row per person role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentRecord {
    pub role: PersonRole,
    pub employer: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub gross_income: Option<f64>,
    pub net_income: Option<f64>,
    pub pay_frequency: Option<PayFrequency>,
    pub monthly_income: Option<f64>,
    pub annual_income: Option<f64>,
    /// Audit map of output field → source field that fed it
    pub source_map: std::collections::BTreeMap<String, String>,
}

/// One household row per case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdRecord {
    pub household_members: i64,
    pub members_under_65: Option<i64>,
    pub members_over_65: Option<i64>,
    pub occupancy_status: Option<String>,
    pub residency_length: Option<String>,
    pub filing_status: String,
    pub state: Option<String>,
    pub county: Option<String>,
}

/// Typed income source categories fanned out from the interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeCategory {
    TaxpayerWages,
    TaxpayerSocialSecurity,
    TaxpayerPension,
    SpouseWages,
    SpouseSocialSecurity,
    SpousePension,
    DividendsInterest,
    Rental,
    Distributions,
    Alimony,
    ChildSupport,
    Other,
    Additional1,
    Additional2,
}

impl IncomeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeCategory::TaxpayerWages => "taxpayer_wages",
            IncomeCategory::TaxpayerSocialSecurity => "taxpayer_social_security",
            IncomeCategory::TaxpayerPension => "taxpayer_pension",
            IncomeCategory::SpouseWages => "spouse_wages",
            IncomeCategory::SpouseSocialSecurity => "spouse_social_security",
            IncomeCategory::SpousePension => "spouse_pension",
            IncomeCategory::DividendsInterest => "dividends_interest",
            IncomeCategory::Rental => "rental",
            IncomeCategory::Distributions => "distributions",
            IncomeCategory::Alimony => "alimony",
            IncomeCategory::ChildSupport => "child_support",
            IncomeCategory::Other => "other",
            IncomeCategory::Additional1 => "additional_1",
            IncomeCategory::Additional2 => "additional_2",
        }
    }
}

/// One income source row: declared amount plus its monthly normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub category: IncomeCategory,
    pub amount: f64,
    pub frequency: PayFrequency,
    pub monthly_amount: f64,
    /// Rental only: gross minus declared rental expenses
    pub net_amount: Option<f64>,
}

/// IRS collection-standard grouping for expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseClass {
    /// National standards: food, clothing and other items
    National,
    Housing,
    Transportation,
    Medical,
    Other,
}

impl ExpenseClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseClass::National => "national",
            ExpenseClass::Housing => "housing",
            ExpenseClass::Transportation => "transportation",
            ExpenseClass::Medical => "medical",
            ExpenseClass::Other => "other",
        }
    }
}

/// One categorized monthly expense row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpense {
    pub category: String,
    pub expense_class: ExpenseClass,
    pub amount: f64,
    pub frequency: PayFrequency,
    pub monthly_amount: f64,
    /// IRS standard allowance for the category, when the interview supplied one
    pub irs_standard: Option<f64>,
}

/// Financial account kinds fanned out from the interview asset section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    Checking,
    CashOnHand,
    Investments,
    LifeInsurance,
    Retirement,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Checking => "checking",
            AccountKind::CashOnHand => "cash_on_hand",
            AccountKind::Investments => "investments",
            AccountKind::LifeInsurance => "life_insurance",
            AccountKind::Retirement => "retirement",
        }
    }
}

/// One financial account row; equity is always computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAccount {
    pub kind: AccountKind,
    pub current_value: f64,
    pub loan_balance: f64,
    pub equity: f64,
}

/// One vehicle row per populated vehicle slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub slot: i64,
    pub current_value: f64,
    pub loan_balance: f64,
    pub equity: f64,
}

/// One real property row per populated property slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealProperty {
    pub slot: i64,
    pub current_value: f64,
    pub loan_balance: f64,
    pub equity: f64,
}

/// The complete Gold state for one case, as produced by one fan-out run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoldSnapshot {
    pub employment: Vec<EmploymentRecord>,
    pub household: Option<HouseholdRecord>,
    pub income_sources: Vec<IncomeSource>,
    pub monthly_expenses: Vec<MonthlyExpense>,
    pub financial_accounts: Vec<FinancialAccount>,
    pub vehicles: Vec<Vehicle>,
    pub real_properties: Vec<RealProperty>,
}

impl GoldSnapshot {
    pub fn row_count(&self) -> usize {
        self.employment.len()
            + usize::from(self.household.is_some())
            + self.income_sources.len()
            + self.monthly_expenses.len()
            + self.financial_accounts.len()
            + self.vehicles.len()
            + self.real_properties.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_normalization_table() {
        assert_eq!(normalized_monthly(100.0, PayFrequency::Weekly), 433.0);
        assert_eq!(normalized_monthly(100.0, PayFrequency::Biweekly), 217.0);
        assert_eq!(normalized_monthly(100.0, PayFrequency::Semimonthly), 200.0);
        assert_eq!(normalized_monthly(100.0, PayFrequency::Monthly), 100.0);
        assert_eq!(normalized_monthly(300.0, PayFrequency::Quarterly), 100.0);
        assert_eq!(normalized_monthly(1200.0, PayFrequency::Annual), 100.0);
    }

    #[test]
    fn quarterly_rounds_to_cents() {
        assert_eq!(normalized_monthly(100.0, PayFrequency::Quarterly), 33.33);
    }

    #[test]
    fn frequency_parsing_accepts_variants() {
        assert_eq!(PayFrequency::parse("Bi-Weekly"), Some(PayFrequency::Biweekly));
        assert_eq!(PayFrequency::parse("semi-monthly"), Some(PayFrequency::Semimonthly));
        assert_eq!(PayFrequency::parse(" ANNUALLY "), Some(PayFrequency::Annual));
        assert_eq!(PayFrequency::parse("fortnightly"), None);
    }
}
