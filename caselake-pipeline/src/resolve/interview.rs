//! Interview resolution
//!
//! The interview payload carries named sections (employment, household,
//! assets, income, expenses, irs_standards). Older captures flatten answers
//! to spreadsheet cell references at the payload root, so every field's alias
//! list ends with its legacy cell key. The resolution produces the one wide
//! `interview_facts` row per case and then regenerates the Gold layer
//! synchronously.

use super::{alias, PipelineError, ResolutionReport};
use crate::db;
use crate::gold;
use crate::models::{
    AssetFacts, AssetSlot, BronzeRecord, EmploymentFacts, ExpenseFacts, HouseholdFacts,
    IncomeFacts, InterviewFacts, InterviewSections, PersonEmployment, StandardsFacts,
};
use serde_json::Value;
use sqlx::SqlitePool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Ordered alias tables: preferred section key first, legacy cell reference
// last.
// ---------------------------------------------------------------------------

// Employment (taxpayer b3-b7/al7, spouse c3-c7/al8)
const TP_EMPLOYER: &[&str] = &["employment.clientEmployer", "b3"];
const TP_START_DATE: &[&str] = &["employment.clientStartWorkingDate", "b4"];
const TP_GROSS_INCOME: &[&str] = &["employment.clientGrossIncome", "b5"];
const TP_NET_INCOME: &[&str] = &["employment.clientNetIncome", "b6"];
const TP_PAY_FREQUENCY: &[&str] = &["employment.clientFrequentlyPaid", "b7"];
const TP_MONTHLY_INCOME: &[&str] = &["employment.clientMonthlyIncome", "al7"];
const SP_EMPLOYER: &[&str] = &["employment.spouseEmployer", "c3"];
const SP_START_DATE: &[&str] = &["employment.spouseStartWorkingDate", "c4"];
const SP_GROSS_INCOME: &[&str] = &["employment.spouseGrossIncome", "c5"];
const SP_NET_INCOME: &[&str] = &["employment.spouseNetIncome", "c6"];
const SP_PAY_FREQUENCY: &[&str] = &["employment.spouseFrequentlyPaid", "c7"];
const SP_MONTHLY_INCOME: &[&str] = &["employment.spouseMonthlyIncome", "al8"];

// Household (b10-b14, b50-b53)
const HOUSEHOLD_MEMBERS: &[&str] = &["household.clientHouseMembers", "b10"];
const FILING_STATUS: &[&str] = &["household.clientNextTaxReturn", "b11"];
const SPOUSE_CLAIMED: &[&str] = &["household.clientSpouseClaim", "b12"];
const RESIDENCY_LENGTH: &[&str] = &["household.clientLengthofresidency", "b13"];
const OCCUPANCY_STATUS: &[&str] = &["household.clientOccupancyStatus", "b14"];
const MEMBERS_UNDER_65: &[&str] = &["household.under65", "b50"];
const MEMBERS_OVER_65: &[&str] = &["household.over65", "b51"];
const STATE: &[&str] = &["household.state", "b52"];
const COUNTY: &[&str] = &["household.county", "b53"];

// Assets (values b18-b27, loans d20-d27)
const CHECKING_VALUE: &[&str] = &["assets.checkingAccounts", "b18"];
const CHECKING_LOAN: &[&str] = &["assets.checkingLoans", "d20"];
const CASH_VALUE: &[&str] = &["assets.cashOnHand", "b19"];
const CASH_LOAN: &[&str] = &["assets.cashLoans", "d21"];
const INVESTMENTS_VALUE: &[&str] = &["assets.investments", "b20"];
const LIFE_INSURANCE_VALUE: &[&str] = &["assets.lifeInsurance", "b21"];
const RETIREMENT_VALUE: &[&str] = &["assets.retirement", "b22"];
const REAL_ESTATE_VALUE: &[&str] = &["assets.realEstateValue", "b23"];
const REAL_ESTATE_LOAN: &[&str] = &["assets.realEstateLoan", "d23"];
const VEHICLE_VALUES: [&[&str]; 4] = [
    &["assets.vehicle1Value", "b24"],
    &["assets.vehicle2Value", "b25"],
    &["assets.vehicle3Value", "b26"],
    &["assets.vehicle4Value", "b27"],
];
const VEHICLE_LOANS: [&[&str]; 4] = [
    &["assets.vehicle1Loan", "d24"],
    &["assets.vehicle2Loan", "d25"],
    &["assets.vehicle3Loan", "d26"],
    &["assets.vehicle4Loan", "d27"],
];

// Income (b33-b47)
const TP_WAGES: &[&str] = &["income.clientWages", "b33"];
const TP_SOCIAL_SECURITY: &[&str] = &["income.clientSocialSecurity", "b34"];
const TP_PENSION: &[&str] = &["income.clientPension", "b35"];
const SP_WAGES: &[&str] = &["income.spouseWages", "b36"];
const SP_SOCIAL_SECURITY: &[&str] = &["income.spouseSocialSecurity", "b37"];
const SP_PENSION: &[&str] = &["income.spousePension", "b38"];
const DIVIDENDS_INTEREST: &[&str] = &["income.dividendsInterest", "b39"];
const RENTAL_GROSS: &[&str] = &["income.rentalGross", "b40"];
const RENTAL_EXPENSES: &[&str] = &["income.rentalExpenses", "b41"];
const DISTRIBUTIONS: &[&str] = &["income.distributions", "b42"];
const ALIMONY: &[&str] = &["income.alimony", "b43"];
const CHILD_SUPPORT: &[&str] = &["income.childSupport", "b44"];
const OTHER_INCOME: &[&str] = &["income.otherIncome", "b45"];
const ADDITIONAL_INCOME_1: &[&str] = &["income.additional1", "b46"];
const ADDITIONAL_INCOME_2: &[&str] = &["income.additional2", "b47"];

// Expenses (b56-b90, ak2-ak8)
const FOOD: &[&str] = &["expenses.food", "b56"];
const HOUSEKEEPING: &[&str] = &["expenses.housekeeping", "b57"];
const APPAREL: &[&str] = &["expenses.apparel", "b58"];
const PERSONAL_CARE: &[&str] = &["expenses.personalCare", "b59"];
const MISCELLANEOUS: &[&str] = &["expenses.misc", "b60"];
const MORTGAGE_PRIMARY: &[&str] = &["expenses.mortgageLien1", "b64"];
const MORTGAGE_SECONDARY: &[&str] = &["expenses.mortgageLien2", "b65"];
const RENT: &[&str] = &["expenses.rent", "b66"];
const HOMEOWNER_INSURANCE: &[&str] = &["expenses.insurance", "b67"];
const PROPERTY_TAX: &[&str] = &["expenses.propertyTax", "b68"];
const GAS: &[&str] = &["expenses.gas", "b69"];
const ELECTRICITY: &[&str] = &["expenses.electricity", "b70"];
const WATER: &[&str] = &["expenses.water", "b71"];
const SEWER: &[&str] = &["expenses.sewer", "b72"];
const CABLE: &[&str] = &["expenses.cable", "b73"];
const TRASH: &[&str] = &["expenses.trash", "b74"];
const PHONE: &[&str] = &["expenses.phone", "b75"];
const HEALTH_INSURANCE: &[&str] = &["expenses.healthInsurance", "b79"];
const PRESCRIPTIONS: &[&str] = &["expenses.prescriptions", "b80"];
const COPAYS: &[&str] = &["expenses.copays", "b81"];
const CURRENT_TAXES: &[&str] = &["expenses.taxes", "b84"];
const COURT_PAYMENTS: &[&str] = &["expenses.courtPayments", "b87"];
const CHILD_CARE: &[&str] = &["expenses.childCare", "b88"];
const WHOLE_LIFE_INSURANCE: &[&str] = &["expenses.wholeLifeInsurance", "b89"];
const TERM_LIFE_INSURANCE: &[&str] = &["expenses.termLifeInsurance", "b90"];
const VEHICLE_OPERATING: &[&str] = &["expenses.transportation", "ak2"];
const PUBLIC_TRANSPORTATION: &[&str] = &["expenses.publicTransportation", "ak4"];
const AUTO_INSURANCE: &[&str] = &["expenses.autoInsurance", "ak6"];
const AUTO_PAYMENT_1: &[&str] = &["expenses.autoPayment1", "ak7"];
const AUTO_PAYMENT_2: &[&str] = &["expenses.autoPayment2", "ak8"];

// IRS collection standards (c56-c61, c76, c80, al4-al5)
const STD_FOOD: &[&str] = &["irs_standards.food", "c56"];
const STD_HOUSEKEEPING: &[&str] = &["irs_standards.housekeeping", "c57"];
const STD_APPAREL: &[&str] = &["irs_standards.apparel", "c58"];
const STD_PERSONAL_CARE: &[&str] = &["irs_standards.personalCare", "c59"];
const STD_MISCELLANEOUS: &[&str] = &["irs_standards.misc", "c60"];
const STD_NATIONAL_TOTAL: &[&str] = &["irs_standards.total", "c61"];
const STD_HOUSING: &[&str] = &["irs_standards.housing", "c76"];
const STD_TRANSPORTATION: &[&str] = &["irs_standards.transportation", "c80"];
const STD_TOTAL_MONTHLY: &[&str] = &["irs_standards.totalMonthly", "al4"];
const STD_TOTAL_ANNUAL: &[&str] = &["irs_standards.totalAnnual", "al5"];

pub(super) async fn resolve(
    pool: &SqlitePool,
    case_id: Uuid,
    record: &BronzeRecord,
) -> Result<ResolutionReport, PipelineError> {
    if !record.payload.is_object() {
        return Err(PipelineError::MalformedPayload(
            "interview payload is not an object".to_string(),
        ));
    }

    let facts = resolve_facts(&record.payload);
    let sections = InterviewSections {
        employment: record.payload.get("employment").cloned(),
        household: record.payload.get("household").cloned(),
        assets: record.payload.get("assets").cloned(),
        income: record.payload.get("income").cloned(),
        expenses: record.payload.get("expenses").cloned(),
        standards: record.payload.get("irs_standards").cloned(),
        payload: record.payload.clone(),
    };

    db::silver::upsert_interview_facts(pool, case_id, record.bronze_id, &facts, &sections).await?;

    let snapshot = gold::regenerate_for_case(pool, case_id, Some(&facts)).await?;

    Ok(ResolutionReport {
        silver_rows: 1,
        gold_refreshed: snapshot.is_some(),
    })
}

/// Resolve the full typed fact set from one interview payload. Pure; used
/// directly by tests.
pub fn resolve_facts(doc: &Value) -> InterviewFacts {
    InterviewFacts {
        employment: EmploymentFacts {
            taxpayer: PersonEmployment {
                employer: alias::resolve_text(doc, TP_EMPLOYER),
                start_date: alias::resolve_date(doc, TP_START_DATE),
                gross_income: alias::resolve_decimal(doc, TP_GROSS_INCOME),
                net_income: alias::resolve_decimal(doc, TP_NET_INCOME),
                pay_frequency: alias::resolve_text(doc, TP_PAY_FREQUENCY),
                monthly_income: alias::resolve_decimal(doc, TP_MONTHLY_INCOME),
            },
            spouse: PersonEmployment {
                employer: alias::resolve_text(doc, SP_EMPLOYER),
                start_date: alias::resolve_date(doc, SP_START_DATE),
                gross_income: alias::resolve_decimal(doc, SP_GROSS_INCOME),
                net_income: alias::resolve_decimal(doc, SP_NET_INCOME),
                pay_frequency: alias::resolve_text(doc, SP_PAY_FREQUENCY),
                monthly_income: alias::resolve_decimal(doc, SP_MONTHLY_INCOME),
            },
        },
        household: HouseholdFacts {
            household_members: alias::resolve_count(doc, HOUSEHOLD_MEMBERS),
            spouse_claimed: alias::resolve_text(doc, SPOUSE_CLAIMED),
            residency_length: alias::resolve_text(doc, RESIDENCY_LENGTH),
            occupancy_status: alias::resolve_text(doc, OCCUPANCY_STATUS),
            members_under_65: alias::resolve_count(doc, MEMBERS_UNDER_65),
            members_over_65: alias::resolve_count(doc, MEMBERS_OVER_65),
            filing_status: alias::resolve_text(doc, FILING_STATUS),
            state: alias::resolve_text(doc, STATE),
            county: alias::resolve_text(doc, COUNTY),
        },
        assets: AssetFacts {
            checking: slot(doc, CHECKING_VALUE, Some(CHECKING_LOAN)),
            cash_on_hand: slot(doc, CASH_VALUE, Some(CASH_LOAN)),
            investments: slot(doc, INVESTMENTS_VALUE, None),
            life_insurance: slot(doc, LIFE_INSURANCE_VALUE, None),
            retirement: slot(doc, RETIREMENT_VALUE, None),
            real_estate: slot(doc, REAL_ESTATE_VALUE, Some(REAL_ESTATE_LOAN)),
            vehicles: std::array::from_fn(|i| slot(doc, VEHICLE_VALUES[i], Some(VEHICLE_LOANS[i]))),
        },
        income: IncomeFacts {
            taxpayer_wages: alias::resolve_decimal(doc, TP_WAGES),
            taxpayer_social_security: alias::resolve_decimal(doc, TP_SOCIAL_SECURITY),
            taxpayer_pension: alias::resolve_decimal(doc, TP_PENSION),
            spouse_wages: alias::resolve_decimal(doc, SP_WAGES),
            spouse_social_security: alias::resolve_decimal(doc, SP_SOCIAL_SECURITY),
            spouse_pension: alias::resolve_decimal(doc, SP_PENSION),
            dividends_interest: alias::resolve_decimal(doc, DIVIDENDS_INTEREST),
            rental_gross: alias::resolve_decimal(doc, RENTAL_GROSS),
            rental_expenses: alias::resolve_decimal(doc, RENTAL_EXPENSES),
            distributions: alias::resolve_decimal(doc, DISTRIBUTIONS),
            alimony: alias::resolve_decimal(doc, ALIMONY),
            child_support: alias::resolve_decimal(doc, CHILD_SUPPORT),
            other_income: alias::resolve_decimal(doc, OTHER_INCOME),
            additional_income_1: alias::resolve_decimal(doc, ADDITIONAL_INCOME_1),
            additional_income_2: alias::resolve_decimal(doc, ADDITIONAL_INCOME_2),
        },
        expenses: ExpenseFacts {
            food: alias::resolve_decimal(doc, FOOD),
            housekeeping: alias::resolve_decimal(doc, HOUSEKEEPING),
            apparel: alias::resolve_decimal(doc, APPAREL),
            personal_care: alias::resolve_decimal(doc, PERSONAL_CARE),
            miscellaneous: alias::resolve_decimal(doc, MISCELLANEOUS),
            mortgage_primary: alias::resolve_decimal(doc, MORTGAGE_PRIMARY),
            mortgage_secondary: alias::resolve_decimal(doc, MORTGAGE_SECONDARY),
            rent: alias::resolve_decimal(doc, RENT),
            homeowner_insurance: alias::resolve_decimal(doc, HOMEOWNER_INSURANCE),
            property_tax: alias::resolve_decimal(doc, PROPERTY_TAX),
            gas: alias::resolve_decimal(doc, GAS),
            electricity: alias::resolve_decimal(doc, ELECTRICITY),
            water: alias::resolve_decimal(doc, WATER),
            sewer: alias::resolve_decimal(doc, SEWER),
            cable: alias::resolve_decimal(doc, CABLE),
            trash: alias::resolve_decimal(doc, TRASH),
            phone: alias::resolve_decimal(doc, PHONE),
            health_insurance: alias::resolve_decimal(doc, HEALTH_INSURANCE),
            prescriptions: alias::resolve_decimal(doc, PRESCRIPTIONS),
            copays: alias::resolve_decimal(doc, COPAYS),
            current_taxes: alias::resolve_decimal(doc, CURRENT_TAXES),
            court_payments: alias::resolve_decimal(doc, COURT_PAYMENTS),
            child_care: alias::resolve_decimal(doc, CHILD_CARE),
            whole_life_insurance: alias::resolve_decimal(doc, WHOLE_LIFE_INSURANCE),
            term_life_insurance: alias::resolve_decimal(doc, TERM_LIFE_INSURANCE),
            vehicle_operating: alias::resolve_decimal(doc, VEHICLE_OPERATING),
            public_transportation: alias::resolve_decimal(doc, PUBLIC_TRANSPORTATION),
            auto_insurance: alias::resolve_decimal(doc, AUTO_INSURANCE),
            auto_payment_1: alias::resolve_decimal(doc, AUTO_PAYMENT_1),
            auto_payment_2: alias::resolve_decimal(doc, AUTO_PAYMENT_2),
        },
        standards: StandardsFacts {
            food: alias::resolve_decimal(doc, STD_FOOD),
            housekeeping: alias::resolve_decimal(doc, STD_HOUSEKEEPING),
            apparel: alias::resolve_decimal(doc, STD_APPAREL),
            personal_care: alias::resolve_decimal(doc, STD_PERSONAL_CARE),
            miscellaneous: alias::resolve_decimal(doc, STD_MISCELLANEOUS),
            national_total: alias::resolve_decimal(doc, STD_NATIONAL_TOTAL),
            housing: alias::resolve_decimal(doc, STD_HOUSING),
            transportation: alias::resolve_decimal(doc, STD_TRANSPORTATION),
            total_monthly: alias::resolve_decimal(doc, STD_TOTAL_MONTHLY),
            total_annual: alias::resolve_decimal(doc, STD_TOTAL_ANNUAL),
        },
    }
}

fn slot(doc: &Value, value_aliases: &[&str], loan_aliases: Option<&[&str]>) -> AssetSlot {
    AssetSlot {
        value: alias::resolve_decimal(doc, value_aliases),
        loan: loan_aliases.and_then(|aliases| alias::resolve_decimal(doc, aliases)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn section_keys_take_precedence_over_cell_references() {
        let doc = json!({
            "employment": {"clientGrossIncome": "5,000", "clientEmployer": "Acme"},
            "b5": 1111,
            "b3": "Legacy Employer"
        });
        let facts = resolve_facts(&doc);
        assert_eq!(facts.employment.taxpayer.gross_income, Some(5000.0));
        assert_eq!(
            facts.employment.taxpayer.employer.as_deref(),
            Some("Acme")
        );
    }

    #[test]
    fn cell_references_resolve_when_sections_absent() {
        let doc = json!({"b5": "2,500", "b10": "3", "b56": 600});
        let facts = resolve_facts(&doc);
        assert_eq!(facts.employment.taxpayer.gross_income, Some(2500.0));
        assert_eq!(facts.household.household_members, Some(3));
        assert_eq!(facts.expenses.food, Some(600.0));
    }

    #[test]
    fn missing_fields_resolve_to_none() {
        let facts = resolve_facts(&json!({}));
        assert_eq!(facts, InterviewFacts::default());
        assert!(!facts.has_spouse());
    }

    #[test]
    fn vehicle_slots_pair_values_with_loans() {
        let doc = json!({
            "assets": {"vehicle1Value": 12000, "vehicle1Loan": 8000, "vehicle3Value": 4000}
        });
        let facts = resolve_facts(&doc);
        assert_eq!(facts.assets.vehicles[0].value, Some(12000.0));
        assert_eq!(facts.assets.vehicles[0].loan, Some(8000.0));
        assert_eq!(facts.assets.vehicles[2].value, Some(4000.0));
        assert_eq!(facts.assets.vehicles[2].loan, None);
        assert_eq!(facts.assets.vehicles[3].value, None);
    }
}
