//! Wage-and-income transcript resolution
//!
//! Providers ship this payload in two shapes: a flat form array (each form
//! carrying its own tax year) or a `years_data` map keyed by year. Both fan
//! out to one `income_documents` row per form, classified via the form rule
//! table.

use super::{alias, PipelineError, ResolutionReport};
use crate::db;
use crate::lookups::{FormRule, LookupTables};
use crate::models::{BronzeRecord, IncomeDocument, TaxYearFacts};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

const CONTAINER_KEYS: &[&str] = &["forms", "data", "records"];
const YEARS_MAP_KEY: &str = "years_data";

// Ordered alias table: form fields. `Form` may be a bare string or a nested
// object, so the object paths come first.
const FORM_TYPE: &[&str] = &[
    "Form.Type",
    "Form.Code",
    "Form",
    "form_type",
    "document_type",
    "type",
];
const YEAR: &[&str] = &["tax_year", "year"];
const GROSS: &[&str] = &["Income", "gross_amount", "gross", "wages", "Fields.Income"];
const WITHHOLDING: &[&str] = &[
    "Withholding",
    "federal_withholding",
    "federal",
    "Fields.Withholding",
];
const ISSUER_NAME: &[&str] = &[
    "Issuer.Name",
    "issuer_name",
    "employer_name",
    "payer_name",
    "Fields.PayerName",
    "Fields.EmployerName",
];
const ISSUER_ID: &[&str] = &[
    "Issuer.EIN",
    "issuer_ein",
    "ein",
    "Fields.PayerEIN",
    "Fields.EmployerEIN",
];
const RECIPIENT_NAME: &[&str] = &[
    "Recipient.Name",
    "recipient_name",
    "employee_name",
    "Fields.RecipientName",
    "Fields.EmployeeName",
];
const RECIPIENT_ID: &[&str] = &[
    "Recipient.SSN",
    "recipient_ssn",
    "ssn",
    "Fields.RecipientSSN",
    "Fields.EmployeeSSN",
];

pub(super) async fn resolve(
    pool: &SqlitePool,
    lookups: &dyn LookupTables,
    case_id: Uuid,
    record: &BronzeRecord,
) -> Result<ResolutionReport, PipelineError> {
    let mut report = ResolutionReport::default();

    if let Some(forms) = alias::find_container(&record.payload, CONTAINER_KEYS) {
        for form in forms {
            let Some(tax_year) = alias::resolve_year(form, YEAR) else {
                warn!(bronze_id = %record.bronze_id, "form without a tax year, skipped");
                continue;
            };
            report.silver_rows +=
                store_form(pool, lookups, case_id, record, tax_year, form).await?;
        }
        return Ok(report);
    }

    // Keyed-by-year shape: {"years_data": {"2019": {"forms": [...]}, ...}}
    let Some(years) = record
        .payload
        .get(YEARS_MAP_KEY)
        .and_then(Value::as_object)
    else {
        return Err(PipelineError::MissingContainer {
            tried: format!("{}, {}", CONTAINER_KEYS.join(", "), YEARS_MAP_KEY),
        });
    };

    for (year_key, year_data) in years {
        let Some(tax_year) = super::coerce::parse_year(year_key) else {
            warn!(bronze_id = %record.bronze_id, year_key, "unparseable year key, skipped");
            continue;
        };

        let forms = match year_data {
            Value::Array(forms) => forms.as_slice(),
            Value::Object(_) => year_data
                .get("forms")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            _ => &[],
        };

        for form in forms {
            // Per-form year overrides the map key when both are present
            let tax_year = alias::resolve_year(form, YEAR).unwrap_or(tax_year);
            report.silver_rows +=
                store_form(pool, lookups, case_id, record, tax_year, form).await?;
        }
    }

    Ok(report)
}

async fn store_form(
    pool: &SqlitePool,
    lookups: &dyn LookupTables,
    case_id: Uuid,
    record: &BronzeRecord,
    tax_year: i32,
    form: &Value,
) -> Result<u32, PipelineError> {
    if !form.is_object() {
        warn!(bronze_id = %record.bronze_id, tax_year, "non-object form element, skipped");
        return Ok(0);
    }

    // The income-document row needs a year header to hang off
    db::silver::upsert_tax_year(
        pool,
        case_id,
        record.bronze_id,
        &TaxYearFacts {
            tax_year,
            ..TaxYearFacts::default()
        },
    )
    .await?;

    let document_type = alias::resolve_text(form, FORM_TYPE)
        .map(|t| crate::lookups::form_rules::normalize_form_code(&t))
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let rule = lookups
        .form_rule(&document_type)
        .cloned()
        .unwrap_or_else(FormRule::unknown);

    let doc = IncomeDocument {
        tax_year,
        gross_amount: alias::resolve_decimal(form, GROSS),
        federal_withholding: alias::resolve_decimal(form, WITHHOLDING),
        issuer_name: alias::resolve_text(form, ISSUER_NAME),
        issuer_id: alias::resolve_text(form, ISSUER_ID),
        recipient_name: alias::resolve_text(form, RECIPIENT_NAME),
        recipient_id: alias::resolve_text(form, RECIPIENT_ID),
        category: rule.category.to_string(),
        is_self_employment: rule.is_self_employment,
        is_excluded: false,
        document_type,
    };

    let inserted = db::silver::insert_income_document(pool, case_id, record.bronze_id, &doc).await?;
    Ok(u32::from(inserted))
}
