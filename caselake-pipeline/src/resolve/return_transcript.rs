//! Return-transcript resolution
//!
//! Each record carries a tax year, optional header amounts and a set of line
//! items. Lines arrive either as an array of labeled objects or as a flat
//! label → amount map; both store one `return_lines` row per line.

use super::{alias, PipelineError, ResolutionReport};
use crate::db;
use crate::models::{BronzeRecord, ReturnLine, TaxYearFacts};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

const CONTAINER_KEYS: &[&str] = &["records", "trt_records", "data"];
const LINES_KEYS: &[&str] = &["lines", "line_items", "items"];
const LINES_MAP_KEY: &str = "fields";

const YEAR: &[&str] = &["tax_year", "year", "period"];
const FORM_NAME: &[&str] = &["form", "form_name", "form_type"];
const AGI: &[&str] = &["adjusted_gross_income", "agi"];
const TAXABLE_INCOME: &[&str] = &["taxable_income"];
const TAX_PER_RETURN: &[&str] = &["tax_per_return", "total_tax"];
const LINE_LABEL: &[&str] = &["label", "line", "description", "name"];
const LINE_AMOUNT: &[&str] = &["amount", "value"];

pub(super) async fn resolve(
    pool: &SqlitePool,
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
            warn!(bronze_id = %record.bronze_id, "return record without a tax year, skipped");
            continue;
        };

        db::silver::upsert_tax_year(
            pool,
            case_id,
            record.bronze_id,
            &TaxYearFacts {
                tax_year,
                agi: alias::resolve_decimal(year_record, AGI),
                taxable_income: alias::resolve_decimal(year_record, TAXABLE_INCOME),
                tax_per_return: alias::resolve_decimal(year_record, TAX_PER_RETURN),
                ..TaxYearFacts::default()
            },
        )
        .await?;
        report.silver_rows += 1;

        let form_name = alias::resolve_text(year_record, FORM_NAME);

        for line in collect_lines(year_record) {
            let line = ReturnLine {
                tax_year,
                form_name: form_name.clone(),
                ..line
            };
            if db::silver::insert_return_line(pool, case_id, record.bronze_id, &line).await? {
                report.silver_rows += 1;
            }
        }
    }

    Ok(report)
}

/// Collect line items from either supported shape.
fn collect_lines(year_record: &Value) -> Vec<ReturnLine> {
    if let Some(lines) = alias::find_container(year_record, LINES_KEYS) {
        return lines
            .iter()
            .filter_map(|line| {
                let label = alias::resolve_text(line, LINE_LABEL)?;
                Some(ReturnLine {
                    tax_year: 0,
                    form_name: None,
                    line_label: label,
                    amount: alias::resolve_decimal(line, LINE_AMOUNT),
                })
            })
            .collect();
    }

    // Flat map shape: {"fields": {"ADJUSTED GROSS INCOME": "$50,000", ...}}
    year_record
        .get(LINES_MAP_KEY)
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .map(|(label, value)| ReturnLine {
                    tax_year: 0,
                    form_name: None,
                    line_label: label.clone(),
                    amount: super::coerce::decimal_value(value),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lines_from_array_shape() {
        let record = json!({
            "lines": [
                {"label": "ADJUSTED GROSS INCOME", "amount": "$50,000"},
                {"label": "TAXABLE INCOME", "amount": 38000},
                {"no_label": true}
            ]
        });
        let lines = collect_lines(&record);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].amount, Some(50000.0));
    }

    #[test]
    fn lines_from_map_shape() {
        let record = json!({
            "fields": {"SE TAX": "1,200.50", "FILING STATUS": "Single"}
        });
        let mut lines = collect_lines(&record);
        lines.sort_by(|a, b| a.line_label.cmp(&b.line_label));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].line_label, "SE TAX");
        assert_eq!(lines[1].amount, Some(1200.50));
        // Non-numeric values keep the line with no amount
        assert_eq!(lines[0].amount, None);
    }
}
