//! Self-employment tax estimate

use crate::models::{round2, IncomeDocument};

/// Portion of self-employment income subject to SE tax.
pub const SE_INCOME_FACTOR: f64 = 0.9235;

/// Combined Social Security and Medicare SE tax rate.
pub const SE_TAX_RATE: f64 = 0.153;

/// Sum of self-employment-flagged, non-excluded gross amounts.
pub fn se_taxable_total(documents: &[IncomeDocument]) -> f64 {
    let total: f64 = documents
        .iter()
        .filter(|doc| doc.is_self_employment && !doc.is_excluded)
        .filter_map(|doc| doc.gross_amount)
        .sum();
    round2(total)
}

/// SE tax on a self-employment income total, rounded to cents.
pub fn se_tax(se_income_total: f64) -> f64 {
    round2(se_income_total * SE_INCOME_FACTOR * SE_TAX_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(form: &str, gross: Option<f64>, se: bool, excluded: bool) -> IncomeDocument {
        IncomeDocument {
            tax_year: 2021,
            document_type: form.to_string(),
            gross_amount: gross,
            federal_withholding: None,
            issuer_name: None,
            issuer_id: None,
            recipient_name: None,
            recipient_id: None,
            category: "test".to_string(),
            is_self_employment: se,
            is_excluded: excluded,
        }
    }

    #[test]
    fn fifty_thousand_scenario() {
        assert_eq!(se_tax(50000.0), 7064.78);
    }

    #[test]
    fn zero_income_zero_tax() {
        assert_eq!(se_tax(0.0), 0.0);
    }

    #[test]
    fn only_se_flagged_documents_count() {
        let documents = vec![
            doc("1099-NEC", Some(30000.0), true, false),
            doc("1099-MISC", Some(20000.0), true, false),
            doc("W-2", Some(55000.0), false, false),
        ];
        assert_eq!(se_taxable_total(&documents), 50000.0);
    }

    #[test]
    fn excluded_documents_do_not_count() {
        let documents = vec![
            doc("1099-NEC", Some(30000.0), true, false),
            doc("1099-NEC", Some(10000.0), true, true),
            doc("1099-K", None, true, false),
        ];
        assert_eq!(se_taxable_total(&documents), 30000.0);
    }
}
