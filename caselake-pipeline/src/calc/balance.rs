//! Account balance from transcript activity

use crate::models::{round2, ActivityRow};

/// Signed sum of transcript activity for one year.
///
/// Only rows flagged `affects_balance` participate; each contributes its
/// absolute amount under the sign its rule assigned (payments subtract,
/// assessments, penalties and interest add).
pub fn account_balance(rows: &[ActivityRow]) -> f64 {
    let total: f64 = rows
        .iter()
        .filter(|row| row.affects_balance)
        .filter_map(|row| {
            row.amount
                .map(|amount| amount.abs() * f64::from(row.balance_sign))
        })
        .sum();
    round2(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, amount: f64, affects: bool, sign: i8) -> ActivityRow {
        ActivityRow {
            tax_year: 2019,
            activity_date: None,
            code: code.to_string(),
            explanation: None,
            amount: Some(amount),
            transaction_type: "test".to_string(),
            affects_balance: affects,
            affects_csed: false,
            indicates_collection_action: false,
            balance_sign: sign,
        }
    }

    #[test]
    fn payments_subtract_assessments_add() {
        let rows = vec![
            row("150", 10000.0, true, 1),
            row("276", 500.0, true, 1),
            row("196", 250.0, true, 1),
            row("670", 2000.0, true, -1),
        ];
        assert_eq!(account_balance(&rows), 8750.0);
    }

    #[test]
    fn non_balance_rows_are_ignored() {
        let rows = vec![
            row("150", 10000.0, true, 1),
            row("420", 99999.0, false, 0),
        ];
        assert_eq!(account_balance(&rows), 10000.0);
    }

    #[test]
    fn negative_stored_payments_still_subtract() {
        // Some transcripts ship payment amounts already negated
        let rows = vec![row("150", 5000.0, true, 1), row("670", -1200.0, true, -1)];
        assert_eq!(account_balance(&rows), 3800.0);
    }

    #[test]
    fn missing_amounts_contribute_nothing() {
        let mut no_amount = row("290", 0.0, true, 1);
        no_amount.amount = None;
        assert_eq!(account_balance(&[no_amount]), 0.0);
    }
}
