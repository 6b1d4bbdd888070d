//! Monthly income, expense and disposable-income aggregates

use crate::db::gold::MonthlyExpenseRow;
use crate::models::{round2, EmploymentRecord};

/// Sum of employment monthly income across taxpayer and spouse.
pub fn total_monthly_income(employment: &[EmploymentRecord]) -> f64 {
    let total: f64 = employment
        .iter()
        .filter_map(|record| record.monthly_income)
        .sum();
    round2(total)
}

/// Sum of normalized monthly amounts across a case's expense rows.
pub fn total_monthly_expenses(expenses: &[MonthlyExpenseRow]) -> f64 {
    let total: f64 = expenses.iter().map(|row| row.monthly_amount).sum();
    round2(total)
}

/// Total monthly income minus total monthly expenses.
pub fn disposable_income(monthly_income: f64, monthly_expenses: f64) -> f64 {
    round2(monthly_income - monthly_expenses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonRole;
    use std::collections::BTreeMap;

    fn employment(role: PersonRole, monthly: Option<f64>) -> EmploymentRecord {
        EmploymentRecord {
            role,
            employer: None,
            start_date: None,
            gross_income: None,
            net_income: None,
            pay_frequency: None,
            monthly_income: monthly,
            annual_income: None,
            source_map: BTreeMap::new(),
        }
    }

    fn expense(monthly: f64) -> MonthlyExpenseRow {
        MonthlyExpenseRow {
            category: "test".to_string(),
            expense_class: "other".to_string(),
            amount: monthly,
            frequency: "monthly".to_string(),
            monthly_amount: monthly,
            irs_standard: None,
        }
    }

    #[test]
    fn income_sums_both_roles() {
        let records = vec![
            employment(PersonRole::Taxpayer, Some(4200.0)),
            employment(PersonRole::Spouse, Some(1800.0)),
        ];
        assert_eq!(total_monthly_income(&records), 6000.0);
    }

    #[test]
    fn missing_monthly_income_contributes_nothing() {
        let records = vec![
            employment(PersonRole::Taxpayer, Some(4200.0)),
            employment(PersonRole::Spouse, None),
        ];
        assert_eq!(total_monthly_income(&records), 4200.0);
    }

    #[test]
    fn disposable_is_income_minus_expenses() {
        let expenses = vec![expense(1500.0), expense(300.5)];
        let total = total_monthly_expenses(&expenses);
        assert_eq!(total, 1800.5);
        assert_eq!(disposable_income(6000.0, total), 4199.5);
    }
}
