//! Monthly expense fan-out: one categorized row per populated amount.
//!
//! The five national-standard categories carry the IRS standard allowance
//! from the interview when present; a zero or absent amount produces no row.

use crate::models::{
    normalized_monthly, ExpenseClass, ExpenseFacts, InterviewFacts, MonthlyExpense, PayFrequency,
    StandardsFacts,
};

pub fn build(facts: &InterviewFacts) -> Vec<MonthlyExpense> {
    let mut rows = Vec::new();

    for (name, class, amount, standard) in categories(&facts.expenses, &facts.standards) {
        let Some(amount) = amount.filter(|a| *a > 0.0) else {
            continue;
        };
        rows.push(MonthlyExpense {
            category: name.to_string(),
            expense_class: class,
            amount,
            frequency: PayFrequency::Monthly,
            monthly_amount: normalized_monthly(amount, PayFrequency::Monthly),
            irs_standard: standard,
        });
    }

    rows
}

type Category = (
    &'static str,
    ExpenseClass,
    Option<f64>,
    Option<f64>,
);

fn categories(expenses: &ExpenseFacts, standards: &StandardsFacts) -> Vec<Category> {
    use ExpenseClass::*;
    vec![
        ("food", National, expenses.food, standards.food),
        (
            "housekeeping",
            National,
            expenses.housekeeping,
            standards.housekeeping,
        ),
        ("apparel", National, expenses.apparel, standards.apparel),
        (
            "personal_care",
            National,
            expenses.personal_care,
            standards.personal_care,
        ),
        (
            "miscellaneous",
            National,
            expenses.miscellaneous,
            standards.miscellaneous,
        ),
        ("mortgage_primary", Housing, expenses.mortgage_primary, None),
        (
            "mortgage_secondary",
            Housing,
            expenses.mortgage_secondary,
            None,
        ),
        ("rent", Housing, expenses.rent, None),
        (
            "homeowner_insurance",
            Housing,
            expenses.homeowner_insurance,
            None,
        ),
        ("property_tax", Housing, expenses.property_tax, None),
        ("gas", Housing, expenses.gas, None),
        ("electricity", Housing, expenses.electricity, None),
        ("water", Housing, expenses.water, None),
        ("sewer", Housing, expenses.sewer, None),
        ("cable", Housing, expenses.cable, None),
        ("trash", Housing, expenses.trash, None),
        ("phone", Housing, expenses.phone, None),
        (
            "vehicle_operating",
            Transportation,
            expenses.vehicle_operating,
            None,
        ),
        (
            "public_transportation",
            Transportation,
            expenses.public_transportation,
            None,
        ),
        ("auto_insurance", Transportation, expenses.auto_insurance, None),
        ("auto_payment_1", Transportation, expenses.auto_payment_1, None),
        ("auto_payment_2", Transportation, expenses.auto_payment_2, None),
        (
            "health_insurance",
            Medical,
            expenses.health_insurance,
            None,
        ),
        ("prescriptions", Medical, expenses.prescriptions, None),
        ("copays", Medical, expenses.copays, None),
        ("current_taxes", Other, expenses.current_taxes, None),
        ("court_payments", Other, expenses.court_payments, None),
        ("child_care", Other, expenses.child_care, None),
        (
            "whole_life_insurance",
            Other,
            expenses.whole_life_insurance,
            None,
        ),
        (
            "term_life_insurance",
            Other,
            expenses.term_life_insurance,
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_populated_categories_fan_out() {
        let facts = InterviewFacts {
            expenses: ExpenseFacts {
                food: Some(650.0),
                rent: Some(1400.0),
                cable: Some(0.0),
                ..ExpenseFacts::default()
            },
            ..InterviewFacts::default()
        };
        let rows = build(&facts);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|r| r.category == "food"));
        assert!(rows.iter().any(|r| r.category == "rent"));
        assert!(!rows.iter().any(|r| r.category == "cable"));
    }

    #[test]
    fn national_categories_carry_irs_standards() {
        let facts = InterviewFacts {
            expenses: ExpenseFacts {
                food: Some(800.0),
                ..ExpenseFacts::default()
            },
            standards: StandardsFacts {
                food: Some(733.0),
                ..StandardsFacts::default()
            },
            ..InterviewFacts::default()
        };
        let rows = build(&facts);
        assert_eq!(rows[0].expense_class, ExpenseClass::National);
        assert_eq!(rows[0].irs_standard, Some(733.0));
    }

    #[test]
    fn classes_group_like_the_collection_standards() {
        let facts = InterviewFacts {
            expenses: ExpenseFacts {
                auto_insurance: Some(120.0),
                prescriptions: Some(45.0),
                child_care: Some(400.0),
                ..ExpenseFacts::default()
            },
            ..InterviewFacts::default()
        };
        let rows = build(&facts);
        let class_of = |name: &str| {
            rows.iter()
                .find(|r| r.category == name)
                .map(|r| r.expense_class)
        };
        assert_eq!(class_of("auto_insurance"), Some(ExpenseClass::Transportation));
        assert_eq!(class_of("prescriptions"), Some(ExpenseClass::Medical));
        assert_eq!(class_of("child_care"), Some(ExpenseClass::Other));
    }
}
