//! Income source fan-out: one row per populated amount.
//!
//! Interview income answers are monthly declarations; a zero or absent
//! amount produces no row. Rental carries the derived net figure (gross
//! minus declared rental expenses).

use crate::models::{
    normalized_monthly, round2, IncomeCategory, IncomeFacts, IncomeSource, InterviewFacts,
    PayFrequency,
};

pub fn build(facts: &InterviewFacts) -> Vec<IncomeSource> {
    let income = &facts.income;
    let mut sources = Vec::new();

    for (category, amount) in categories(income) {
        let Some(amount) = amount.filter(|a| *a > 0.0) else {
            continue;
        };

        let net_amount = (category == IncomeCategory::Rental).then(|| {
            round2(amount - income.rental_expenses.unwrap_or(0.0))
        });

        sources.push(IncomeSource {
            category,
            amount,
            frequency: PayFrequency::Monthly,
            monthly_amount: normalized_monthly(amount, PayFrequency::Monthly),
            net_amount,
        });
    }

    sources
}

fn categories(income: &IncomeFacts) -> [(IncomeCategory, Option<f64>); 14] {
    [
        (IncomeCategory::TaxpayerWages, income.taxpayer_wages),
        (
            IncomeCategory::TaxpayerSocialSecurity,
            income.taxpayer_social_security,
        ),
        (IncomeCategory::TaxpayerPension, income.taxpayer_pension),
        (IncomeCategory::SpouseWages, income.spouse_wages),
        (
            IncomeCategory::SpouseSocialSecurity,
            income.spouse_social_security,
        ),
        (IncomeCategory::SpousePension, income.spouse_pension),
        (IncomeCategory::DividendsInterest, income.dividends_interest),
        (IncomeCategory::Rental, income.rental_gross),
        (IncomeCategory::Distributions, income.distributions),
        (IncomeCategory::Alimony, income.alimony),
        (IncomeCategory::ChildSupport, income.child_support),
        (IncomeCategory::Other, income.other_income),
        (IncomeCategory::Additional1, income.additional_income_1),
        (IncomeCategory::Additional2, income.additional_income_2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_absent_amounts_produce_no_row() {
        let facts = InterviewFacts {
            income: IncomeFacts {
                taxpayer_wages: Some(3200.0),
                spouse_wages: Some(0.0),
                alimony: None,
                ..IncomeFacts::default()
            },
            ..InterviewFacts::default()
        };
        let sources = build(&facts);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].category, IncomeCategory::TaxpayerWages);
        assert_eq!(sources[0].monthly_amount, 3200.0);
    }

    #[test]
    fn rental_carries_net_of_expenses() {
        let facts = InterviewFacts {
            income: IncomeFacts {
                rental_gross: Some(1500.0),
                rental_expenses: Some(400.0),
                ..IncomeFacts::default()
            },
            ..InterviewFacts::default()
        };
        let sources = build(&facts);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].category, IncomeCategory::Rental);
        assert_eq!(sources[0].amount, 1500.0);
        assert_eq!(sources[0].net_amount, Some(1100.0));
    }

    #[test]
    fn rental_without_expenses_nets_to_gross() {
        let facts = InterviewFacts {
            income: IncomeFacts {
                rental_gross: Some(900.0),
                ..IncomeFacts::default()
            },
            ..InterviewFacts::default()
        };
        assert_eq!(build(&facts)[0].net_amount, Some(900.0));
    }
}
