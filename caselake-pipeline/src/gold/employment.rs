//! Employment fan-out: one row for the taxpayer, one for the spouse when
//! spouse data is present.

use crate::models::{
    normalized_monthly, round2, EmploymentRecord, InterviewFacts, PayFrequency, PersonEmployment,
    PersonRole,
};
use std::collections::BTreeMap;

pub fn build(facts: &InterviewFacts) -> Vec<EmploymentRecord> {
    let mut records = vec![build_person(
        PersonRole::Taxpayer,
        &facts.employment.taxpayer,
    )];
    if facts.has_spouse() {
        records.push(build_person(PersonRole::Spouse, &facts.employment.spouse));
    }
    records
}

fn build_person(role: PersonRole, person: &PersonEmployment) -> EmploymentRecord {
    let prefix = match role {
        PersonRole::Taxpayer => "employment.client",
        PersonRole::Spouse => "employment.spouse",
    };
    let mut source_map = BTreeMap::new();

    let pay_frequency = person.pay_frequency.as_deref().and_then(PayFrequency::parse);
    if pay_frequency.is_some() {
        source_map.insert(
            "pay_frequency".to_string(),
            format!("{prefix}FrequentlyPaid"),
        );
    }

    // Monthly income precedence: the declared monthly figure wins; otherwise
    // gross income normalized through the declared frequency (annual-only
    // declarations divide by twelve). Annual is always monthly x 12 unless
    // the declaration itself was annual.
    let (monthly_income, annual_income) = match (person.monthly_income, person.gross_income) {
        (Some(monthly), _) => {
            source_map.insert(
                "monthly_income".to_string(),
                format!("{prefix}MonthlyIncome"),
            );
            (Some(monthly), Some(round2(monthly * 12.0)))
        }
        (None, Some(gross)) => {
            let frequency = pay_frequency.unwrap_or(PayFrequency::Monthly);
            let monthly = normalized_monthly(gross, frequency);
            source_map.insert(
                "monthly_income".to_string(),
                format!("{prefix}GrossIncome ({})", frequency.as_str()),
            );
            let annual = match frequency {
                PayFrequency::Annual => gross,
                _ => round2(monthly * 12.0),
            };
            (Some(monthly), Some(annual))
        }
        (None, None) => (None, None),
    };

    if person.employer.is_some() {
        source_map.insert("employer".to_string(), format!("{prefix}Employer"));
    }

    EmploymentRecord {
        role,
        employer: person.employer.clone(),
        start_date: person.start_date,
        gross_income: person.gross_income,
        net_income: person.net_income,
        pay_frequency,
        monthly_income,
        annual_income,
        source_map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmploymentFacts;

    fn facts_with(taxpayer: PersonEmployment, spouse: PersonEmployment) -> InterviewFacts {
        InterviewFacts {
            employment: EmploymentFacts { taxpayer, spouse },
            ..InterviewFacts::default()
        }
    }

    #[test]
    fn taxpayer_row_always_present_spouse_only_with_data() {
        let alone = facts_with(
            PersonEmployment {
                employer: Some("Acme".to_string()),
                ..PersonEmployment::default()
            },
            PersonEmployment::default(),
        );
        let records = build(&alone);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].role, PersonRole::Taxpayer);

        let married = facts_with(
            PersonEmployment::default(),
            PersonEmployment {
                gross_income: Some(900.0),
                ..PersonEmployment::default()
            },
        );
        let records = build(&married);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].role, PersonRole::Spouse);
    }

    #[test]
    fn declared_monthly_income_wins() {
        let facts = facts_with(
            PersonEmployment {
                gross_income: Some(1000.0),
                pay_frequency: Some("weekly".to_string()),
                monthly_income: Some(4500.0),
                ..PersonEmployment::default()
            },
            PersonEmployment::default(),
        );
        let record = &build(&facts)[0];
        assert_eq!(record.monthly_income, Some(4500.0));
        assert_eq!(record.annual_income, Some(54000.0));
        assert_eq!(
            record.source_map.get("monthly_income").map(String::as_str),
            Some("employment.clientMonthlyIncome")
        );
    }

    #[test]
    fn gross_income_normalizes_through_frequency() {
        let facts = facts_with(
            PersonEmployment {
                gross_income: Some(1000.0),
                pay_frequency: Some("biweekly".to_string()),
                ..PersonEmployment::default()
            },
            PersonEmployment::default(),
        );
        let record = &build(&facts)[0];
        assert_eq!(record.pay_frequency, Some(PayFrequency::Biweekly));
        assert_eq!(record.monthly_income, Some(2170.0));
        assert_eq!(record.annual_income, Some(26040.0));
    }

    #[test]
    fn annual_only_declaration_divides_by_twelve() {
        let facts = facts_with(
            PersonEmployment {
                gross_income: Some(60000.0),
                pay_frequency: Some("annually".to_string()),
                ..PersonEmployment::default()
            },
            PersonEmployment::default(),
        );
        let record = &build(&facts)[0];
        assert_eq!(record.monthly_income, Some(5000.0));
        assert_eq!(record.annual_income, Some(60000.0));
    }
}
