//! Household fan-out: one row per case with documented defaults.

use crate::models::{HouseholdRecord, InterviewFacts};

/// Filing status applied when the interview is silent.
pub const DEFAULT_FILING_STATUS: &str = "Single";

/// Household size applied when the interview is silent.
pub const DEFAULT_HOUSEHOLD_MEMBERS: i64 = 1;

pub fn build(facts: &InterviewFacts) -> HouseholdRecord {
    let household = &facts.household;
    HouseholdRecord {
        household_members: household
            .household_members
            .filter(|members| *members >= 1)
            .unwrap_or(DEFAULT_HOUSEHOLD_MEMBERS),
        members_under_65: household.members_under_65,
        members_over_65: household.members_over_65,
        occupancy_status: household.occupancy_status.clone(),
        residency_length: household.residency_length.clone(),
        filing_status: household
            .filing_status
            .clone()
            .unwrap_or_else(|| DEFAULT_FILING_STATUS.to_string()),
        state: household.state.clone(),
        county: household.county.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HouseholdFacts;

    #[test]
    fn defaults_apply_when_interview_is_silent() {
        let record = build(&InterviewFacts::default());
        assert_eq!(record.household_members, 1);
        assert_eq!(record.filing_status, "Single");
    }

    #[test]
    fn declared_values_pass_through() {
        let facts = InterviewFacts {
            household: HouseholdFacts {
                household_members: Some(4),
                filing_status: Some("Married Filing Jointly".to_string()),
                state: Some("AZ".to_string()),
                ..HouseholdFacts::default()
            },
            ..InterviewFacts::default()
        };
        let record = build(&facts);
        assert_eq!(record.household_members, 4);
        assert_eq!(record.filing_status, "Married Filing Jointly");
        assert_eq!(record.state.as_deref(), Some("AZ"));
    }

    #[test]
    fn nonsense_household_size_falls_back() {
        let facts = InterviewFacts {
            household: HouseholdFacts {
                household_members: Some(0),
                ..HouseholdFacts::default()
            },
            ..InterviewFacts::default()
        };
        assert_eq!(build(&facts).household_members, 1);
    }
}
