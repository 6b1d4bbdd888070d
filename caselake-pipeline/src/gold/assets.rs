//! Asset fan-out: financial accounts, vehicles and real property.
//!
//! One row per populated asset value; `equity = current_value - loan_balance`
//! is always computed, never an independently stored input.

use crate::models::{
    round2, AccountKind, AssetSlot, FinancialAccount, InterviewFacts, RealProperty, Vehicle,
};

fn populated(slot: &AssetSlot) -> Option<(f64, f64)> {
    let value = slot.value.filter(|v| *v > 0.0)?;
    Some((value, slot.loan.unwrap_or(0.0)))
}

pub fn build_financial_accounts(facts: &InterviewFacts) -> Vec<FinancialAccount> {
    let assets = &facts.assets;
    let kinds = [
        (AccountKind::Checking, &assets.checking),
        (AccountKind::CashOnHand, &assets.cash_on_hand),
        (AccountKind::Investments, &assets.investments),
        (AccountKind::LifeInsurance, &assets.life_insurance),
        (AccountKind::Retirement, &assets.retirement),
    ];

    kinds
        .into_iter()
        .filter_map(|(kind, slot)| {
            populated(slot).map(|(value, loan)| FinancialAccount {
                kind,
                current_value: value,
                loan_balance: loan,
                equity: round2(value - loan),
            })
        })
        .collect()
}

pub fn build_vehicles(facts: &InterviewFacts) -> Vec<Vehicle> {
    facts
        .assets
        .vehicles
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| {
            populated(slot).map(|(value, loan)| Vehicle {
                slot: index as i64 + 1,
                current_value: value,
                loan_balance: loan,
                equity: round2(value - loan),
            })
        })
        .collect()
}

pub fn build_real_properties(facts: &InterviewFacts) -> Vec<RealProperty> {
    populated(&facts.assets.real_estate)
        .map(|(value, loan)| RealProperty {
            slot: 1,
            current_value: value,
            loan_balance: loan,
            equity: round2(value - loan),
        })
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetFacts;

    fn facts_with_assets(assets: AssetFacts) -> InterviewFacts {
        InterviewFacts {
            assets,
            ..InterviewFacts::default()
        }
    }

    #[test]
    fn equity_is_value_minus_loan() {
        let facts = facts_with_assets(AssetFacts {
            real_estate: AssetSlot {
                value: Some(250000.0),
                loan: Some(180000.0),
            },
            ..AssetFacts::default()
        });
        let properties = build_real_properties(&facts);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].equity, 70000.0);
    }

    #[test]
    fn underwater_assets_keep_negative_equity() {
        let mut assets = AssetFacts::default();
        assets.vehicles[0] = AssetSlot {
            value: Some(9000.0),
            loan: Some(12000.0),
        };
        let vehicles = build_vehicles(&facts_with_assets(assets));
        assert_eq!(vehicles[0].equity, -3000.0);
    }

    #[test]
    fn unpopulated_slots_produce_no_rows() {
        let facts = facts_with_assets(AssetFacts {
            checking: AssetSlot {
                value: Some(0.0),
                loan: None,
            },
            cash_on_hand: AssetSlot {
                value: Some(150.0),
                loan: None,
            },
            ..AssetFacts::default()
        });
        let accounts = build_financial_accounts(&facts);
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].kind, AccountKind::CashOnHand);
        assert!(build_vehicles(&facts).is_empty());
        assert!(build_real_properties(&facts).is_empty());
    }

    #[test]
    fn vehicle_slots_are_one_indexed() {
        let mut assets = AssetFacts::default();
        assets.vehicles[2] = AssetSlot {
            value: Some(5000.0),
            loan: None,
        };
        let vehicles = build_vehicles(&facts_with_assets(assets));
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].slot, 3);
        assert_eq!(vehicles[0].equity, 5000.0);
    }
}
