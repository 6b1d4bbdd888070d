//! Account-transcript transaction code rules
//!
//! Maps IRS transaction codes to their balance/statute/collection effects.
//! Codes not in the table classify as [`TransactionRule::unknown`]: they do
//! not affect the balance or the statute clock and never fail resolution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Broad classification of a transcript transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Return filed / tax assessed (starts the collection statute)
    ReturnFiled,
    /// Additional tax assessed
    Assessment,
    Payment,
    Penalty,
    Interest,
    Refund,
    /// Examination or underreporter review indicator
    Examination,
    /// Lien, levy or similar enforced-collection marker
    CollectionAction,
    /// Administrative notice
    Notice,
    Unknown,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::ReturnFiled => "return_filed",
            TransactionType::Assessment => "assessment",
            TransactionType::Payment => "payment",
            TransactionType::Penalty => "penalty",
            TransactionType::Interest => "interest",
            TransactionType::Refund => "refund",
            TransactionType::Examination => "examination",
            TransactionType::CollectionAction => "collection_action",
            TransactionType::Notice => "notice",
            TransactionType::Unknown => "unknown",
        }
    }
}

/// Classification outputs for one transaction code.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRule {
    pub code: &'static str,
    pub transaction_type: TransactionType,
    pub affects_balance: bool,
    pub affects_csed: bool,
    pub indicates_collection_action: bool,
    /// +1 increases the balance owed, -1 reduces it, 0 when balance-neutral
    pub balance_sign: i8,
}

impl TransactionRule {
    /// Default classification applied when no rule matches a code.
    pub fn unknown() -> TransactionRule {
        TransactionRule {
            code: "",
            transaction_type: TransactionType::Unknown,
            affects_balance: false,
            affects_csed: false,
            indicates_collection_action: false,
            balance_sign: 0,
        }
    }
}

/// Transaction code the statute clock starts from.
pub const RETURN_FILED_CODE: &str = "150";

const fn rule(
    code: &'static str,
    transaction_type: TransactionType,
    affects_balance: bool,
    affects_csed: bool,
    indicates_collection_action: bool,
    balance_sign: i8,
) -> TransactionRule {
    TransactionRule {
        code,
        transaction_type,
        affects_balance,
        affects_csed,
        indicates_collection_action,
        balance_sign,
    }
}

/// The curated transaction code table.
pub(crate) fn curated() -> HashMap<&'static str, TransactionRule> {
    let rules = [
        // Assessments
        rule("150", TransactionType::ReturnFiled, true, true, false, 1),
        rule("290", TransactionType::Assessment, true, false, false, 1),
        rule("300", TransactionType::Assessment, true, false, false, 1),
        // Penalties
        rule("160", TransactionType::Penalty, true, false, false, 1),
        rule("166", TransactionType::Penalty, true, false, false, 1),
        rule("170", TransactionType::Penalty, true, false, false, 1),
        rule("176", TransactionType::Penalty, true, false, false, 1),
        rule("276", TransactionType::Penalty, true, false, false, 1),
        // Interest
        rule("190", TransactionType::Interest, true, false, false, 1),
        rule("196", TransactionType::Interest, true, false, false, 1),
        // Payments and credits
        rule("610", TransactionType::Payment, true, false, false, -1),
        rule("660", TransactionType::Payment, true, false, false, -1),
        rule("670", TransactionType::Payment, true, false, false, -1),
        rule("706", TransactionType::Payment, true, false, false, -1),
        rule("806", TransactionType::Payment, true, false, false, -1),
        rule("846", TransactionType::Refund, true, false, false, 1),
        // Examination / underreporter indicators
        rule("420", TransactionType::Examination, false, false, false, 0),
        rule("424", TransactionType::Examination, false, false, false, 0),
        rule("430", TransactionType::Examination, false, false, false, 0),
        // Statute tolling markers (paired by the tolling rules)
        rule("480", TransactionType::Notice, false, true, false, 0),
        rule("481", TransactionType::Notice, false, true, false, 0),
        rule("482", TransactionType::Notice, false, true, false, 0),
        rule("483", TransactionType::Notice, false, true, false, 0),
        rule("520", TransactionType::Notice, false, true, false, 0),
        rule("521", TransactionType::Notice, false, true, false, 0),
        rule("971", TransactionType::Notice, false, true, false, 0),
        rule("972", TransactionType::Notice, false, true, false, 0),
        // Enforced collection
        rule("530", TransactionType::CollectionAction, false, false, true, 0),
        rule("582", TransactionType::CollectionAction, false, false, true, 0),
    ];

    rules.into_iter().map(|r| (r.code, r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payments_reduce_balance() {
        let rules = curated();
        let payment = &rules["670"];
        assert_eq!(payment.transaction_type, TransactionType::Payment);
        assert!(payment.affects_balance);
        assert_eq!(payment.balance_sign, -1);
    }

    #[test]
    fn return_filed_starts_statute() {
        let rules = curated();
        let filed = &rules[RETURN_FILED_CODE];
        assert_eq!(filed.transaction_type, TransactionType::ReturnFiled);
        assert!(filed.affects_csed);
        assert_eq!(filed.balance_sign, 1);
    }

    #[test]
    fn unknown_rule_affects_nothing() {
        let unknown = TransactionRule::unknown();
        assert!(!unknown.affects_balance);
        assert!(!unknown.affects_csed);
        assert_eq!(unknown.balance_sign, 0);
    }
}
