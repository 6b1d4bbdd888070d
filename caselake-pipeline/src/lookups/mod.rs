//! Business-rule lookup tables
//!
//! Classification rules are an injected read-only dependency: the pipeline
//! consults them during resolution and denormalizes the results onto Silver
//! rows at write time, so later rule edits never rewrite history. Tests swap
//! the curated set for a stub by implementing [`LookupTables`].

pub mod form_rules;
pub mod tolling_rules;
pub mod transaction_rules;

pub use form_rules::FormRule;
pub use tolling_rules::TollingRule;
pub use transaction_rules::{TransactionRule, TransactionType};

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Read-only classification rules consulted by the resolution engine.
pub trait LookupTables: Send + Sync {
    /// Rule for a transcript transaction code, if curated
    fn transaction_rule(&self, code: &str) -> Option<&TransactionRule>;

    /// Rule for a normalized information-return form code, if curated
    fn form_rule(&self, form_code: &str) -> Option<&FormRule>;

    /// Statute-tolling pairing rules
    fn tolling_rules(&self) -> &[TollingRule];
}

/// The built-in curated rule set.
pub struct CuratedLookups {
    transactions: HashMap<&'static str, TransactionRule>,
    forms: HashMap<&'static str, FormRule>,
    tolling: Vec<TollingRule>,
}

impl CuratedLookups {
    fn new() -> Self {
        Self {
            transactions: transaction_rules::curated(),
            forms: form_rules::curated(),
            tolling: tolling_rules::curated(),
        }
    }

    /// Shared curated instance
    pub fn shared() -> &'static CuratedLookups {
        static CURATED: Lazy<CuratedLookups> = Lazy::new(CuratedLookups::new);
        &CURATED
    }
}

impl LookupTables for CuratedLookups {
    fn transaction_rule(&self, code: &str) -> Option<&TransactionRule> {
        self.transactions.get(code.trim())
    }

    fn form_rule(&self, form_code: &str) -> Option<&FormRule> {
        self.forms
            .get(form_rules::normalize_form_code(form_code).as_str())
    }

    fn tolling_rules(&self) -> &[TollingRule] {
        &self.tolling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curated_tables_are_populated() {
        let lookups = CuratedLookups::shared();
        assert!(lookups.transaction_rule("150").is_some());
        assert!(lookups.form_rule("W-2").is_some());
        assert!(!lookups.tolling_rules().is_empty());
    }

    #[test]
    fn unknown_keys_miss_cleanly() {
        let lookups = CuratedLookups::shared();
        assert!(lookups.transaction_rule("999").is_none());
        assert!(lookups.form_rule("FORM-THAT-DOES-NOT-EXIST").is_none());
    }
}
