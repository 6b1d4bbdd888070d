//! Wage-and-income form type rules
//!
//! Maps information-return form codes to an income category and the
//! self-employment flag that drives the SE tax calculation. Unmatched forms
//! classify as [`FormRule::unknown`].

use std::collections::HashMap;

/// Classification outputs for one form code.
#[derive(Debug, Clone, PartialEq)]
pub struct FormRule {
    pub form_code: &'static str,
    pub category: &'static str,
    pub is_self_employment: bool,
}

impl FormRule {
    /// Default classification applied when no rule matches a form code.
    pub fn unknown() -> FormRule {
        FormRule {
            form_code: "",
            category: "Unknown",
            is_self_employment: false,
        }
    }
}

/// Normalize a raw form code for lookup: uppercase, trimmed, spaces collapsed
/// to the hyphenated spelling used by the rule table.
pub fn normalize_form_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase().replace(' ', "-")
}

const fn rule(form_code: &'static str, category: &'static str, se: bool) -> FormRule {
    FormRule {
        form_code,
        category,
        is_self_employment: se,
    }
}

/// The curated form code table.
pub(crate) fn curated() -> HashMap<&'static str, FormRule> {
    let rules = [
        rule("W-2", "Wages", false),
        rule("W2", "Wages", false),
        rule("W-2G", "Gambling", false),
        rule("1099-NEC", "SelfEmployment", true),
        rule("1099-MISC", "SelfEmployment", true),
        rule("1099-K", "SelfEmployment", true),
        rule("1099-INT", "Interest", false),
        rule("1099-DIV", "Dividends", false),
        rule("1099-B", "CapitalGains", false),
        rule("1099-R", "Retirement", false),
        rule("1099-G", "Government", false),
        rule("1099-S", "RealEstate", false),
        rule("1099-C", "CancelledDebt", false),
        rule("SSA-1099", "SocialSecurity", false),
        rule("1098", "MortgageInterest", false),
        rule("1098-T", "Education", false),
        rule("K-1", "SelfEmployment", true),
        rule("1065-K-1", "SelfEmployment", true),
        rule("1120S-K-1", "PassThrough", false),
        rule("5498", "Retirement", false),
    ];

    rules.into_iter().map(|r| (r.form_code, r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nec_is_self_employment() {
        let rules = curated();
        assert!(rules["1099-NEC"].is_self_employment);
        assert_eq!(rules["1099-NEC"].category, "SelfEmployment");
    }

    #[test]
    fn w2_is_wages() {
        let rules = curated();
        assert!(!rules["W-2"].is_self_employment);
        assert_eq!(rules["W-2"].category, "Wages");
    }

    #[test]
    fn form_codes_normalize() {
        assert_eq!(normalize_form_code(" w-2 "), "W-2");
        assert_eq!(normalize_form_code("ssa 1099"), "SSA-1099");
    }
}
