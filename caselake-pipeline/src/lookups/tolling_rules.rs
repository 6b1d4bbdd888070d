//! Statute-tolling pairing rules
//!
//! Each rule names the transaction codes that open and close a tolling
//! episode and the statutory extra days added once the episode closes.

/// One tolling category with its opening/closing codes.
#[derive(Debug, Clone, PartialEq)]
pub struct TollingRule {
    pub category: &'static str,
    pub start_codes: &'static [&'static str],
    pub end_codes: &'static [&'static str],
    /// Days added on top of the open-to-close span once closed
    pub extra_days: i64,
}

/// The curated tolling rule set.
pub(crate) fn curated() -> Vec<TollingRule> {
    vec![
        TollingRule {
            category: "bankruptcy",
            start_codes: &["520"],
            end_codes: &["521"],
            // Statute stays suspended six months past discharge
            extra_days: 180,
        },
        TollingRule {
            category: "offer_in_compromise",
            start_codes: &["480"],
            end_codes: &["481", "482", "483"],
            extra_days: 30,
        },
        TollingRule {
            category: "due_process_hearing",
            start_codes: &["971"],
            end_codes: &["972"],
            extra_days: 0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bankruptcy_pairs_520_521() {
        let rules = curated();
        let bk = rules.iter().find(|r| r.category == "bankruptcy").unwrap();
        assert_eq!(bk.start_codes, &["520"]);
        assert_eq!(bk.end_codes, &["521"]);
        assert_eq!(bk.extra_days, 180);
    }

    #[test]
    fn oic_closes_on_any_disposition() {
        let rules = curated();
        let oic = rules
            .iter()
            .find(|r| r.category == "offer_in_compromise")
            .unwrap();
        assert!(oic.end_codes.contains(&"481"));
        assert!(oic.end_codes.contains(&"482"));
        assert!(oic.end_codes.contains(&"483"));
    }
}
