//! Ordered-alias field resolution over nested JSON documents
//!
//! Upstream payloads name the same field a dozen different ways across
//! providers and payload generations. Instead of per-field lookup chains,
//! each target field declares an ordered list of alias paths and one generic
//! resolver takes the first present, non-null value. Precedence is the list
//! order: preferred keys first, legacy spreadsheet cell references last.

use crate::resolve::coerce;
use chrono::NaiveDate;
use serde_json::Value;

/// Walk a dot-separated path (`"employment.clientGrossIncome"`) into a
/// nested object. Returns None when any segment is missing or the leaf is
/// JSON null.
pub fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    (!current.is_null()).then_some(current)
}

/// Resolve a field through its ordered alias list: first present, non-null
/// value wins.
pub fn resolve<'a>(doc: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|path| lookup_path(doc, path))
}

/// Resolve and coerce to text.
pub fn resolve_text(doc: &Value, aliases: &[&str]) -> Option<String> {
    resolve(doc, aliases).and_then(coerce::text_value)
}

/// Resolve and coerce to a dollar amount.
pub fn resolve_decimal(doc: &Value, aliases: &[&str]) -> Option<f64> {
    resolve(doc, aliases).and_then(coerce::decimal_value)
}

/// Resolve and coerce to a tax year.
pub fn resolve_year(doc: &Value, aliases: &[&str]) -> Option<i32> {
    resolve(doc, aliases).and_then(coerce::year_value)
}

/// Resolve and coerce to a date.
pub fn resolve_date(doc: &Value, aliases: &[&str]) -> Option<NaiveDate> {
    resolve(doc, aliases).and_then(coerce::date_value)
}

/// Resolve and coerce to an integer count.
pub fn resolve_count(doc: &Value, aliases: &[&str]) -> Option<i64> {
    resolve(doc, aliases).and_then(coerce::count_value)
}

/// Resolve and coerce to a filed/not-filed flag.
pub fn resolve_filed(doc: &Value, aliases: &[&str]) -> Option<bool> {
    resolve(doc, aliases).and_then(coerce::filed_value)
}

/// Locate the top-level record array of a transcript payload by trying the
/// container keys in order until one yields a non-empty array.
pub fn find_container<'a>(doc: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|key| {
        doc.get(*key)
            .and_then(Value::as_array)
            .filter(|arr| !arr.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_walks_nested_objects() {
        let doc = json!({"employment": {"clientGrossIncome": "5,000"}});
        assert_eq!(
            lookup_path(&doc, "employment.clientGrossIncome"),
            Some(&json!("5,000"))
        );
        assert_eq!(lookup_path(&doc, "employment.missing"), None);
        assert_eq!(lookup_path(&doc, "household.size"), None);
    }

    #[test]
    fn null_leaves_do_not_resolve() {
        let doc = json!({"amount": null, "fallback": 10});
        assert_eq!(resolve(&doc, &["amount", "fallback"]), Some(&json!(10)));
    }

    #[test]
    fn preferred_alias_wins_over_legacy() {
        let doc = json!({
            "employment": {"clientGrossIncome": 5000},
            "b5": 1111
        });
        assert_eq!(
            resolve_decimal(&doc, &["employment.clientGrossIncome", "b5"]),
            Some(5000.0)
        );
    }

    #[test]
    fn legacy_alias_used_when_preferred_absent() {
        let doc = json!({"b5": "2,500"});
        assert_eq!(
            resolve_decimal(&doc, &["employment.clientGrossIncome", "b5"]),
            Some(2500.0)
        );
    }

    #[test]
    fn neither_alias_resolves_to_none() {
        let doc = json!({"unrelated": 1});
        assert_eq!(
            resolve_decimal(&doc, &["employment.clientGrossIncome", "b5"]),
            None
        );
    }

    #[test]
    fn container_falls_back_through_keys() {
        let doc = json!({"at_records": [], "records": [{"tax_year": 2019}]});
        let records = find_container(&doc, &["at_records", "records", "data"]).unwrap();
        assert_eq!(records.len(), 1);
        assert!(find_container(&json!({"other": 1}), &["at_records"]).is_none());
    }
}
