//! Safe type coercions for resolved field values
//!
//! All coercions are pure functions with a fallback-to-None policy: a value
//! that cannot be parsed yields None, never an error. They operate on raw
//! strings and on `serde_json::Value` so they are usable independently of any
//! record shape.

use chrono::NaiveDate;
use serde_json::Value;

/// Parse a dollar amount, stripping currency symbols, thousands separators
/// and surrounding whitespace. Empty or unparseable input yields None.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    // Accounting-style negatives: (123.45)
    let (cleaned, negate) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (inner.to_string(), true),
        None => (cleaned, false),
    };
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| if negate { -v } else { v })
}

/// Numeric coercion of a JSON value: numbers pass through, strings go
/// through [`parse_decimal`].
pub fn decimal_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Parse a four-digit tax year, bounded to 1900..=2100.
pub fn parse_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.trim().parse().ok()?;
    (1900..=2100).contains(&year).then_some(year)
}

/// Year coercion of a JSON value.
pub fn year_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => {
            let year = n.as_i64()? as i32;
            (1900..=2100).contains(&year).then_some(year)
        }
        Value::String(s) => parse_year(s),
        _ => None,
    }
}

/// Parse a date: ISO `YYYY-MM-DD` first, then the `MM/DD/YYYY` regional
/// fallback.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}

/// Date coercion of a JSON value.
pub fn date_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

/// Text coercion: non-empty trimmed strings pass through; numbers render to
/// their string form (upstream payloads switch between the two freely).
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer count coercion (household sizes and similar).
pub fn count_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Filing-state coercion: transcripts report `"Filed"` / `"Not Filed"`;
/// booleans pass through.
pub fn filed_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => {
            let normalized = s.trim().to_ascii_lowercase();
            match normalized.as_str() {
                "filed" | "yes" | "true" => Some(true),
                "not filed" | "none" | "no" | "false" => Some(false),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_strips_currency_formatting() {
        assert_eq!(parse_decimal("$1,234.56"), Some(1234.56));
        assert_eq!(parse_decimal("  42 "), Some(42.0));
        assert_eq!(parse_decimal("-17.5"), Some(-17.5));
        assert_eq!(parse_decimal("(250.00)"), Some(-250.0));
    }

    #[test]
    fn decimal_never_raises() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("not a number"), None);
        assert_eq!(parse_decimal("$"), None);
    }

    #[test]
    fn decimal_value_handles_both_shapes() {
        assert_eq!(decimal_value(&json!(1234.56)), Some(1234.56));
        assert_eq!(decimal_value(&json!("$1,234.56")), Some(1234.56));
        assert_eq!(decimal_value(&json!(null)), None);
        assert_eq!(decimal_value(&json!({"nested": 1})), None);
    }

    #[test]
    fn year_bounds_are_enforced() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year("1899"), None);
        assert_eq!(parse_year("2101"), None);
        assert_eq!(parse_year("19"), None);
        assert_eq!(year_value(&json!(2020)), Some(2020));
    }

    #[test]
    fn date_tries_iso_then_regional() {
        let expected = NaiveDate::from_ymd_opt(2015, 4, 15).unwrap();
        assert_eq!(parse_date("2015-04-15"), Some(expected));
        assert_eq!(parse_date("04/15/2015"), Some(expected));
        assert_eq!(parse_date("April 15, 2015"), None);
    }

    #[test]
    fn filed_state_variants() {
        assert_eq!(filed_value(&json!("Filed")), Some(true));
        assert_eq!(filed_value(&json!("Not Filed")), Some(false));
        assert_eq!(filed_value(&json!(true)), Some(true));
        assert_eq!(filed_value(&json!("maybe")), None);
    }

    #[test]
    fn text_accepts_numbers() {
        assert_eq!(text_value(&json!("  hello ")), Some("hello".to_string()));
        assert_eq!(text_value(&json!("")), None);
        assert_eq!(text_value(&json!(3)), Some("3".to_string()));
    }
}
