//! Projection of raw business objects onto the export schema.
//!
//! Every field is looked up independently and replaced by a default when it
//! is missing or has an unexpected type, so normalization never fails.

use serde_json::Value;
use yelp_digest_business_models::NormalizedBusiness;

/// Separator used in the canonical categories string.
pub const CATEGORY_SEPARATOR: char = ';';

/// Maps one decoded business object to a [`NormalizedBusiness`].
#[must_use]
pub fn normalize_business(record: &Value) -> NormalizedBusiness {
    NormalizedBusiness {
        business_id: get_string(record, "business_id"),
        name: get_string(record, "name"),
        city: get_string(record, "city"),
        state: get_string(record, "state"),
        stars: get_f64(record, "stars").unwrap_or(0.0),
        review_count: get_i64(record, "review_count").unwrap_or(0),
        latitude: get_f64(record, "latitude"),
        longitude: get_f64(record, "longitude"),
        is_open: get_i64(record, "is_open").unwrap_or(0),
        categories: canonical_categories(record.get("categories")),
        attributes: nested_text(record.get("attributes")),
        hours: nested_text(record.get("hours")),
    }
}

/// Canonicalizes a `categories` value into a `;`-joined list of trimmed,
/// non-empty names.
///
/// Accepts an array of strings or a single comma-separated string. Any other
/// scalar is read through its JSON text. Empty values produce `""`.
#[must_use]
pub fn canonical_categories(value: Option<&Value>) -> String {
    let Some(value) = value.filter(|v| !is_empty_value(v)) else {
        return String::new();
    };

    match value {
        Value::Array(items) => join_categories(items.iter().filter_map(Value::as_str)),
        Value::String(s) => join_categories(s.split(',')),
        other => join_categories(other.to_string().split(',')),
    }
}

/// Splits a canonical categories string back into its names.
pub fn split_categories(categories: &str) -> impl Iterator<Item = &str> {
    categories
        .split(CATEGORY_SEPARATOR)
        .map(str::trim)
        .filter(|c| !c.is_empty())
}

fn join_categories<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for part in parts.map(str::trim).filter(|p| !p.is_empty()) {
        if !joined.is_empty() {
            joined.push(CATEGORY_SEPARATOR);
        }
        joined.push_str(part);
    }
    joined
}

/// Values that carry no categories at all.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Text form of a nested object column: `{}` when the key is absent, empty
/// when it is `null`, compact JSON otherwise.
fn nested_text(value: Option<&Value>) -> String {
    match value {
        None => "{}".to_string(),
        Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

fn get_string(record: &Value, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_default()
}

fn get_f64(record: &Value, field: &str) -> Option<f64> {
    record.get(field)?.as_f64().filter(|v| v.is_finite())
}

/// Integer field. Accepts whole floats (`10.0`) and booleans, which some
/// dumps use for `is_open`.
#[allow(clippy::cast_possible_truncation)]
fn get_i64(record: &Value, field: &str) -> Option<i64> {
    let value = record.get(field)?;
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if let Some(b) = value.as_bool() {
        return Some(i64::from(b));
    }
    // Past 2^53 floats no longer hold exact integers.
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() <= 9.0e15)
        .map(|f| f as i64)
}
