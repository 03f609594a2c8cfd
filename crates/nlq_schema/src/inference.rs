//! Type inference and key-candidate detection (spec.md §4.2).

use chrono::NaiveDate;
use nlq_protocol::Value;

use crate::types::SemanticType;

/// Fixed datetime format patterns tried in order, grounded on the date
/// parsing pass the connectors perform before falling back to string.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

const KNOWN_ID_NAMES: &[&str] = &["id", "key", "code", "pk", "uuid", "identifier"];
const FOREIGN_KEY_SUFFIXES: &[&str] = &["_id", "_fk", "_key", "_code"];

const CATEGORICAL_UNIQUE_RATIO_MAX: f64 = 0.10;
const CATEGORICAL_CARDINALITY_MAX: usize = 20;
const PK_UNIQUE_RATIO_MIN: f64 = 0.99;

/// Trial-convert a raw text column into the most specific semantic type
/// that accepts every non-null value, in the priority order of
/// spec.md §4.2: id, integer, float, boolean, datetime, categorical,
/// else string.
pub fn infer_semantic_type(column_name: &str, raw_values: &[Option<String>]) -> SemanticType {
    let non_null: Vec<&str> = raw_values
        .iter()
        .filter_map(|v| v.as_deref())
        .filter(|s| !s.is_empty())
        .collect();

    if non_null.is_empty() {
        return SemanticType::String;
    }

    if looks_like_id_column(column_name, &non_null) {
        return SemanticType::Id;
    }
    if non_null.iter().all(|s| s.parse::<i64>().is_ok()) {
        return SemanticType::Integer;
    }
    if non_null.iter().all(|s| s.parse::<f64>().is_ok()) {
        return SemanticType::Float;
    }
    if non_null.iter().all(|s| is_boolean_literal(s)) {
        return SemanticType::Boolean;
    }
    if let Some(datetime_type) = try_datetime(&non_null) {
        return datetime_type;
    }

    let distinct = distinct_count(&non_null);
    let unique_ratio = distinct as f64 / non_null.len() as f64;
    if unique_ratio < CATEGORICAL_UNIQUE_RATIO_MAX && distinct < CATEGORICAL_CARDINALITY_MAX {
        return SemanticType::Categorical;
    }

    SemanticType::String
}

fn looks_like_id_column(column_name: &str, non_null: &[&str]) -> bool {
    let name_matches_known_id = KNOWN_ID_NAMES
        .iter()
        .any(|id_name| column_name.eq_ignore_ascii_case(id_name));
    if !name_matches_known_id {
        return false;
    }
    // An id column's textual values must all be scalar-ish (int or
    // short alphanumeric token), otherwise fall through to string.
    non_null
        .iter()
        .all(|s| s.parse::<i64>().is_ok() || s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

fn is_boolean_literal(s: &str) -> bool {
    matches!(
        s.to_lowercase().as_str(),
        "true" | "false" | "1" | "0" | "yes" | "no" | "t" | "f"
    )
}

fn try_datetime(non_null: &[&str]) -> Option<SemanticType> {
    let has_time_component = non_null.iter().any(|s| s.contains(':'));
    let all_parse = non_null.iter().all(|s| {
        DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok() || chrono::NaiveDateTime::parse_from_str(s, fmt).is_ok())
    });
    if all_parse {
        Some(if has_time_component {
            SemanticType::DateTime
        } else {
            SemanticType::Date
        })
    } else {
        None
    }
}

fn distinct_count(values: &[&str]) -> usize {
    let mut seen: Vec<&str> = Vec::new();
    for v in values {
        if !seen.contains(v) {
            seen.push(v);
        }
    }
    seen.len()
}

/// A column is a primary-key candidate when its non-null ratio is 1.0
/// and its unique-value ratio > 0.99, or its name exactly matches a
/// known id-name (spec.md §4.2).
pub fn is_primary_key_candidate(column_name: &str, values: &[Value]) -> bool {
    if values.is_empty() {
        return false;
    }
    let non_null: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
    if non_null.len() != values.len() {
        // non-null ratio must be exactly 1.0
        return KNOWN_ID_NAMES
            .iter()
            .any(|id_name| column_name.eq_ignore_ascii_case(id_name));
    }
    let mut distinct: Vec<&Value> = Vec::new();
    for v in &non_null {
        if !distinct.contains(v) {
            distinct.push(v);
        }
    }
    let unique_ratio = distinct.len() as f64 / non_null.len() as f64;
    unique_ratio > PK_UNIQUE_RATIO_MIN
        || KNOWN_ID_NAMES
            .iter()
            .any(|id_name| column_name.eq_ignore_ascii_case(id_name))
}

/// A column is a foreign-key candidate when its name ends in one of the
/// fixed suffixes and its type is id/integer/string (spec.md §4.2).
pub fn is_foreign_key_candidate(column_name: &str, semantic_type: SemanticType) -> bool {
    let name_matches = FOREIGN_KEY_SUFFIXES
        .iter()
        .any(|suffix| column_name.to_lowercase().ends_with(suffix));
    name_matches
        && matches!(
            semantic_type,
            SemanticType::Id | SemanticType::Integer | SemanticType::String
        )
}

/// Strip a known foreign-key suffix to produce the base entity name
/// used for relationship target lookup (spec.md §4.2).
pub fn strip_fk_suffix(column_name: &str) -> String {
    let lower = column_name.to_lowercase();
    for suffix in FOREIGN_KEY_SUFFIXES {
        if let Some(stripped) = lower.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    lower
}

/// Parse one raw textual cell into a typed [`Value`] for the given
/// semantic type. Used by `Dataset::profile` once the column's target
/// type has been inferred.
pub fn parse_value(raw: Option<&str>, semantic_type: SemanticType) -> Value {
    let raw = match raw {
        None => return Value::Null,
        Some(s) if s.is_empty() => return Value::Null,
        Some(s) => s,
    };
    match semantic_type {
        SemanticType::Integer => raw.parse::<i64>().map(Value::Integer).unwrap_or(Value::Null),
        SemanticType::Float => raw.parse::<f64>().map(Value::Real).unwrap_or(Value::Null),
        SemanticType::Boolean => Value::Boolean(matches!(
            raw.to_lowercase().as_str(),
            "true" | "1" | "yes" | "t"
        )),
        SemanticType::Date => DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
            .map(Value::Date)
            .unwrap_or(Value::Null),
        SemanticType::DateTime => DATETIME_FORMATS
            .iter()
            .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| Value::DateTime(chrono::DateTime::from_naive_utc_and_offset(naive, chrono::Utc)))
            .unwrap_or(Value::Null),
        SemanticType::String | SemanticType::Categorical | SemanticType::Id => {
            Value::Text(raw.to_string())
        }
    }
}
