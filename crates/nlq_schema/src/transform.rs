//! Applies a [`TransformationRule`] list to a [`Table`] in order
//! (spec.md §3/§4.3). Because `TransformationRule` is a closed sum type,
//! the match below is exhaustive by construction — there is no "unknown
//! kind" branch to fall through. The one remaining runtime-unknown case
//! is a rule naming a column that isn't present, which is logged and
//! skipped, matching the original's pass-through-on-miss behavior.

use nlq_protocol::Value;
use tracing::warn;

use crate::semantic_schema::{DateComponent, TransformationRule};
use crate::table::{Column, Table};

pub fn apply_transformations(table: &mut Table, rules: &[TransformationRule]) {
    for rule in rules {
        if table.column(rule.column_name()).is_none() && !matches!(rule, TransformationRule::Rename { .. }) {
            warn!(column = rule.column_name(), "transformation rule references unknown column, skipping");
            continue;
        }
        apply_one(table, rule);
    }
}

fn apply_one(table: &mut Table, rule: &TransformationRule) {
    match rule {
        TransformationRule::Rename { column, to } => {
            if let Some(col) = table.column_mut(column) {
                col.name = to.clone();
            } else {
                warn!(column = %column, "RENAME: source column not found, skipping");
            }
        }
        TransformationRule::FillNa { column, value } => {
            let fill = json_to_value(value);
            if let Some(col) = table.column_mut(column) {
                for v in &mut col.values {
                    if v.is_null() {
                        *v = fill.clone();
                    }
                }
            }
        }
        TransformationRule::DropNa { column } => {
            let keep: Vec<bool> = match table.column(column) {
                Some(col) => col.values.iter().map(|v| !v.is_null()).collect(),
                None => return,
            };
            table.retain_rows(&keep);
        }
        TransformationRule::ConvertType { column, to } => {
            if let Some(col) = table.column_mut(column) {
                convert_column_type(col, *to);
            }
        }
        TransformationRule::MapValues { column, mapping } => {
            if let Some(col) = table.column_mut(column) {
                for v in &mut col.values {
                    if let Some(s) = v.as_str() {
                        if let Some(mapped) = mapping.get(s) {
                            *v = Value::Text(mapped.clone());
                        }
                    }
                }
            }
        }
        TransformationRule::Clip { column, min, max } => {
            if let Some(col) = table.column_mut(column) {
                for v in &mut col.values {
                    if let Some(n) = v.as_f64() {
                        let mut clipped = n;
                        if let Some(lo) = min {
                            clipped = clipped.max(*lo);
                        }
                        if let Some(hi) = max {
                            clipped = clipped.min(*hi);
                        }
                        *v = Value::Real(clipped);
                    }
                }
            }
        }
        TransformationRule::Normalize { column } => {
            if let Some(col) = table.column_mut(column) {
                normalize_min_max(col);
            }
        }
        TransformationRule::Standardize { column } => {
            if let Some(col) = table.column_mut(column) {
                standardize_z_score(col);
            }
        }
        TransformationRule::EncodeCategorical { column } => {
            if let Some(col) = table.column(column).cloned() {
                for new_col in one_hot_encode(&col) {
                    table.push_column(new_col);
                }
            }
        }
        TransformationRule::ExtractDate { column, components } => {
            if let Some(col) = table.column(column).cloned() {
                for new_col in extract_date_parts(&col, components) {
                    table.push_column(new_col);
                }
            }
        }
        TransformationRule::Round { column, digits } => {
            if let Some(col) = table.column_mut(column) {
                let factor = 10f64.powi(*digits as i32);
                for v in &mut col.values {
                    if let Some(n) = v.as_f64() {
                        *v = Value::Real((n * factor).round() / factor);
                    }
                }
            }
        }
        TransformationRule::Uppercase { column } => {
            if let Some(col) = table.column_mut(column) {
                for v in &mut col.values {
                    if let Some(s) = v.as_str() {
                        *v = Value::Text(s.to_uppercase());
                    }
                }
            }
        }
        TransformationRule::Replace { column, from, to } => {
            if let Some(col) = table.column_mut(column) {
                for v in &mut col.values {
                    if let Some(s) = v.as_str() {
                        *v = Value::Text(s.replace(from.as_str(), to));
                    }
                }
            }
        }
    }
}

fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

fn convert_column_type(col: &mut Column, to: crate::types::SemanticType) {
    use crate::types::SemanticType;
    for v in &mut col.values {
        if v.is_null() {
            continue;
        }
        *v = match to {
            SemanticType::Integer => v
                .as_f64()
                .map(|n| Value::Integer(n as i64))
                .or_else(|| v.as_str().and_then(|s| s.parse::<i64>().ok()).map(Value::Integer))
                .unwrap_or(Value::Null),
            SemanticType::Float => v
                .as_f64()
                .map(Value::Real)
                .or_else(|| v.as_str().and_then(|s| s.parse::<f64>().ok()).map(Value::Real))
                .unwrap_or(Value::Null),
            SemanticType::String | SemanticType::Categorical | SemanticType::Id => {
                Value::Text(v.display())
            }
            SemanticType::Boolean => Value::Boolean(matches!(
                v.display().to_lowercase().as_str(),
                "true" | "1" | "yes" | "t"
            )),
            SemanticType::Date | SemanticType::DateTime => v.clone(),
        };
    }
}

fn normalize_min_max(col: &mut Column) {
    let nums: Vec<f64> = col.values.iter().filter_map(|v| v.as_f64()).collect();
    if nums.is_empty() {
        return;
    }
    let min = nums.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = nums.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 {
        return; // guard zero range -> no-op
    }
    for v in &mut col.values {
        if let Some(n) = v.as_f64() {
            *v = Value::Real((n - min) / range);
        }
    }
}

fn standardize_z_score(col: &mut Column) {
    let nums: Vec<f64> = col.values.iter().filter_map(|v| v.as_f64()).collect();
    if nums.is_empty() {
        return;
    }
    let mean = nums.iter().sum::<f64>() / nums.len() as f64;
    let variance = nums.iter().map(|n| (n - mean).powi(2)).sum::<f64>() / nums.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return; // guard zero std -> no-op
    }
    for v in &mut col.values {
        if let Some(n) = v.as_f64() {
            *v = Value::Real((n - mean) / std_dev);
        }
    }
}

fn one_hot_encode(col: &Column) -> Vec<Column> {
    let distinct: Vec<String> = {
        let mut seen = Vec::new();
        for v in col.values.iter().filter(|v| !v.is_null()) {
            let s = v.display();
            if !seen.contains(&s) {
                seen.push(s);
            }
        }
        seen
    };
    distinct
        .into_iter()
        .map(|value| {
            let flags: Vec<Value> = col
                .values
                .iter()
                .map(|v| Value::Boolean(!v.is_null() && v.display() == value))
                .collect();
            Column::new(format!("{}_is_{}", col.name, value), flags)
        })
        .collect()
}

fn extract_date_parts(col: &Column, components: &[DateComponent]) -> Vec<Column> {
    components
        .iter()
        .map(|component| {
            let label = match component {
                DateComponent::Year => "year",
                DateComponent::Month => "month",
                DateComponent::Day => "day",
                DateComponent::Weekday => "weekday",
            };
            let values: Vec<Value> = col
                .values
                .iter()
                .map(|v| extract_component(v, *component))
                .collect();
            Column::new(format!("{}_{}", col.name, label), values)
        })
        .collect()
}

fn extract_component(value: &Value, component: DateComponent) -> Value {
    use chrono::Datelike;
    let date = match value {
        Value::Date(d) => Some(*d),
        Value::DateTime(dt) => Some(dt.date_naive()),
        _ => None,
    };
    match date {
        None => Value::Null,
        Some(d) => match component {
            DateComponent::Year => Value::Integer(d.year() as i64),
            DateComponent::Month => Value::Integer(d.month() as i64),
            DateComponent::Day => Value::Integer(d.day() as i64),
            DateComponent::Weekday => Value::Integer(d.weekday().num_days_from_monday() as i64),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic_schema::TransformationRule;
    use chrono::NaiveDate;

    fn table_with(name: &str, values: Vec<Value>) -> Table {
        Table::new(vec![Column::new(name, values)])
    }

    #[test]
    fn fill_na_replaces_nulls_only() {
        let mut t = table_with("x", vec![Value::Integer(1), Value::Null, Value::Integer(3)]);
        apply_transformations(
            &mut t,
            &[TransformationRule::FillNa {
                column: "x".into(),
                value: serde_json::json!(0),
            }],
        );
        assert_eq!(
            t.column("x").unwrap().values,
            vec![Value::Integer(1), Value::Integer(0), Value::Integer(3)]
        );
    }

    #[test]
    fn drop_na_removes_whole_rows_across_columns() {
        let mut t = Table::new(vec![
            Column::new("x", vec![Value::Integer(1), Value::Null, Value::Integer(3)]),
            Column::new("y", vec![Value::Text("a".into()), Value::Text("b".into()), Value::Text("c".into())]),
        ]);
        apply_transformations(&mut t, &[TransformationRule::DropNa { column: "x".into() }]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column("y").unwrap().values, vec![Value::Text("a".into()), Value::Text("c".into())]);
    }

    #[test]
    fn normalize_is_noop_on_zero_range() {
        let mut t = table_with("x", vec![Value::Integer(5), Value::Integer(5)]);
        apply_transformations(&mut t, &[TransformationRule::Normalize { column: "x".into() }]);
        assert_eq!(t.column("x").unwrap().values, vec![Value::Integer(5), Value::Integer(5)]);
    }

    #[test]
    fn encode_categorical_appends_columns_and_retains_original() {
        let mut t = table_with(
            "cat",
            vec![Value::Text("a".into()), Value::Text("b".into()), Value::Text("a".into())],
        );
        apply_transformations(&mut t, &[TransformationRule::EncodeCategorical { column: "cat".into() }]);
        assert!(t.column("cat").is_some());
        assert!(t.column("cat_is_a").is_some());
        assert!(t.column("cat_is_b").is_some());
    }

    #[test]
    fn extract_date_creates_sibling_columns() {
        let mut t = table_with("data", vec![Value::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())]);
        apply_transformations(
            &mut t,
            &[TransformationRule::ExtractDate {
                column: "data".into(),
                components: vec![DateComponent::Year, DateComponent::Month],
            }],
        );
        assert_eq!(t.column("data_year").unwrap().values[0], Value::Integer(2024));
        assert_eq!(t.column("data_month").unwrap().values[0], Value::Integer(3));
    }

    #[test]
    fn unknown_column_is_skipped_without_panicking() {
        let mut t = table_with("x", vec![Value::Integer(1)]);
        apply_transformations(&mut t, &[TransformationRule::Uppercase { column: "missing".into() }]);
        assert_eq!(t.row_count(), 1);
    }
}
