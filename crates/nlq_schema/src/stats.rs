//! Per-column statistics computed at load time (spec.md §3).

use nlq_protocol::Value;
use serde::{Deserialize, Serialize};

use crate::types::SemanticType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnStats {
    Numeric {
        min: f64,
        max: f64,
        mean: f64,
    },
    Temporal {
        earliest: String,
        latest: String,
    },
    Categorical {
        top_values: Vec<(String, usize)>,
    },
    None,
}

const TOP_K: usize = 10;

pub fn compute_stats(values: &[Value], semantic_type: SemanticType) -> ColumnStats {
    match semantic_type {
        SemanticType::Integer | SemanticType::Float => numeric_stats(values),
        SemanticType::Date | SemanticType::DateTime => temporal_stats(values),
        SemanticType::Categorical => categorical_stats(values),
        _ => ColumnStats::None,
    }
}

fn numeric_stats(values: &[Value]) -> ColumnStats {
    let nums: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
    if nums.is_empty() {
        return ColumnStats::None;
    }
    let min = nums.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = nums.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = nums.iter().sum::<f64>() / nums.len() as f64;
    ColumnStats::Numeric { min, max, mean }
}

fn temporal_stats(values: &[Value]) -> ColumnStats {
    let mut rendered: Vec<String> = values
        .iter()
        .filter(|v| !v.is_null())
        .map(|v| v.display())
        .collect();
    if rendered.is_empty() {
        return ColumnStats::None;
    }
    rendered.sort();
    ColumnStats::Temporal {
        earliest: rendered.first().cloned().unwrap(),
        latest: rendered.last().cloned().unwrap(),
    }
}

fn categorical_stats(values: &[Value]) -> ColumnStats {
    use std::collections::HashMap;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for v in values.iter().filter(|v| !v.is_null()) {
        *counts.entry(v.display()).or_insert(0) += 1;
    }
    let mut top: Vec<(String, usize)> = counts.into_iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(TOP_K);
    ColumnStats::Categorical { top_values: top }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_stats_ignore_nulls() {
        let vals = vec![Value::Integer(1), Value::Null, Value::Integer(3)];
        let stats = compute_stats(&vals, SemanticType::Integer);
        match stats {
            ColumnStats::Numeric { min, max, mean } => {
                assert_eq!(min, 1.0);
                assert_eq!(max, 3.0);
                assert_eq!(mean, 2.0);
            }
            _ => panic!("expected numeric stats"),
        }
    }

    #[test]
    fn categorical_stats_caps_at_top_k_sorted_by_count() {
        let vals: Vec<Value> = (0..20)
            .map(|i| Value::Text(format!("cat{}", i % 15)))
            .collect();
        let stats = compute_stats(&vals, SemanticType::Categorical);
        match stats {
            ColumnStats::Categorical { top_values } => assert!(top_values.len() <= TOP_K),
            _ => panic!("expected categorical stats"),
        }
    }
}
