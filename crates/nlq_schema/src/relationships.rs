//! Cross-Dataset relationship detection (spec.md §4.2, invariant I3).

use nlq_protocol::Value;
use serde::{Deserialize, Serialize};

pub const OVERLAP_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// The foreign-key suffix's base name matched a Dataset name.
    NameMatch,
    /// Detected purely from non-null value containment in the target's
    /// primary key, tagged with its overlap confidence.
    ValueOverlap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source_column: String,
    pub target_dataset: String,
    pub target_column: String,
    pub kind: RelationshipKind,
    pub confidence: f64,
}

/// A candidate target Dataset: its name, primary key column name, and
/// the primary key's full value set (used for overlap detection).
pub struct TargetCandidate<'a> {
    pub name: &'a str,
    pub primary_key_column: &'a str,
    pub primary_key_values: &'a [Value],
}

/// Normalize a name for singular/plural, underscore-stripped comparison:
/// lower-case, strip underscores, strip a trailing 's'.
fn normalize_entity_name(name: &str) -> String {
    let lower = name.to_lowercase().replace('_', "");
    lower.strip_suffix('s').unwrap_or(&lower).to_string()
}

fn names_match(base: &str, candidate_name: &str) -> bool {
    normalize_entity_name(base) == normalize_entity_name(candidate_name)
}

fn value_overlap_ratio(source_values: &[Value], target_values: &[Value]) -> f64 {
    let non_null: Vec<&Value> = source_values.iter().filter(|v| !v.is_null()).collect();
    if non_null.is_empty() {
        return 0.0;
    }
    let mut distinct: Vec<&Value> = Vec::new();
    for v in &non_null {
        if !distinct.contains(v) {
            distinct.push(v);
        }
    }
    let matched = distinct
        .iter()
        .filter(|v| target_values.contains(v))
        .count();
    matched as f64 / distinct.len() as f64
}

/// Detect the relationship for one foreign-key candidate column
/// (`source_column`, base entity name already stripped of its suffix)
/// against a list of candidate target Datasets, each of which must have
/// a primary key (spec.md §4.2).
pub fn detect_relationship(
    source_column: &str,
    source_values: &[Value],
    base_name: &str,
    targets: &[TargetCandidate<'_>],
) -> Option<Relationship> {
    // Name-based match takes priority.
    if let Some(target) = targets.iter().find(|t| names_match(base_name, t.name)) {
        return Some(Relationship {
            source_column: source_column.to_string(),
            target_dataset: target.name.to_string(),
            target_column: target.primary_key_column.to_string(),
            kind: RelationshipKind::NameMatch,
            confidence: 1.0,
        });
    }

    // Fall back to value-overlap detection across every candidate,
    // keeping the strongest match at/above the threshold.
    targets
        .iter()
        .filter_map(|t| {
            let ratio = value_overlap_ratio(source_values, t.primary_key_values);
            if ratio >= OVERLAP_THRESHOLD {
                Some(Relationship {
                    source_column: source_column.to_string(),
                    target_dataset: t.name.to_string(),
                    target_column: t.primary_key_column.to_string(),
                    kind: RelationshipKind::ValueOverlap,
                    confidence: ratio,
                })
            } else {
                None
            }
        })
        .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_match_wins_over_value_overlap() {
        let target_values = vec![Value::Integer(1), Value::Integer(2)];
        let targets = vec![TargetCandidate {
            name: "customers",
            primary_key_column: "id",
            primary_key_values: &target_values,
        }];
        let source_values = vec![Value::Integer(1), Value::Integer(2)];
        let rel = detect_relationship("customer_id", &source_values, "customer", &targets).unwrap();
        assert!(matches!(rel.kind, RelationshipKind::NameMatch));
        assert_eq!(rel.confidence, 1.0);
    }

    #[test]
    fn value_overlap_detected_when_names_dont_match() {
        let target_values = vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)];
        let targets = vec![TargetCandidate {
            name: "widgets",
            primary_key_column: "sku",
            primary_key_values: &target_values,
        }];
        let source_values = vec![Value::Integer(1), Value::Integer(2), Value::Integer(99)];
        let rel = detect_relationship("item_sku", &source_values, "item", &targets).unwrap();
        assert!(matches!(rel.kind, RelationshipKind::ValueOverlap));
        assert!(rel.confidence >= OVERLAP_THRESHOLD);
    }

    #[test]
    fn below_threshold_overlap_yields_no_relationship() {
        let target_values = vec![Value::Integer(1)];
        let targets = vec![TargetCandidate {
            name: "widgets",
            primary_key_column: "sku",
            primary_key_values: &target_values,
        }];
        let source_values = vec![Value::Integer(1), Value::Integer(2), Value::Integer(3), Value::Integer(4)];
        assert!(detect_relationship("item_sku", &source_values, "item", &targets).is_none());
    }

    #[test]
    fn singular_plural_and_underscore_variants_match() {
        assert!(names_match("department", "departments"));
        assert!(names_match("order_item", "orderitems"));
    }
}
