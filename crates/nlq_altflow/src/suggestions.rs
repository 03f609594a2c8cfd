//! Alternative-question synthesis (spec.md §4.8 item 3), grounded on
//! `alternative_flow.py`'s `generate_alternative_queries`: per-dataset
//! summary/aggregation/time-bucket/cross-dataset questions, deduplicated
//! and capped at ten.

use nlq_schema::{Dataset, SemanticType};

const MAX_SUGGESTIONS: usize = 10;

pub fn generate_alternative_queries(datasets: &[Dataset]) -> Vec<String> {
    let mut suggestions = Vec::new();

    for dataset in datasets {
        push_unique(&mut suggestions, format!("Show the data in {}", dataset.name));
        push_unique(
            &mut suggestions,
            format!("How many records are there in {}?", dataset.name),
        );

        let numeric_cols: Vec<&str> = dataset
            .columns
            .iter()
            .filter(|c| c.semantic_type.is_numeric())
            .map(|c| c.name.as_str())
            .take(2)
            .collect();
        for col in &numeric_cols {
            push_unique(
                &mut suggestions,
                format!("What is the average {} in {}?", col, dataset.name),
            );
            push_unique(
                &mut suggestions,
                format!(
                    "What are the minimum and maximum values of {} in {}?",
                    col, dataset.name
                ),
            );
        }

        if let Some(date_col) = dataset
            .columns
            .iter()
            .find(|c| c.semantic_type.is_temporal())
        {
            push_unique(
                &mut suggestions,
                format!("Show data in {} grouped by {}", dataset.name, date_col.name),
            );
        }

        if let Some(cat_col) = dataset
            .columns
            .iter()
            .find(|c| c.semantic_type == SemanticType::Categorical)
        {
            if let Some(numeric_col) = numeric_cols.first() {
                push_unique(
                    &mut suggestions,
                    format!(
                        "Show the average {} by {} in {}",
                        numeric_col, cat_col.name, dataset.name
                    ),
                );
            }
        }

        push_unique(
            &mut suggestions,
            format!("What are the main patterns in {}?", dataset.name),
        );

        for other in datasets {
            if other.name != dataset.name {
                push_unique(
                    &mut suggestions,
                    format!("Show data from {} related to {}", dataset.name, other.name),
                );
            }
        }
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

fn push_unique(suggestions: &mut Vec<String>, candidate: String) {
    if !suggestions.contains(&candidate) {
        suggestions.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    #[test]
    fn synthesizes_and_caps_at_ten() {
        let orders = Dataset::profile(
            "orders",
            "",
            Table::new(vec![
                Column::new(
                    "total",
                    vec![Value::Text("1".into()), Value::Text("2".into())],
                ),
                Column::new(
                    "status",
                    vec![Value::Text("paid".into()), Value::Text("paid".into())],
                ),
            ]),
        );
        let customers = Dataset::profile(
            "customers",
            "",
            Table::new(vec![Column::new("id", vec![Value::Text("1".into())])]),
        );
        let suggestions = generate_alternative_queries(&[orders, customers]);
        assert!(suggestions.len() <= MAX_SUGGESTIONS);
        assert!(suggestions.iter().any(|s| s.contains("average total")));
    }
}
