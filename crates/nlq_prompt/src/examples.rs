//! Worked SQL example synthesis (spec.md §4.6): three to six examples
//! built from the actual loaded columns, so the LLM sees real table and
//! column names rather than a generic template.

use nlq_schema::{Dataset, RelationshipKind, SemanticType};

/// Synthesize three to six worked SQL examples covering, in order: a
/// simple projection, a filter, an aggregation, a time-series bucket
/// (when a date/datetime column exists), and a JOIN (when the primary
/// dataset has a detected relationship to another loaded dataset).
pub fn synthesize_worked_examples(datasets: &[Dataset]) -> Vec<String> {
    let mut examples = Vec::new();
    let Some(primary) = datasets.first() else {
        return examples;
    };

    if let Some(example) = projection_example(primary) {
        examples.push(example);
    }
    if let Some(example) = filter_example(primary) {
        examples.push(example);
    }
    if let Some(example) = aggregation_example(primary) {
        examples.push(example);
    }
    if let Some(example) = time_series_example(primary) {
        examples.push(example);
    }
    if let Some(example) = join_example(primary, datasets) {
        examples.push(example);
    }

    examples.truncate(6);
    examples
}

fn projection_example(dataset: &Dataset) -> Option<String> {
    let cols: Vec<&str> = dataset
        .columns
        .iter()
        .take(3)
        .map(|c| c.name.as_str())
        .collect();
    if cols.is_empty() {
        return None;
    }
    Some(format!(
        "SELECT {} FROM {} LIMIT 10",
        cols.join(", "),
        dataset.name
    ))
}

fn filter_example(dataset: &Dataset) -> Option<String> {
    let col = dataset.columns.iter().find(|c| {
        matches!(
            c.semantic_type,
            SemanticType::Categorical | SemanticType::String
        ) && !c.sample.is_empty()
    });
    if let Some(col) = col {
        return Some(format!(
            "SELECT * FROM {} WHERE {} = '{}' LIMIT 10",
            dataset.name, col.name, col.sample[0]
        ));
    }

    let numeric = dataset
        .columns
        .iter()
        .find(|c| c.semantic_type.is_numeric() && !c.sample.is_empty());
    numeric.map(|col| {
        format!(
            "SELECT * FROM {} WHERE {} > {} LIMIT 10",
            dataset.name, col.name, col.sample[0]
        )
    })
}

fn aggregation_example(dataset: &Dataset) -> Option<String> {
    let numeric = dataset
        .columns
        .iter()
        .find(|c| c.semantic_type.is_numeric())?;
    let group = dataset
        .columns
        .iter()
        .find(|c| c.semantic_type == SemanticType::Categorical);

    Some(match group {
        Some(group) => format!(
            "SELECT {}, AVG({}) AS avg_{} FROM {} GROUP BY {} ORDER BY avg_{} DESC",
            group.name, numeric.name, numeric.name, dataset.name, group.name, numeric.name
        ),
        None => format!(
            "SELECT AVG({}) AS avg_{}, COUNT(*) AS n FROM {}",
            numeric.name, numeric.name, dataset.name
        ),
    })
}

fn time_series_example(dataset: &Dataset) -> Option<String> {
    let date_col = dataset
        .columns
        .iter()
        .find(|c| c.semantic_type.is_temporal())?;
    Some(format!(
        "SELECT DATE_TRUNC('month', {}) AS month, COUNT(*) AS n FROM {} GROUP BY month ORDER BY month",
        date_col.name, dataset.name
    ))
}

fn join_example(primary: &Dataset, datasets: &[Dataset]) -> Option<String> {
    let rel = primary.relationships.first()?;
    let target_exists = datasets.iter().any(|d| d.name == rel.target_dataset);
    if !target_exists {
        return None;
    }
    let hint = match rel.kind {
        RelationshipKind::NameMatch => "name match",
        RelationshipKind::ValueOverlap => "value overlap",
    };
    Some(format!(
        "-- joins on a relationship detected via {}\nSELECT a.*, b.* FROM {} a JOIN {} b ON a.{} = b.{} LIMIT 10",
        hint, primary.name, rel.target_dataset, rel.source_column, rel.target_column
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    fn orders_dataset() -> Dataset {
        Dataset::profile(
            "orders",
            "",
            Table::new(vec![
                Column::new(
                    "order_id",
                    vec![Value::Text("1".into()), Value::Text("2".into())],
                ),
                Column::new(
                    "status",
                    vec![Value::Text("paid".into()), Value::Text("paid".into())],
                ),
                Column::new(
                    "total",
                    vec![Value::Text("9.5".into()), Value::Text("2.0".into())],
                ),
            ]),
        )
    }

    #[test]
    fn synthesizes_projection_filter_and_aggregation() {
        let datasets = vec![orders_dataset()];
        let examples = synthesize_worked_examples(&datasets);
        assert!(examples.iter().any(|e| e.starts_with("SELECT order_id")));
        assert!(examples.iter().any(|e| e.contains("WHERE status =")));
        assert!(examples.iter().any(|e| e.contains("AVG(total)")));
    }

    #[test]
    fn caps_at_six_examples() {
        let datasets = vec![orders_dataset()];
        let examples = synthesize_worked_examples(&datasets);
        assert!(examples.len() <= 6);
    }
}
