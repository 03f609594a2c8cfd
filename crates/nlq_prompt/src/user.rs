//! User message assembly (spec.md §4.6): enumerates every loaded
//! dataset's schema, relationships, worked SQL examples, and any
//! feedback-store grounding, following the same sectioned
//! `String::push_str` style used for the equivalent Python-generation
//! prompt in the teacher's codebase.

use nlq_schema::{ColumnMetadata, ColumnStats, Dataset};

use crate::examples::synthesize_worked_examples;
use crate::feedback::FeedbackExample;

pub fn build_user_message(question: &str, datasets: &[Dataset], feedback: &[FeedbackExample]) -> String {
    let mut msg = String::new();

    msg.push_str("# Available datasets\n\n");
    for dataset in datasets {
        write_dataset_section(&mut msg, dataset);
    }

    let examples = synthesize_worked_examples(datasets);
    if !examples.is_empty() {
        msg.push_str("# Worked SQL examples\n\n");
        for example in &examples {
            msg.push_str("```sql\n");
            msg.push_str(example);
            msg.push_str("\n```\n\n");
        }
    }

    if !feedback.is_empty() {
        msg.push_str("# Similar past questions\n\n");
        msg.push_str("These were answered successfully before; adapt their approach if relevant.\n\n");
        for example in feedback {
            msg.push_str(&format!("Q: {}\n```python\n{}\n```\n\n", example.question, example.code));
        }
    }

    msg.push_str("# Question\n\n");
    msg.push_str(question);
    msg.push('\n');

    msg
}

fn write_dataset_section(msg: &mut String, dataset: &Dataset) {
    msg.push_str(&format!("## {}\n", dataset.name));
    if !dataset.description.is_empty() {
        msg.push_str(&format!("{}\n", dataset.description));
    }
    msg.push_str(&format!(
        "{} rows, {} columns\n\n",
        dataset.row_count(),
        dataset.column_count()
    ));

    msg.push_str("Columns:\n");
    for col in &dataset.columns {
        msg.push_str(&format!(
            "- `{}` ({}){}: {}\n",
            col.name,
            col.semantic_type,
            if col.nullable { ", nullable" } else { "" },
            suggest_column_description(col),
        ));
    }
    msg.push('\n');

    if let Some(pk) = &dataset.primary_key {
        msg.push_str(&format!("Primary key: `{}`\n", pk));
    }
    if !dataset.potential_foreign_keys.is_empty() {
        msg.push_str(&format!(
            "Foreign keys: {}\n",
            dataset
                .potential_foreign_keys
                .iter()
                .map(|c| format!("`{}`", c))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    if !dataset.relationships.is_empty() {
        msg.push_str("Relationships:\n");
        for rel in &dataset.relationships {
            msg.push_str(&format!(
                "- `{}.{}` -> `{}.{}`\n",
                dataset.name, rel.source_column, rel.target_dataset, rel.target_column
            ));
        }
    }
    msg.push('\n');
}

fn suggest_column_description(col: &ColumnMetadata) -> String {
    let sample = if col.sample.is_empty() {
        String::new()
    } else {
        format!(" e.g. {}", col.sample.join(", "))
    };
    match &col.stats {
        ColumnStats::Numeric { min, max, mean } => format!(
            "numeric, ranges {:.2}-{:.2}, mean {:.2}{}",
            min, max, mean, sample
        ),
        ColumnStats::Temporal { earliest, latest } => {
            format!("date/time, spans {} to {}{}", earliest, latest, sample)
        }
        ColumnStats::Categorical { top_values } => {
            let top: Vec<String> = top_values.iter().take(3).map(|(v, _)| v.clone()).collect();
            format!("categorical, common values: {}{}", top.join(", "), sample)
        }
        ColumnStats::None => format!("text field{}", sample),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    #[test]
    fn includes_dataset_schema_and_question() {
        let dataset = Dataset::profile(
            "orders",
            "order history",
            Table::new(vec![Column::new(
                "order_id",
                vec![Value::Text("1".into()), Value::Text("2".into())],
            )]),
        );
        let msg = build_user_message("how many orders are there?", &[dataset], &[]);
        assert!(msg.contains("## orders"));
        assert!(msg.contains("order history"));
        assert!(msg.contains("order_id"));
        assert!(msg.contains("how many orders are there?"));
    }

    #[test]
    fn includes_feedback_examples_when_present() {
        let dataset = Dataset::profile(
            "orders",
            "",
            Table::new(vec![Column::new("id", vec![Value::Text("1".into())])]),
        );
        let feedback = vec![FeedbackExample {
            question: "total orders?".into(),
            code: "result = {\"type\": \"scalar\", \"value\": len(orders)}".into(),
        }];
        let msg = build_user_message("how many orders?", &[dataset], &feedback);
        assert!(msg.contains("Similar past questions"));
        assert!(msg.contains("total orders?"));
    }
}
