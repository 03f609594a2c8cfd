//! Pre-query entity check (spec.md §4.8 item 1), grounded on
//! `alternative_flow.py`'s `check_missing_entities`: scans the question
//! for a fixed set of entity keyword groups and, if a group is
//! mentioned but no loaded Dataset name matches it, returns a `Text`
//! response naming the available datasets plus three suggestions
//! instead of sending the question to the LLM.

use nlq_schema::Dataset;

use crate::suggestions::generate_alternative_queries;

const ENTITY_KEYWORD_GROUPS: &[(&str, &[&str])] = &[
    (
        "products",
        &["products", "product", "inventory", "stock", "item", "items", "merchandise"],
    ),
    (
        "employees",
        &["employees", "employee", "staff", "personnel", "workers", "worker"],
    ),
    (
        "departments",
        &["departments", "department", "division", "divisions", "sector", "sectors"],
    ),
    (
        "categories",
        &["categories", "category", "product type", "product types", "class", "classes"],
    ),
];

/// Returns a ready-to-send `Text` response if the question mentions an
/// entity group that has no matching loaded Dataset, `None` otherwise.
pub fn pre_query_check(question: &str, datasets: &[Dataset]) -> Option<String> {
    let lower = question.to_lowercase();

    for (entity_type, keywords) in ENTITY_KEYWORD_GROUPS {
        let entity_loaded = datasets
            .iter()
            .any(|d| d.name.to_lowercase().contains(entity_type));
        if entity_loaded {
            continue;
        }
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return Some(missing_entity_message(entity_type, datasets));
        }
    }

    None
}

fn missing_entity_message(entity_type: &str, datasets: &[Dataset]) -> String {
    let dataset_names = datasets
        .iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut message = if dataset_names.is_empty() {
        format!("There is no data about {} available. No datasets are currently loaded.", entity_type)
    } else {
        format!(
            "There is no data about {} available. The loaded datasets are: {}.",
            entity_type, dataset_names
        )
    };

    let alternatives = generate_alternative_queries(datasets);
    if !alternatives.is_empty() {
        message.push_str("\n\nYou could try one of these questions instead:\n");
        for (i, alt) in alternatives.iter().take(3).enumerate() {
            message.push_str(&format!("{}. {}\n", i + 1, alt));
        }
    }

    message.push_str("\nPlease rephrase your question to use the available data.");
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    #[test]
    fn flags_question_about_an_entity_with_no_matching_dataset() {
        let orders = Dataset::profile(
            "orders",
            "",
            Table::new(vec![Column::new("id", vec![Value::Text("1".into())])]),
        );
        let response = pre_query_check("how many employees do we have?", &[orders]);
        assert!(response.is_some());
        assert!(response.unwrap().contains("employees"));
    }

    #[test]
    fn passes_through_when_entity_dataset_is_loaded() {
        let employees = Dataset::profile(
            "employees",
            "",
            Table::new(vec![Column::new("id", vec![Value::Text("1".into())])]),
        );
        assert!(pre_query_check("how many employees do we have?", &[employees]).is_none());
    }

    #[test]
    fn passes_through_unrelated_questions() {
        let orders = Dataset::profile(
            "orders",
            "",
            Table::new(vec![Column::new("id", vec![Value::Text("1".into())])]),
        );
        assert!(pre_query_check("what is the total revenue?", &[orders]).is_none());
    }
}
