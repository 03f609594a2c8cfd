//! Last-resort predefined suggestions (spec.md §4.10: `offer_predefined`),
//! grounded on `alternative_flow.py`'s `offer_predefined_options`: used
//! once the Engine's retry budget is exhausted.

use nlq_schema::Dataset;

use crate::suggestions::generate_alternative_queries;

pub fn offer_predefined_options(query: &str, error_msg: &str, datasets: &[Dataset]) -> String {
    let alternatives = generate_alternative_queries(datasets);

    let mut message = format!(
        "Could not process the question: \"{}\"\n\nError: {}\n\nHere are some alternative questions you could try:\n\n",
        query, error_msg
    );
    for (i, alt) in alternatives.iter().take(5).enumerate() {
        message.push_str(&format!("{}. {}\n", i + 1, alt));
    }
    message.push_str(
        "\nYou could also:\n\
         - Simplify your question\n\
         - Specify exactly which datasets you want to query\n\
         - Provide feedback to help us improve\n",
    );
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    #[test]
    fn includes_the_error_and_up_to_five_alternatives() {
        let dataset = Dataset::profile(
            "orders",
            "",
            Table::new(vec![Column::new(
                "total",
                vec![Value::Text("1".into()), Value::Text("2".into())],
            )]),
        );
        let message = offer_predefined_options("show revenue trends", "sql syntax error", &[dataset]);
        assert!(message.contains("show revenue trends"));
        assert!(message.contains("sql syntax error"));
        assert!(message.lines().filter(|l| l.trim_start().chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false)).count() <= 5);
    }
}
