//! LLM-assisted query rephrasing with a rule-based fallback (spec.md
//! §4.8 item 2), grounded on `alternative_flow.py`'s `rephrase_query`:
//! ask the LLM to restate the question using only the available
//! datasets/columns; fall back to [`simplify_query`] when no provider
//! is configured, the call fails, or the response is degenerate (looks
//! like code rather than a question).

use nlq_llm::LlmProvider;
use nlq_schema::Dataset;
use tracing::warn;

use crate::simplify::simplify_query;

const REPHRASE_SYSTEM_MESSAGE: &str =
    "You restate a failed natural-language question so it avoids a specific error, \
     using only the datasets and columns listed. Reply with the restated question only.";

pub async fn rephrase_query(
    original_query: &str,
    error_info: &str,
    datasets: &[Dataset],
    llm: Option<&dyn LlmProvider>,
) -> String {
    let Some(llm) = llm else {
        return simplify_query(original_query);
    };

    let prompt = build_rephrase_prompt(original_query, error_info, datasets);
    match llm.generate_code(REPHRASE_SYSTEM_MESSAGE, &prompt).await {
        Ok(rephrased) if !is_degenerate(&rephrased) => rephrased.trim().to_string(),
        Ok(degenerate) => {
            warn!(response = %degenerate, "llm rephrase looked like code, falling back");
            simplify_query(original_query)
        }
        Err(err) => {
            warn!(error = %err, "llm rephrase failed, falling back");
            simplify_query(original_query)
        }
    }
}

fn is_degenerate(text: &str) -> bool {
    text.contains("import ") || text.contains("result =") || text.contains("```")
}

fn build_rephrase_prompt(original_query: &str, error_info: &str, datasets: &[Dataset]) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "The original question \"{}\" failed with this error:\n{}\n\n",
        original_query, error_info
    ));
    prompt.push_str("Available datasets and columns:\n");
    for dataset in datasets {
        let cols: Vec<&str> = dataset.columns.iter().map(|c| c.name.as_str()).collect();
        prompt.push_str(&format!("- {}: {}\n", dataset.name, cols.join(", ")));
    }
    prompt.push_str("\nRestate the question so it:\n");
    prompt.push_str("1. Uses only the datasets and columns above\n");
    prompt.push_str("2. Is simpler than the original\n");
    prompt.push_str("3. Preserves the original intent\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_llm::MockLlmProvider;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    #[tokio::test]
    async fn falls_back_to_simplification_without_a_provider() {
        let rephrased = rephrase_query("show products", "missing_table", &[], None).await;
        assert_eq!(rephrased, simplify_query("show products"));
    }

    #[tokio::test]
    async fn uses_llm_response_when_not_degenerate() {
        let mock = MockLlmProvider::new();
        mock.queue_response("How many rows are in orders?");
        let dataset = Dataset::profile(
            "orders",
            "",
            Table::new(vec![Column::new("id", vec![Value::Text("1".into())])]),
        );
        let rephrased = rephrase_query("show products", "missing_table", &[dataset], Some(&mock)).await;
        assert_eq!(rephrased, "How many rows are in orders?");
    }

    #[tokio::test]
    async fn falls_back_when_llm_response_is_degenerate() {
        let mock = MockLlmProvider::new();
        mock.queue_response("```python\nresult = 1\n```");
        let rephrased = rephrase_query("show products", "missing_table", &[], Some(&mock)).await;
        assert_eq!(rephrased, simplify_query("show products"));
    }
}
