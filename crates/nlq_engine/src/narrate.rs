//! `generate_analysis` (SPEC_FULL.md §2), ported from
//! `analysis_engine.py::generate_analysis`: a one-paragraph natural-
//! language gloss of a successful result, for the `analysis` field of
//! the HTTP result shape (spec.md §6). Templated by default; when a
//! real LLM provider is configured it is asked to restate the template
//! more naturally, the same optional-provider idiom used by
//! [`nlq_altflow::rephrase_query`].

use nlq_llm::LlmProvider;
use nlq_protocol::{ChartFormat, Response};

const NARRATE_SYSTEM_MESSAGE: &str =
    "You restate a one-paragraph data analysis summary in clearer natural language, \
     without changing any numbers or facts in it. Reply with the restated summary only.";

pub async fn generate_analysis(response: &Response, query: &str, llm: Option<&dyn LlmProvider>) -> String {
    let template = templated_analysis(response, query);

    let Some(llm) = llm else {
        return template;
    };
    let prompt = format!(
        "Question: \"{}\"\n\nSummary to restate:\n{}",
        query, template
    );
    match llm.generate_code(NARRATE_SYSTEM_MESSAGE, &prompt).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => template,
    }
}

fn templated_analysis(response: &Response, query: &str) -> String {
    match response {
        Response::Table(table) => {
            let mut lines = vec![format!(
                "The query returned {} record(s) with {} column(s).",
                table.total_records,
                table.rows.first().and_then(|r| r.as_object()).map(|o| o.len()).unwrap_or(0)
            )];

            if table.total_records <= 10 {
                lines.push(
                    "This is a small result set; consider broadening the question for more data.".to_string(),
                );
            }

            if let Some(null_cols) = columns_with_nulls(table) {
                if !null_cols.is_empty() {
                    lines.push(format!("Columns with null values: {}.", null_cols.join(", ")));
                }
            }

            lines.join("\n")
        }
        Response::Chart(chart) => {
            let mut lines = vec![format!("Visualization generated for the query: '{}'.", query)];
            if chart.format == ChartFormat::Apex {
                if let Some(series) = chart.config.get("series").and_then(|s| s.as_array()) {
                    lines.push(format!("The chart contains {} series of data.", series.len()));
                }
                if let Some(title) = chart
                    .config
                    .get("title")
                    .and_then(|t| t.get("text"))
                    .and_then(|t| t.as_str())
                {
                    lines.push(format!("Chart title: {}.", title));
                }
            }
            lines.join("\n")
        }
        Response::Scalar(n) => format!("The numeric result obtained was {}.", n),
        Response::Text(s) => {
            let char_count = s.chars().count();
            let truncated = if char_count > 100 {
                format!("{}...", s.chars().take(100).collect::<String>())
            } else {
                s.clone()
            };
            format!("The answer obtained is: '{}'.", truncated)
        }
        Response::Error(detail) => format!("The query could not be processed: {}.", detail.message),
    }
}

fn columns_with_nulls(table: &nlq_protocol::TableResult) -> Option<Vec<String>> {
    let mut null_columns = std::collections::BTreeSet::new();
    for row in &table.rows {
        let obj = row.as_object()?;
        for (key, value) in obj {
            if value.is_null() {
                null_columns.insert(key.clone());
            }
        }
    }
    Some(null_columns.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::{ErrorDetail, ErrorKind, TableResult};
    use serde_json::json;

    #[tokio::test]
    async fn table_summary_reports_counts_and_nulls() {
        let table = TableResult {
            rows: vec![json!({"a": 1, "b": null}), json!({"a": 2, "b": 3})],
            total_records: 2,
            results_limited: false,
        };
        let summary = generate_analysis(&Response::Table(table), "q", None).await;
        assert!(summary.contains("2 record"));
        assert!(summary.contains("null values: b"));
    }

    #[tokio::test]
    async fn scalar_summary_states_the_value() {
        let summary = generate_analysis(&Response::Scalar(42.0), "q", None).await;
        assert!(summary.contains("42"));
    }

    #[tokio::test]
    async fn error_summary_never_panics() {
        let err = Response::Error(ErrorDetail {
            kind: ErrorKind::Generic,
            message: "boom".to_string(),
            last_code: None,
        });
        let summary = generate_analysis(&err, "q", None).await;
        assert!(summary.contains("boom"));
    }
}
