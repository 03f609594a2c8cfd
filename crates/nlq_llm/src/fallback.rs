//! Fallback skeleton generator (spec.md §4.7): emitted when every
//! provider call raises, so the pipeline always has *some* code to
//! execute rather than surfacing a raw provider exception to the user.

use nlq_schema::Dataset;

const VISUALIZATION_KEYWORDS: &[&str] = &[
    "chart", "plot", "graph", "visualiz", "visualis", "trend", "bar chart", "pie chart",
];

const ROW_LIMIT: usize = 50;

pub fn fallback_skeleton(question: &str, datasets: &[Dataset]) -> String {
    let Some(first) = datasets.first() else {
        return "result = {\"type\": \"text\", \"value\": \"no dataset is loaded\"}".to_string();
    };

    if wants_visualization(question) {
        if let Some(numeric_col) = first
            .columns
            .iter()
            .find(|c| c.semantic_type.is_numeric())
        {
            return bar_chart_skeleton(&first.name, &numeric_col.name);
        }
    }

    text_summary_skeleton(&first.name)
}

fn wants_visualization(question: &str) -> bool {
    let lower = question.to_lowercase();
    VISUALIZATION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn text_summary_skeleton(dataset_name: &str) -> String {
    let mut code = String::new();
    code.push_str(&format!(
        "rows = sql(\"SELECT * FROM {} LIMIT {}\")\n",
        dataset_name, ROW_LIMIT
    ));
    code.push_str(&format!(
        "result = {{\"type\": \"text\", \"value\": f\"showing up to {} rows from {}: {{len(rows)}} returned\"}}\n",
        ROW_LIMIT, dataset_name
    ));
    code
}

fn bar_chart_skeleton(dataset_name: &str, numeric_col: &str) -> String {
    let mut code = String::new();
    code.push_str(&format!(
        "rows = sql(\"SELECT * FROM {} LIMIT {}\")\n",
        dataset_name, ROW_LIMIT
    ));
    code.push_str("labels = [str(i) for i in range(len(rows))]\n");
    code.push_str(&format!("values = [r.get(\"{}\") for r in rows]\n", numeric_col));
    code.push_str("result = {\n");
    code.push_str("    \"type\": \"chart\",\n");
    code.push_str("    \"value\": {\n");
    code.push_str("        \"format\": \"apex\",\n");
    code.push_str("        \"config\": {\n");
    code.push_str("            \"chart\": {\"type\": \"bar\"},\n");
    code.push_str(&format!(
        "            \"series\": [{{\"name\": \"{}\", \"data\": values}}],\n",
        numeric_col
    ));
    code.push_str("            \"xaxis\": {\"categories\": labels},\n");
    code.push_str("        },\n");
    code.push_str("    },\n");
    code.push_str("}\n");
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    fn sales_dataset() -> Dataset {
        Dataset::profile(
            "sales",
            "",
            Table::new(vec![Column::new(
                "revenue",
                vec![Value::Text("1".into()), Value::Text("2".into())],
            )]),
        )
    }

    #[test]
    fn falls_back_to_table_preview_by_default() {
        let code = fallback_skeleton("what is in this data?", &[sales_dataset()]);
        assert!(code.contains("\"type\": \"text\""));
        assert!(code.contains("FROM sales"));
    }

    #[test]
    fn falls_back_to_bar_chart_on_visualization_keywords() {
        let code = fallback_skeleton("show me a chart of revenue", &[sales_dataset()]);
        assert!(code.contains("\"format\": \"apex\""));
        assert!(code.contains("revenue"));
    }

    #[test]
    fn handles_no_loaded_dataset() {
        let code = fallback_skeleton("anything", &[]);
        assert!(code.contains("no dataset is loaded"));
    }
}
