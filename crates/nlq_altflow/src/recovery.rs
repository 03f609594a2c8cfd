//! Error classification and recovery (spec.md §4.8 item 2), grounded on
//! `alternative_flow.py`'s `handle_error`/`handle_missing_table_error`.
//! Classification itself lives in `nlq_protocol::error::classify_error`
//! so C1/C4/C5/C7/C10 share one taxonomy; this module adds the
//! missing-table-specific friendly response.

use nlq_schema::Dataset;
use once_cell::sync::Lazy;
use regex::Regex;

pub use nlq_protocol::error::{classify_error, ErrorKind};

static TABLE_NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"(?i)table with name ['"]?(\w+)['"]?"#).unwrap(),
        Regex::new(r#"(?i)no such table:?\s*['"]?(\w+)['"]?"#).unwrap(),
        Regex::new(r#"(?i)table not found:?\s*['"]?(\w+)['"]?"#).unwrap(),
    ]
});

pub fn extract_missing_table_name(error_msg: &str) -> Option<String> {
    TABLE_NAME_PATTERNS
        .iter()
        .find_map(|re| re.captures(error_msg))
        .map(|caps| caps[1].to_string())
}

/// A friendly response naming the missing table (when it could be
/// extracted) and every loaded dataset with a preview of its columns.
pub fn missing_table_response(error_msg: &str, datasets: &[Dataset]) -> String {
    let missing = extract_missing_table_name(error_msg).unwrap_or_else(|| "referenced".to_string());

    let mut message = format!(
        "Could not find the table '{}' in the available data.\n\nThe loaded datasets are:\n",
        missing
    );
    for dataset in datasets {
        let cols: Vec<&str> = dataset.columns.iter().take(5).map(|c| c.name.as_str()).collect();
        let suffix = if dataset.columns.len() > 5 { "..." } else { "" };
        message.push_str(&format!("- {}: {}{}\n", dataset.name, cols.join(", "), suffix));
    }
    message.push_str("\nPlease rephrase your question to use only the datasets listed above.");
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    #[test]
    fn extracts_table_name_from_duckdb_catalog_error() {
        let msg = "Catalog Error: Table with name products does not exist!";
        assert_eq!(extract_missing_table_name(msg).as_deref(), Some("products"));
    }

    #[test]
    fn missing_table_response_lists_loaded_datasets() {
        let orders = Dataset::profile(
            "orders",
            "",
            Table::new(vec![Column::new("id", vec![Value::Text("1".into())])]),
        );
        let msg = missing_table_response("no such table: products", &[orders]);
        assert!(msg.contains("products"));
        assert!(msg.contains("orders"));
    }
}
