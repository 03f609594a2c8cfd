//! The fixed system message (spec.md §4.6): pins the output contract so
//! every downstream stage (C5 execution, C1 parsing) can rely on it
//! without re-deriving it per question.

pub const ALLOWED_IMPORTS_HINT: &str =
    "numpy, pandas, math, random, datetime, json, itertools, collections, re, statistics";

/// Built once per request; the contract text itself never varies with
/// the dataset, so this is a plain function rather than a builder.
pub fn build_system_message() -> String {
    let mut msg = String::new();
    msg.push_str(
        "You write short Python programs that answer a question about a loaded dataset.\n\n",
    );
    msg.push_str("Rules:\n");
    msg.push_str("- Call `sql(query)` to run a read-only SQL query against the loaded tables; it returns a list of row dicts.\n");
    msg.push_str("- Every loaded dataset is also available in your namespace as a Python list of row dicts, named after the dataset.\n");
    msg.push_str(&format!(
        "- You may only import from: {}. No other imports, no file or network access.\n",
        ALLOWED_IMPORTS_HINT
    ));
    msg.push_str("- Assign your final answer to a variable named `result`, shaped as `{\"type\": <tag>, \"value\": <value>}`, where `<tag>` is one of:\n");
    msg.push_str("    - \"scalar\": value is a single number.\n");
    msg.push_str("    - \"text\": value is a string.\n");
    msg.push_str("    - \"table\": value is a list of row dicts.\n");
    msg.push_str("    - \"chart\": value is `{\"format\": \"apex\", \"config\": {...}}`, an ApexCharts-compatible series configuration.\n");
    msg.push_str("- Do not print anything except through the `result` assignment; do not define functions unless needed for clarity.\n");
    msg.push_str("- Prefer `sql(...)` for filtering, joining, and aggregation; use Python only for shaping the final result.\n");
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_the_output_contract() {
        let msg = build_system_message();
        assert!(msg.contains("result"));
        assert!(msg.contains("sql("));
        assert!(msg.contains("apex"));
    }
}
