//! Rule-based query simplification (spec.md §4.8 item 2), grounded on
//! `alternative_flow.py`'s `simplify_query`: used when no LLM is
//! available, or when its rephrasing is degenerate.

use once_cell::sync::Lazy;
use regex::Regex;

const WH_WORDS: &[&str] = &["show", "list", "display", "present", "what", "which", "how", "where", "when"];

static SIMPLIFICATIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"(?i)products?").unwrap(), "data"),
        (Regex::new(r"(?i)employees?|staff|personnel").unwrap(), "people"),
        (Regex::new(r"(?i)departments?|divisions?|sectors?").unwrap(), "groups"),
        (Regex::new(r"(?i)categories|category").unwrap(), "types"),
        (Regex::new(r"(?i)inventory|stock").unwrap(), "quantity"),
    ]
});

pub fn simplify_query(query: &str) -> String {
    let mut simplified = query.to_string();
    for (pattern, replacement) in SIMPLIFICATIONS.iter() {
        simplified = pattern.replace_all(&simplified, *replacement).to_string();
    }

    if simplified != query {
        return simplified;
    }

    let lower = query.to_lowercase();
    for word in WH_WORDS {
        if let Some(idx) = lower.find(word) {
            let after = &query[idx + word.len()..];
            let trailing = after.trim_start_matches(|c: char| !c.is_alphanumeric());
            if !trailing.is_empty() {
                return format!("{} the available data about {}", word, trailing);
            }
        }
    }

    "show a summary of the available data".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_domain_specific_terms() {
        let simplified = simplify_query("list the products by category");
        assert!(simplified.contains("data"));
        assert!(simplified.contains("types"));
        assert_ne!(simplified, "list the products by category");
    }

    #[test]
    fn extracts_trailing_noun_phrase_when_nothing_to_substitute() {
        let simplified = simplify_query("how revenue trends over time");
        assert!(simplified.starts_with("how the available data about"));
    }

    #[test]
    fn degrades_to_generic_summary_as_last_resort() {
        assert_eq!(simplify_query("xyz"), "show a summary of the available data");
    }
}
