//! Query sanitation (spec.md §4.10, SPEC_FULL.md §2), ported from
//! `analysis_engine.py::_sanitize_query`: strip patterns that look like
//! an attempt to smuggle unsafe Python through the natural-language
//! question itself, before anything else runs.

use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(?:import|from).*(?:os|sys|subprocess|exec|eval)").unwrap(),
        Regex::new(r"__import__\(").unwrap(),
        Regex::new(r#"open\(.+?,.*?['"]w['"]"#).unwrap(),
        Regex::new(r"exec\(").unwrap(),
        Regex::new(r"eval\(").unwrap(),
        Regex::new(r"subprocess").unwrap(),
        Regex::new(r"sys\.").unwrap(),
        Regex::new(r"getattr\(").unwrap(),
        Regex::new(r"setattr\(").unwrap(),
        Regex::new(r"globals\(\)").unwrap(),
        Regex::new(r"locals\(\)").unwrap(),
    ]
});

/// Strip potentially unsafe content from a natural-language question
/// before it reaches the prompt builder or the alternative flow.
pub fn sanitize_query(query: &str) -> String {
    let mut sanitized = query.to_string();
    for pattern in UNSAFE_PATTERNS.iter() {
        sanitized = pattern.replace_all(&sanitized, "[removed]").into_owned();
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_os_import() {
        let sanitized = sanitize_query("how many orders? import os; os.system('ls')");
        assert!(!sanitized.contains("import os"));
    }

    #[test]
    fn strips_eval_call() {
        assert!(!sanitize_query("eval('1+1') and total sales").contains("eval("));
    }

    #[test]
    fn leaves_ordinary_questions_untouched() {
        let q = "total sales by region";
        assert_eq!(sanitize_query(q), q);
    }
}
