//! Read-only SQL validation (spec.md §4.4, invariant I2: the engine
//! never mutates a loaded Dataset's backing tables). Grounded on
//! `casparian_db::sql_guard`: strip comments/literals before scanning
//! for forbidden keywords, require a single statement, require the
//! query to start with SELECT/WITH/EXPLAIN.

use crate::error::SqlError;

const ALLOWED_PREFIXES: &[&str] = &["SELECT", "WITH", "EXPLAIN"];
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "TRUNCATE", "COPY", "ATTACH",
    "DETACH", "INSTALL", "LOAD", "PRAGMA",
];

pub fn validate_read_only(sql: &str) -> Result<(), SqlError> {
    let sanitized = blank_comments_and_literals(sql);
    let trimmed = sanitized.trim();
    if trimmed.is_empty() {
        return Err(SqlError::GuardRejected("query is empty".into()));
    }

    reject_multiple_statements(&sanitized)?;

    let first = first_keyword(&sanitized)
        .ok_or_else(|| SqlError::GuardRejected("query must start with SELECT, WITH, or EXPLAIN".into()))?;
    if !ALLOWED_PREFIXES.contains(&first.as_str()) {
        return Err(SqlError::GuardRejected(
            "query must start with SELECT, WITH, or EXPLAIN".into(),
        ));
    }

    for token in tokens_upper(&sanitized) {
        if FORBIDDEN_KEYWORDS.contains(&token.as_str()) {
            return Err(SqlError::GuardRejected(format!(
                "query contains forbidden keyword: {}",
                token
            )));
        }
    }

    Ok(())
}

/// Wrap a validated query in a row-limiting subselect, matching the
/// §8 testable property that Table responses never exceed the cap.
pub fn apply_row_limit(sql: &str, limit: usize) -> String {
    let stripped = strip_trailing_semicolon(sql);
    let keyword = first_keyword(&blank_comments_and_literals(stripped));
    match keyword.as_deref() {
        Some("EXPLAIN") => stripped.trim().to_string(),
        Some("SELECT") | Some("WITH") => {
            format!("SELECT * FROM ({}) AS _nlq_limited LIMIT {}", stripped.trim(), limit)
        }
        _ => stripped.trim().to_string(),
    }
}

fn strip_trailing_semicolon(sql: &str) -> &str {
    let trimmed = sql.trim();
    trimmed.strip_suffix(';').map(str::trim_end).unwrap_or(trimmed)
}

fn reject_multiple_statements(sql: &str) -> Result<(), SqlError> {
    let mut semicolons = sql.match_indices(';').map(|(idx, _)| idx);
    let first = semicolons.next();
    if semicolons.next().is_some() {
        return Err(SqlError::GuardRejected("multiple statements are not allowed".into()));
    }
    if let Some(idx) = first {
        if sql[idx + 1..].chars().any(|c| !c.is_whitespace()) {
            return Err(SqlError::GuardRejected("multiple statements are not allowed".into()));
        }
    }
    Ok(())
}

fn first_keyword(sql: &str) -> Option<String> {
    let mut current = String::new();
    for ch in sql.chars() {
        if ch.is_ascii_alphabetic() {
            current.push(ch);
        } else if !current.is_empty() {
            break;
        }
    }
    (!current.is_empty()).then(|| current.to_ascii_uppercase())
}

fn tokens_upper(sql: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in sql.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current).to_ascii_uppercase());
        }
    }
    if !current.is_empty() {
        tokens.push(current.to_ascii_uppercase());
    }
    tokens
}

/// Blank out string literals and comments with spaces so keyword
/// scanning can't be fooled by `'DROP TABLE'` inside a string or a
/// `-- DELETE` comment, while preserving character offsets.
fn blank_comments_and_literals(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
            }
            out.push(' ');
            continue;
        }
        if in_block_comment {
            if ch == '*' && matches!(chars.peek(), Some('/')) {
                chars.next();
                in_block_comment = false;
                out.push_str("  ");
                continue;
            }
            out.push(' ');
            continue;
        }
        if in_single {
            if ch == '\'' {
                if matches!(chars.peek(), Some('\'')) {
                    chars.next();
                    out.push_str("  ");
                    continue;
                }
                in_single = false;
            }
            out.push(' ');
            continue;
        }
        if in_double {
            if ch == '"' {
                in_double = false;
            }
            out.push(' ');
            continue;
        }
        if ch == '-' && matches!(chars.peek(), Some('-')) {
            chars.next();
            in_line_comment = true;
            out.push_str("  ");
            continue;
        }
        if ch == '/' && matches!(chars.peek(), Some('*')) {
            chars.next();
            in_block_comment = true;
            out.push_str("  ");
            continue;
        }
        if ch == '\'' {
            in_single = true;
            out.push(' ');
            continue;
        }
        if ch == '"' {
            in_double = true;
            out.push(' ');
            continue;
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_select_with_explain() {
        assert!(validate_read_only("SELECT * FROM orders").is_ok());
        assert!(validate_read_only("WITH cte AS (SELECT 1) SELECT * FROM cte").is_ok());
        assert!(validate_read_only("EXPLAIN SELECT * FROM orders").is_ok());
    }

    #[test]
    fn rejects_mutating_statements() {
        assert!(validate_read_only("INSERT INTO orders VALUES (1)").is_err());
        assert!(validate_read_only("DROP TABLE orders").is_err());
        assert!(validate_read_only("UPDATE orders SET id = 1").is_err());
    }

    #[test]
    fn ignores_keywords_in_comments_and_literals() {
        assert!(validate_read_only("SELECT 'DROP TABLE x' FROM orders").is_ok());
        assert!(validate_read_only("SELECT 1 -- DELETE FROM orders").is_ok());
    }

    #[test]
    fn rejects_multiple_statements() {
        assert!(validate_read_only("SELECT 1; DROP TABLE orders").is_err());
        assert!(validate_read_only("SELECT 1;").is_ok());
    }

    #[test]
    fn row_limit_wraps_select_but_not_explain() {
        assert_eq!(
            apply_row_limit("SELECT * FROM orders", 25),
            "SELECT * FROM (SELECT * FROM orders) AS _nlq_limited LIMIT 25"
        );
        assert_eq!(
            apply_row_limit("EXPLAIN SELECT * FROM orders", 25),
            "EXPLAIN SELECT * FROM orders"
        );
    }
}
