//! Error kinds shared between the Sandboxed Code Executor, the SQL
//! Dialect Adapter, the Response Taxonomy and the Analysis Engine
//! (spec.md §7).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The classification table of spec.md §7, flattened into one enum so
/// that every producer (C1/C4/C5/C7/C8/C10) tags failures the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// C5 syntax/AST/import check failed. Never retried.
    Validation,
    /// C5 execution deadline exceeded. Never retried.
    Timeout,
    /// C4: a referenced table does not exist in the registry. Recovered
    /// locally with a `Text` response naming available tables.
    TableNotFound,
    /// C4/C5: a referenced column does not exist. Retried via rephrase.
    ColumnNotFound,
    /// C4: the rewritten query failed to parse/execute in the engine.
    /// Retried via rephrase.
    SqlSyntax,
    /// C1: the captured result's value didn't match its declared tag.
    /// Retried via rephrase.
    TypeMismatch,
    /// C7: the configured provider raised/timed out. Recovered via the
    /// mock fallback, never surfaced to the caller as a failure.
    LlmUnavailable,
    /// C8 pre-check: the question mentions an entity with no loaded
    /// Dataset. Recovered locally with a `Text` response + alternatives.
    MissingEntity,
    /// C10: the retry budget was exhausted without a successful result.
    ExhaustedRetries,
    /// Catch-all for errors that don't fit the above, still go through
    /// the same recovery path as `ColumnNotFound`/`SqlSyntax`.
    Generic,
}

impl ErrorKind {
    /// Whether this kind is eligible for the Engine's retry/rephrase
    /// loop (spec.md §7, "Recovered locally?" / "User-visible" columns).
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::ColumnNotFound
                | ErrorKind::SqlSyntax
                | ErrorKind::TypeMismatch
                | ErrorKind::Generic
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Timeout => "timeout",
            ErrorKind::TableNotFound => "missing_table",
            ErrorKind::ColumnNotFound => "missing_column",
            ErrorKind::SqlSyntax => "sql_syntax",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::LlmUnavailable => "llm_unavailable",
            ErrorKind::MissingEntity => "missing_entity",
            ErrorKind::ExhaustedRetries => "exhausted_retries",
            ErrorKind::Generic => "generic",
        };
        write!(f, "{}", s)
    }
}

/// Classifies a raw error message into an [`ErrorKind`], per spec.md §4.8
/// item 2. Pure string heuristics, same as the original's
/// `handle_error`/`rephrase_query` dispatch.
pub fn classify_error(message: &str) -> ErrorKind {
    let lower = message.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        ErrorKind::Timeout
    } else if lower.contains("no such table")
        || lower.contains("table not found")
        || lower.contains("catalog error")
    {
        ErrorKind::TableNotFound
    } else if lower.contains("no such column")
        || lower.contains("column not found")
        || lower.contains("binder error")
    {
        ErrorKind::ColumnNotFound
    } else if lower.contains("syntax error") || lower.contains("parser error") {
        ErrorKind::SqlSyntax
    } else if lower.contains("invalid output")
        || lower.contains("type mismatch")
        || lower.contains("expected a")
        || lower.contains("expected an")
    {
        ErrorKind::TypeMismatch
    } else {
        ErrorKind::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_missing_table_before_missing_column() {
        assert_eq!(
            classify_error("Catalog Error: Table with name products does not exist"),
            ErrorKind::TableNotFound
        );
    }

    #[test]
    fn classifies_timeout_regardless_of_case() {
        assert_eq!(classify_error("Execution TIMED OUT after 30s"), ErrorKind::Timeout);
    }

    #[test]
    fn classifies_expected_value_messages_as_type_mismatch() {
        assert_eq!(
            classify_error("expected a numeric value for result type 'scalar', got: \"nope\""),
            ErrorKind::TypeMismatch
        );
        assert_eq!(
            classify_error("expected an array of row objects for result type 'table', got: 3"),
            ErrorKind::TypeMismatch
        );
    }

    #[test]
    fn non_retryable_kinds_are_excluded() {
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::Timeout.is_retryable());
        assert!(!ErrorKind::MissingEntity.is_retryable());
        assert!(!ErrorKind::ExhaustedRetries.is_retryable());
    }
}
