//! Top-level error type for the Analysis Engine facade. Query failures
//! are never propagated as `Err` out of `process_query` (every failure
//! path produces a typed `Response::Error`, spec.md §7); this type
//! covers the surrounding facade operations — loading data, session
//! lookup — that do have a legitimate failure-to-proceed case.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("SQL engine error: {0}")]
    Sql(#[from] nlq_sql::SqlError),

    #[error("feedback store error: {0}")]
    Feedback(#[from] nlq_feedback::FeedbackError),
}
