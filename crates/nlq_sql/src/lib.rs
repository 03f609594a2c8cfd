//! SQL Dialect Adapter (C4): an embedded, read-only DuckDB engine that
//! Dataset tables load into and the Analysis Core queries against
//! (spec.md §4.4).

pub mod dialect;
pub mod engine;
pub mod error;
pub mod guard;

pub use dialect::rewrite_dialect;
pub use engine::{QueryResult, SqlEngine};
pub use error::SqlError;
