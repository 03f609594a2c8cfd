//! The `sql(query)` capability exposed inside guest code (spec.md §4.5)
//! is implemented as an RPC back to the caller rather than by linking
//! `nlq_sql` into this crate: the guest process has no direct access to
//! the engine's DuckDB connection, only to this socket.

use serde_json::Value as JsonValue;

/// Implemented by the caller (`nlq_engine`) to answer `sql()` calls made
/// from inside the guest process. Errors are returned as plain strings
/// since they cross the process boundary as JSON already.
pub trait SqlBridge: Send + Sync {
    fn query(&self, sql: &str) -> Result<Vec<JsonValue>, String>;
}

/// A bridge with no registered tables, used by callers that only need
/// to execute code with no `sql()` capability (e.g. a unit test).
pub struct NoSqlBridge;

impl SqlBridge for NoSqlBridge {
    fn query(&self, _sql: &str) -> Result<Vec<JsonValue>, String> {
        Err("no SQL engine is attached to this sandbox".to_string())
    }
}
