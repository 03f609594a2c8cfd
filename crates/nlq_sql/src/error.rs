use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlError {
    #[error("table '{name}' not found; available tables: {}", available.join(", "))]
    TableNotFound { name: String, available: Vec<String> },

    #[error("column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    #[error("query rejected: {0}")]
    GuardRejected(String),

    #[error("SQL syntax error: {0}")]
    Syntax(String),

    #[error("DuckDB error: {0}")]
    Duckdb(#[from] duckdb::Error),
}
