//! Embedded DuckDB query engine (spec.md §4.4), grounded on
//! `casparian_db::backend::DbConnection`'s prepare/query-all loop and
//! the `casparian_sinks_duckdb` appender-based load path.

use std::collections::HashSet;

use nlq_protocol::Value;
use nlq_schema::{Dataset, SemanticType, Table};
use tracing::{debug, info};

use crate::dialect::{register_compatibility_macros, rewrite_dialect};
use crate::error::SqlError;
use crate::guard;

pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// A single-connection, in-memory DuckDB engine. Each session gets its
/// own engine and loads exactly the Dataset(s) that session's Analysis
/// Core run operates on (spec.md §3: Datasets are session-scoped).
pub struct SqlEngine {
    conn: duckdb::Connection,
    tables: HashSet<String>,
}

impl SqlEngine {
    pub fn in_memory() -> Result<Self, SqlError> {
        let conn = duckdb::Connection::open_in_memory()?;
        register_compatibility_macros(&conn)?;
        Ok(Self {
            conn,
            tables: HashSet::new(),
        })
    }

    /// Register a Dataset as a DuckDB table, bulk-loading its rows via
    /// an appender (the fast path `casparian_sinks_duckdb` uses for
    /// large batches).
    pub fn register_dataset(&mut self, dataset: &Dataset) -> Result<(), SqlError> {
        self.register_table(&dataset.name, &dataset.table)
    }

    pub fn register_table(&mut self, name: &str, table: &Table) -> Result<(), SqlError> {
        let quoted = quote_ident(name);
        let columns_sql: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), duckdb_column_type(c)))
            .collect();

        self.conn
            .execute(&format!("DROP TABLE IF EXISTS {}", quoted), [])?;
        self.conn.execute(
            &format!("CREATE TABLE {} ({})", quoted, columns_sql.join(", ")),
            [],
        )?;

        if table.row_count() > 0 {
            let mut appender = self.conn.appender(name)?;
            for row_idx in 0..table.row_count() {
                let row: Vec<duckdb::types::Value> = table
                    .columns
                    .iter()
                    .map(|c| value_to_duckdb(&c.values[row_idx]))
                    .collect();
                let refs: Vec<&dyn duckdb::ToSql> =
                    row.iter().map(|v| v as &dyn duckdb::ToSql).collect();
                appender.append_row(refs.as_slice())?;
            }
            appender.flush()?;
        }

        self.tables.insert(name.to_string());
        info!(table = name, rows = table.row_count(), "registered table in SQL engine");
        Ok(())
    }

    pub fn known_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().cloned().collect();
        names.sort();
        names
    }

    /// Validate, dialect-rewrite, row-cap, and run a read-only query
    /// against the registered tables (spec.md §4.4, invariant I2).
    pub fn query(&self, sql: &str, row_cap: usize) -> Result<QueryResult, SqlError> {
        guard::validate_read_only(sql)?;
        self.check_referenced_tables(sql)?;

        let rewritten = rewrite_dialect(sql);
        let limited = guard::apply_row_limit(&rewritten, row_cap);
        debug!(sql = %limited, "executing query");

        let mut stmt = self.conn.prepare(&limited)?;
        let column_count = stmt.column_count();
        let columns: Vec<String> = (0..column_count)
            .map(|i| stmt.column_name(i).map(|s| s.to_string()).unwrap_or_else(|_| format!("col{}", i)))
            .collect();

        let mut rows_iter = stmt.query([])?;
        let mut rows = Vec::new();
        while let Some(row) = rows_iter.next()? {
            let values: Vec<Value> = (0..column_count)
                .map(|i| duckdb_value_to_value(row, i))
                .collect::<Result<_, _>>()?;
            rows.push(values);
        }

        Ok(QueryResult { columns, rows })
    }

    /// Spec.md §7: a query naming a table the engine never registered
    /// should classify as `TableNotFound`, not surface as a raw DuckDB
    /// "catalog error".
    fn check_referenced_tables(&self, sql: &str) -> Result<(), SqlError> {
        let upper = sql.to_uppercase();
        for known in &self.tables {
            if upper.contains(&known.to_uppercase()) {
                return Ok(());
            }
        }
        // No known table name appears verbatim in the query; likely a
        // typo or reference to an un-registered table. Only reject if
        // we have at least one registered table to compare against —
        // an empty engine has nothing useful to say here.
        if self.tables.is_empty() {
            return Ok(());
        }
        let referenced = extract_from_identifier(&upper);
        match referenced {
            Some(name) if !self.tables.iter().any(|t| t.eq_ignore_ascii_case(&name)) => {
                Err(SqlError::TableNotFound {
                    name,
                    available: self.known_tables(),
                })
            }
            _ => Ok(()),
        }
    }
}

fn extract_from_identifier(upper_sql: &str) -> Option<String> {
    let idx = upper_sql.find(" FROM ")?;
    let rest = &upper_sql[idx + 6..];
    let ident: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    (!ident.is_empty()).then_some(ident)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn duckdb_column_type(column: &nlq_schema::Column) -> &'static str {
    let semantic_type = column
        .values
        .iter()
        .find(|v| !v.is_null())
        .map(|_| inferred_type_hint(column))
        .unwrap_or(SemanticType::String);
    match semantic_type {
        SemanticType::Integer | SemanticType::Id => "BIGINT",
        SemanticType::Float => "DOUBLE",
        SemanticType::Boolean => "BOOLEAN",
        SemanticType::Date => "DATE",
        SemanticType::DateTime => "TIMESTAMP",
        SemanticType::String | SemanticType::Categorical => "VARCHAR",
    }
}

fn inferred_type_hint(column: &nlq_schema::Column) -> SemanticType {
    match column.values.iter().find(|v| !v.is_null()) {
        Some(Value::Integer(_)) => SemanticType::Integer,
        Some(Value::Real(_)) => SemanticType::Float,
        Some(Value::Boolean(_)) => SemanticType::Boolean,
        Some(Value::Date(_)) => SemanticType::Date,
        Some(Value::DateTime(_)) => SemanticType::DateTime,
        _ => SemanticType::String,
    }
}

fn value_to_duckdb(value: &Value) -> duckdb::types::Value {
    match value {
        Value::Null => duckdb::types::Value::Null,
        Value::Integer(i) => duckdb::types::Value::BigInt(*i),
        Value::Real(f) => duckdb::types::Value::Double(*f),
        Value::Text(s) => duckdb::types::Value::Text(s.clone()),
        Value::Boolean(b) => duckdb::types::Value::Boolean(*b),
        Value::Date(d) => duckdb::types::Value::Text(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => duckdb::types::Value::Timestamp(
            duckdb::types::TimeUnit::Microsecond,
            dt.timestamp_micros(),
        ),
    }
}

fn duckdb_value_to_value(row: &duckdb::Row, index: usize) -> Result<Value, duckdb::Error> {
    use duckdb::types::ValueRef;

    Ok(match row.get_ref(index)? {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(v) => Value::Boolean(v),
        ValueRef::TinyInt(v) => Value::Integer(v as i64),
        ValueRef::SmallInt(v) => Value::Integer(v as i64),
        ValueRef::Int(v) => Value::Integer(v as i64),
        ValueRef::BigInt(v) => Value::Integer(v),
        ValueRef::HugeInt(v) => Value::Integer(v as i64),
        ValueRef::UTinyInt(v) => Value::Integer(v as i64),
        ValueRef::USmallInt(v) => Value::Integer(v as i64),
        ValueRef::UInt(v) => Value::Integer(v as i64),
        ValueRef::UBigInt(v) => Value::Integer(v as i64),
        ValueRef::Float(v) => Value::Real(v as f64),
        ValueRef::Double(v) => Value::Real(v),
        ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).to_string()),
        ValueRef::Timestamp(unit, v) => {
            let micros = match unit {
                duckdb::types::TimeUnit::Second => v * 1_000_000,
                duckdb::types::TimeUnit::Millisecond => v * 1_000,
                duckdb::types::TimeUnit::Microsecond => v,
                duckdb::types::TimeUnit::Nanosecond => v / 1_000,
            };
            let secs = micros.div_euclid(1_000_000);
            let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
            chrono::DateTime::from_timestamp(secs, nanos)
                .map(Value::DateTime)
                .unwrap_or(Value::Null)
        }
        ValueRef::Date32(days) => chrono::NaiveDate::from_num_days_from_ce_opt(719_163 + days)
            .map(Value::Date)
            .unwrap_or(Value::Null),
        other => Value::Text(format!("{:?}", other)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_schema::Column;

    fn orders_table() -> Table {
        Table::new(vec![
            Column::new("id", vec![Value::Integer(1), Value::Integer(2)]),
            Column::new(
                "amount",
                vec![Value::Real(9.5), Value::Real(3.25)],
            ),
        ])
    }

    #[test]
    fn registers_table_and_queries_rows() {
        let mut engine = SqlEngine::in_memory().unwrap();
        engine.register_table("orders", &orders_table()).unwrap();

        let result = engine.query("SELECT * FROM orders ORDER BY id", 100).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.columns, vec!["id", "amount"]);
    }

    #[test]
    fn rejects_mutating_query() {
        let mut engine = SqlEngine::in_memory().unwrap();
        engine.register_table("orders", &orders_table()).unwrap();
        let err = engine.query("DELETE FROM orders", 100).unwrap_err();
        assert!(matches!(err, SqlError::GuardRejected(_)));
    }

    #[test]
    fn unknown_table_is_classified() {
        let mut engine = SqlEngine::in_memory().unwrap();
        engine.register_table("orders", &orders_table()).unwrap();
        let err = engine.query("SELECT * FROM widgets", 100).unwrap_err();
        assert!(matches!(err, SqlError::TableNotFound { .. }));
    }

    #[test]
    fn row_cap_limits_result_size() {
        let mut engine = SqlEngine::in_memory().unwrap();
        let big = Table::new(vec![Column::new(
            "n",
            (0..50).map(Value::Integer).collect(),
        )]);
        engine.register_table("nums", &big).unwrap();
        let result = engine.query("SELECT * FROM nums", 10).unwrap();
        assert_eq!(result.rows.len(), 10);
    }
}
