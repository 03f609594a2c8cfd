//! Shared helper for building a raw, column-major [`Table`] of textual
//! cells from a header list plus row-major string records. Every
//! connector funnels into this before handing the result to
//! `Dataset::profile`, so type inference/stats/key-detection stay
//! identical regardless of source format.

use nlq_protocol::Value;
use nlq_schema::{Column, Table};

pub fn table_from_rows(headers: &[String], rows: &[Vec<Option<String>>]) -> Table {
    let columns = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let values: Vec<Value> = rows
                .iter()
                .map(|row| match row.get(i) {
                    Some(Some(s)) if !s.is_empty() => Value::Text(s.clone()),
                    _ => Value::Null,
                })
                .collect();
            Column::new(name.clone(), values)
        })
        .collect();
    Table::new(columns)
}

pub fn sanitize_column_name(raw: &str, index: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("column_{}", index + 1)
    } else {
        trimmed.to_string()
    }
}
