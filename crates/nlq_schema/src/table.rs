//! The in-memory relation: a named, row-aligned column set. Connectors
//! (`nlq_connectors`) build one of these per loaded source; the Dataset
//! profiler (`dataset.rs`) never mutates it, only reads it (spec.md §3,
//! invariant: Datasets are mutated only by the connector pipeline).

use nlq_protocol::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_null()).count()
    }

    pub fn distinct_non_null(&self) -> Vec<&Value> {
        let mut seen: Vec<&Value> = Vec::new();
        for v in &self.values {
            if !v.is_null() && !seen.contains(&v) {
                seen.push(v);
            }
        }
        seen
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Keep only the rows where `keep[row]` is true, applied to every
    /// column in lock-step (used by the `DROP_NA` transformation rule).
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for col in &mut self.columns {
            let mut idx = 0usize;
            col.values.retain(|_| {
                let keep_this = keep.get(idx).copied().unwrap_or(true);
                idx += 1;
                keep_this
            });
        }
    }

    /// Render the first `limit` rows as JSON objects, in column order.
    pub fn rows_as_json(&self, limit: Option<usize>) -> Vec<serde_json::Value> {
        let n = limit.unwrap_or_else(|| self.row_count()).min(self.row_count());
        (0..n)
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for col in &self.columns {
                    obj.insert(col.name.clone(), col.values[row].to_json());
                }
                serde_json::Value::Object(obj)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_count_comes_from_first_column() {
        let t = Table::new(vec![Column::new(
            "a",
            vec![Value::Integer(1), Value::Integer(2)],
        )]);
        assert_eq!(t.row_count(), 2);
    }

    #[test]
    fn distinct_non_null_drops_duplicates_and_nulls() {
        let c = Column::new(
            "a",
            vec![
                Value::Integer(1),
                Value::Null,
                Value::Integer(1),
                Value::Integer(2),
            ],
        );
        assert_eq!(c.distinct_non_null().len(), 2);
    }
}
