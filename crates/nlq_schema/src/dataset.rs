//! Dataset & Schema (C2): a named in-memory relation plus the metadata
//! profiled from it at load time (spec.md §3).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::inference::{
    infer_semantic_type, is_foreign_key_candidate, is_primary_key_candidate, parse_value,
    strip_fk_suffix,
};
use crate::relationships::{detect_relationship, Relationship, TargetCandidate};
use crate::stats::{compute_stats, ColumnStats};
use crate::table::{Column, Table};
use crate::types::SemanticType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub semantic_type: SemanticType,
    pub nullable: bool,
    pub sample: Vec<String>,
    pub stats: ColumnStats,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub description: String,
    pub table: Table,
    pub columns: Vec<ColumnMetadata>,
    pub primary_key: Option<String>,
    pub potential_foreign_keys: Vec<String>,
    pub relationships: Vec<Relationship>,
}

const SAMPLE_SIZE: usize = 5;

impl Dataset {
    /// Profile a freshly-loaded [`Table`] of raw textual cells
    /// (`Value::Text`/`Value::Null` only) into a fully typed Dataset:
    /// infers each column's semantic type, coerces its values, computes
    /// statistics, and flags primary/foreign-key candidates
    /// (spec.md §4.2). Relationship detection across Datasets happens
    /// separately via [`detect_all_relationships`], once every Dataset
    /// in the session/registry has been profiled.
    pub fn profile(name: impl Into<String>, description: impl Into<String>, mut raw: Table) -> Self {
        let name = name.into();
        let mut columns = Vec::with_capacity(raw.columns.len());
        let mut primary_key = None;
        let mut potential_foreign_keys = Vec::new();

        for col in &mut raw.columns {
            let raw_strings: Vec<Option<String>> = col
                .values
                .iter()
                .map(|v| if v.is_null() { None } else { Some(v.display()) })
                .collect();
            let semantic_type = infer_semantic_type(&col.name, &raw_strings);
            let typed_values: Vec<nlq_protocol::Value> = raw_strings
                .iter()
                .map(|s| parse_value(s.as_deref(), semantic_type))
                .collect();
            col.values = typed_values;

            let nullable = col.values.iter().any(|v| v.is_null());
            let stats = compute_stats(&col.values, semantic_type);
            let sample: Vec<String> = col
                .values
                .iter()
                .filter(|v| !v.is_null())
                .take(SAMPLE_SIZE)
                .map(|v| v.display())
                .collect();

            if primary_key.is_none() && is_primary_key_candidate(&col.name, &col.values) {
                primary_key = Some(col.name.clone());
            }
            if is_foreign_key_candidate(&col.name, semantic_type) {
                potential_foreign_keys.push(col.name.clone());
            }

            columns.push(ColumnMetadata {
                name: col.name.clone(),
                semantic_type,
                nullable,
                sample,
                stats,
            });
        }

        info!(
            dataset = %name,
            rows = raw.row_count(),
            cols = raw.column_count(),
            primary_key = ?primary_key,
            "profiled dataset"
        );

        Self {
            name,
            description: description.into(),
            table: raw,
            columns,
            primary_key,
            potential_foreign_keys,
            relationships: Vec::new(),
        }
    }

    pub fn column_metadata(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }
}

/// Detect relationships across every Dataset in a session/registry
/// (spec.md §4.2). Mutates each Dataset's `relationships` in place.
/// O(datasets^2 * fk candidates); fine for the handful of Datasets one
/// session holds at a time (spec.md §3: one Dataset per Session, but
/// kept general for the directory connector's multi-table loads).
pub fn detect_all_relationships(datasets: &mut [Dataset]) {
    let targets_snapshot: Vec<(String, Option<String>, Vec<nlq_protocol::Value>)> = datasets
        .iter()
        .map(|d| {
            let pk_values = d
                .primary_key
                .as_ref()
                .and_then(|pk| d.table.column(pk))
                .map(|c| c.values.clone())
                .unwrap_or_default();
            (d.name.clone(), d.primary_key.clone(), pk_values)
        })
        .collect();

    for i in 0..datasets.len() {
        let fk_columns = datasets[i].potential_foreign_keys.clone();
        let mut found = Vec::new();
        for fk_col in &fk_columns {
            let base_name = strip_fk_suffix(fk_col);
            let source_values = match datasets[i].table.column(fk_col) {
                Some(c) => c.values.clone(),
                None => continue,
            };
            let targets: Vec<TargetCandidate<'_>> = targets_snapshot
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .filter_map(|(_, (name, pk, pk_values))| {
                    pk.as_ref().map(|pk_col| TargetCandidate {
                        name: name.as_str(),
                        primary_key_column: pk_col.as_str(),
                        primary_key_values: pk_values.as_slice(),
                    })
                })
                .collect();
            if let Some(rel) = detect_relationship(fk_col, &source_values, &base_name, &targets) {
                found.push(rel);
            }
        }
        datasets[i].relationships = found;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;

    fn raw_table() -> Table {
        Table::new(vec![
            Column::new(
                "order_id",
                vec![
                    Value::Text("1".into()),
                    Value::Text("2".into()),
                    Value::Text("3".into()),
                ],
            ),
            Column::new(
                "customer_id",
                vec![
                    Value::Text("10".into()),
                    Value::Text("11".into()),
                    Value::Text("10".into()),
                ],
            ),
            Column::new(
                "valor",
                vec![
                    Value::Text("9.5".into()),
                    Value::Text("2.0".into()),
                    Value::Text("3.25".into()),
                ],
            ),
        ])
    }

    #[test]
    fn profile_infers_types_and_primary_key() {
        let ds = Dataset::profile("orders", "", raw_table());
        assert_eq!(ds.primary_key.as_deref(), Some("order_id"));
        assert!(ds.potential_foreign_keys.contains(&"customer_id".to_string()));
        let valor_meta = ds.column_metadata("valor").unwrap();
        assert_eq!(valor_meta.semantic_type, SemanticType::Float);
    }

    #[test]
    fn detect_all_relationships_links_fk_to_named_target() {
        let orders = Dataset::profile("orders", "", raw_table());
        let customers_table = Table::new(vec![Column::new(
            "id",
            vec![Value::Text("10".into()), Value::Text("11".into())],
        )]);
        let customers = Dataset::profile("customers", "", customers_table);

        let mut datasets = vec![orders, customers];
        detect_all_relationships(&mut datasets);

        let orders_rels = &datasets[0].relationships;
        assert!(orders_rels
            .iter()
            .any(|r| r.source_column == "customer_id" && r.target_dataset == "customers"));
    }
}
