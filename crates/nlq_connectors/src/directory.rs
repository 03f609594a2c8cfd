//! Directory connector: profiles every recognized file in a directory
//! as its own Dataset, then runs cross-dataset relationship detection
//! once every file has been loaded (spec.md §4.2/§4.3).

use std::path::{Path, PathBuf};

use nlq_schema::{detect_all_relationships, Column, Dataset, Table};
use tracing::{info, warn};

use crate::csv_connector::load_delimited;
use crate::error::ConnectorError;
use crate::Connector;

pub struct DirectoryConnector {
    path: PathBuf,
    connected: bool,
}

impl DirectoryConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            connected: false,
        }
    }
}

impl Connector for DirectoryConnector {
    fn connect(&mut self) -> Result<(), ConnectorError> {
        if !self.path.is_dir() {
            return Err(ConnectorError::Io {
                path: self.path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }
        self.connected = true;
        Ok(())
    }

    fn load(&self) -> Result<Vec<Dataset>, ConnectorError> {
        if !self.connected {
            return Err(ConnectorError::NotConnected);
        }
        let mut datasets = load_directory(&self.path)?;
        detect_all_relationships(&mut datasets);
        info!(path = %self.path.display(), datasets = datasets.len(), "loaded directory source");
        Ok(datasets)
    }

    fn close(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

fn load_directory(path: &Path) -> Result<Vec<Dataset>, ConnectorError> {
    let entries = std::fs::read_dir(path).map_err(|source| ConnectorError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut datasets = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConnectorError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let dataset = match ext.as_deref() {
            Some("csv") => load_delimited(&file_path, b',').ok(),
            Some("tsv") | Some("tab") => load_delimited(&file_path, b'\t').ok(),
            Some("json") => crate::json_connector::JsonConnector::json(file_path.clone())
                .load_single()
                .ok(),
            Some("ndjson") | Some("jsonl") => {
                crate::json_connector::JsonConnector::ndjson(file_path.clone())
                    .load_single()
                    .ok()
            }
            Some("parquet") | Some("pq") => {
                crate::parquet_connector::ParquetConnector::new(file_path.clone())
                    .load_single()
                    .ok()
            }
            Some("xlsx") | Some("xls") | Some("ods") => {
                crate::excel_connector::ExcelConnector::new(file_path.clone())
                    .load_single()
                    .ok()
            }
            _ => {
                warn!(file = %file_path.display(), "skipping unrecognized file in directory source");
                None
            }
        };

        if let Some(dataset) = dataset {
            datasets.push(dataset);
        } else if ext.is_some() {
            warn!(file = %file_path.display(), "failed to load file in directory source, skipping");
        }
    }

    if datasets.is_empty() {
        return Err(ConnectorError::EmptySource(path.display().to_string()));
    }

    datasets.extend(combined_views(&datasets, &source_id(path)));
    Ok(datasets)
}

/// The directory's own identifier, used to name its `UNION ALL`
/// combined view(s) (spec.md §4.3) — the same `file_stem`-style
/// convention the single-file connectors use to name their one Dataset.
fn source_id(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "directory".to_string())
}

/// A column-name/semantic-type signature used to group per-file
/// Datasets that can be stacked into one `UNION ALL` view.
fn schema_signature(dataset: &Dataset) -> Vec<(String, nlq_schema::SemanticType)> {
    dataset
        .columns
        .iter()
        .map(|c| (c.name.clone(), c.semantic_type))
        .collect()
}

/// Build one combined Dataset per group of two-or-more schema-compatible
/// per-file Datasets, each a row-wise `UNION ALL` stack named after the
/// directory's source id (spec.md §4.3). Files loaded alone under their
/// own schema produce no combined view — there is nothing to union.
fn combined_views(datasets: &[Dataset], source_id: &str) -> Vec<Dataset> {
    let mut groups: Vec<(Vec<(String, nlq_schema::SemanticType)>, Vec<usize>)> = Vec::new();
    for (idx, dataset) in datasets.iter().enumerate() {
        let signature = schema_signature(dataset);
        match groups.iter_mut().find(|(sig, _)| *sig == signature) {
            Some((_, members)) => members.push(idx),
            None => groups.push((signature, vec![idx])),
        }
    }

    let compatible_groups: Vec<&Vec<usize>> = groups
        .iter()
        .map(|(_, members)| members)
        .filter(|members| members.len() > 1)
        .collect();

    compatible_groups
        .into_iter()
        .enumerate()
        .map(|(group_idx, members)| {
            let name = if compatible_groups_len(&groups) == 1 {
                source_id.to_string()
            } else {
                format!("{}_{}", source_id, group_idx + 1)
            };
            let first = &datasets[members[0]].table;
            let columns = first
                .columns
                .iter()
                .enumerate()
                .map(|(col_idx, col)| {
                    let mut values = Vec::new();
                    for &member in members {
                        values.extend(datasets[member].table.columns[col_idx].values.clone());
                    }
                    Column::new(col.name.clone(), values)
                })
                .collect();
            Dataset::profile(name, "", Table::new(columns))
        })
        .collect()
}

fn compatible_groups_len(groups: &[(Vec<(String, nlq_schema::SemanticType)>, Vec<usize>)]) -> usize {
    groups.iter().filter(|(_, members)| members.len() > 1).count()
}

/// Convenience for connectors that only ever produce a single Dataset,
/// used by the directory connector to load one file at a time without
/// going through the full `connect`/`load` lifecycle.
trait LoadSingle {
    fn load_single(self) -> Result<Dataset, ConnectorError>;
}

impl LoadSingle for crate::json_connector::JsonConnector {
    fn load_single(mut self) -> Result<Dataset, ConnectorError> {
        self.connect()?;
        self.load()?.into_iter().next().ok_or(ConnectorError::EmptySource(String::new()))
    }
}

impl LoadSingle for crate::parquet_connector::ParquetConnector {
    fn load_single(mut self) -> Result<Dataset, ConnectorError> {
        self.connect()?;
        self.load()?.into_iter().next().ok_or(ConnectorError::EmptySource(String::new()))
    }
}

impl LoadSingle for crate::excel_connector::ExcelConnector {
    fn load_single(mut self) -> Result<Dataset, ConnectorError> {
        self.connect()?;
        self.load()?.into_iter().next().ok_or(ConnectorError::EmptySource(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn loads_every_recognized_file_and_links_relationships() {
        let dir = tempdir().unwrap();
        let mut orders = std::fs::File::create(dir.path().join("orders.csv")).unwrap();
        writeln!(orders, "id,customer_id").unwrap();
        writeln!(orders, "1,10").unwrap();
        writeln!(orders, "2,11").unwrap();
        let mut customers = std::fs::File::create(dir.path().join("customers.csv")).unwrap();
        writeln!(customers, "id").unwrap();
        writeln!(customers, "10").unwrap();
        writeln!(customers, "11").unwrap();

        let mut conn = DirectoryConnector::new(dir.path());
        conn.connect().unwrap();
        let datasets = conn.load().unwrap();
        assert_eq!(datasets.len(), 2);

        let orders_ds = datasets.iter().find(|d| d.name == "orders").unwrap();
        assert!(orders_ds
            .relationships
            .iter()
            .any(|r| r.target_dataset == "customers"));
    }

    #[test]
    fn schema_compatible_files_also_produce_a_combined_view() {
        let dir = tempdir().unwrap();
        let mut jan = std::fs::File::create(dir.path().join("jan.csv")).unwrap();
        writeln!(jan, "id,amount").unwrap();
        writeln!(jan, "1,9.5").unwrap();
        let mut feb = std::fs::File::create(dir.path().join("feb.csv")).unwrap();
        writeln!(feb, "id,amount").unwrap();
        writeln!(feb, "2,3.25").unwrap();
        writeln!(feb, "3,1.0").unwrap();

        let mut conn = DirectoryConnector::new(dir.path());
        conn.connect().unwrap();
        let datasets = conn.load().unwrap();

        // Two per-file tables plus one combined view named after the directory.
        assert_eq!(datasets.len(), 3);
        let source_name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        let combined = datasets.iter().find(|d| d.name == source_name).unwrap();
        assert_eq!(combined.row_count(), 3);
    }
}
