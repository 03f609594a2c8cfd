//! JSON / NDJSON connector, grounded on the teacher's parser-lab
//! `SampleReader::analyze_json`/`analyze_ndjson` key-union approach.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use nlq_schema::Dataset;
use tracing::info;

use crate::error::ConnectorError;
use crate::raw::table_from_rows;
use crate::Connector;

pub struct JsonConnector {
    path: PathBuf,
    ndjson: bool,
    connected: bool,
}

impl JsonConnector {
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ndjson: false,
            connected: false,
        }
    }

    pub fn ndjson(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ndjson: true,
            connected: false,
        }
    }
}

impl Connector for JsonConnector {
    fn connect(&mut self) -> Result<(), ConnectorError> {
        if !self.path.exists() {
            return Err(ConnectorError::Io {
                path: self.path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }
        self.connected = true;
        Ok(())
    }

    fn load(&self) -> Result<Vec<Dataset>, ConnectorError> {
        if !self.connected {
            return Err(ConnectorError::NotConnected);
        }
        let records = if self.ndjson {
            read_ndjson(&self.path)?
        } else {
            read_json(&self.path)?
        };
        let dataset = records_to_dataset(&self.path, records)?;
        info!(path = %self.path.display(), rows = dataset.row_count(), "loaded json source");
        Ok(vec![dataset])
    }

    fn close(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

fn read_json(path: &Path) -> Result<Vec<serde_json::Value>, ConnectorError> {
    let path_str = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ConnectorError::Io {
        path: path_str.clone(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| ConnectorError::Json {
            path: path_str.clone(),
            source,
        })?;
    match value {
        serde_json::Value::Array(arr) => Ok(arr),
        serde_json::Value::Object(obj) => Ok(vec![serde_json::Value::Object(obj)]),
        _ => Err(ConnectorError::InvalidJsonShape { path: path_str }),
    }
}

fn read_ndjson(path: &Path) -> Result<Vec<serde_json::Value>, ConnectorError> {
    let path_str = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ConnectorError::Io {
        path: path_str.clone(),
        source,
    })?;
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|source| ConnectorError::Json {
                path: path_str.clone(),
                source,
            })
        })
        .collect()
}

fn records_to_dataset(
    path: &Path,
    records: Vec<serde_json::Value>,
) -> Result<Dataset, ConnectorError> {
    let path_str = path.display().to_string();
    if records.is_empty() {
        return Err(ConnectorError::EmptySource(path_str));
    }

    let mut keys: BTreeSet<String> = BTreeSet::new();
    for record in &records {
        if let serde_json::Value::Object(obj) = record {
            keys.extend(obj.keys().cloned());
        }
    }
    let headers: Vec<String> = keys.into_iter().collect();

    let rows: Vec<Vec<Option<String>>> = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|key| match record.get(key) {
                    None | Some(serde_json::Value::Null) => None,
                    Some(serde_json::Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                })
                .collect()
        })
        .collect();

    let table = table_from_rows(&headers, &rows);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());
    Ok(Dataset::profile(name, "", table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_json_array_with_union_of_keys() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"[{{"id": 1, "name": "Alice"}}, {{"id": 2}}]"#).unwrap();
        file.flush().unwrap();

        let mut conn = JsonConnector::json(file.path());
        conn.connect().unwrap();
        let datasets = conn.load().unwrap();
        assert_eq!(datasets[0].row_count(), 2);
        assert!(datasets[0].column_metadata("name").unwrap().nullable);
    }

    #[test]
    fn loads_ndjson_lines() {
        let mut file = NamedTempFile::with_suffix(".ndjson").unwrap();
        writeln!(file, r#"{{"x": 1}}"#).unwrap();
        writeln!(file, r#"{{"x": 2}}"#).unwrap();
        file.flush().unwrap();

        let mut conn = JsonConnector::ndjson(file.path());
        conn.connect().unwrap();
        let datasets = conn.load().unwrap();
        assert_eq!(datasets[0].row_count(), 2);
    }
}
