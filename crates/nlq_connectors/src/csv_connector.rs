//! CSV/TSV connector, grounded on the `csv` crate usage in the
//! teacher's file preview command.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use nlq_schema::Dataset;
use tracing::info;

use crate::error::ConnectorError;
use crate::raw::{sanitize_column_name, table_from_rows};
use crate::Connector;

pub struct DelimitedConnector {
    path: PathBuf,
    delimiter: u8,
    connected: bool,
}

impl DelimitedConnector {
    pub fn csv(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
            connected: false,
        }
    }

    pub fn tsv(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b'\t',
            connected: false,
        }
    }

    fn dataset_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "dataset".to_string())
    }
}

impl Connector for DelimitedConnector {
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
        let dataset = load_delimited(&self.path, self.delimiter)?;
        info!(path = %self.path.display(), rows = dataset.row_count(), "loaded delimited source");
        Ok(vec![dataset])
    }

    fn close(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

pub(crate) fn load_delimited(path: &Path, delimiter: u8) -> Result<Dataset, ConnectorError> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|source| ConnectorError::Io {
        path: path_str.clone(),
        source,
    })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| ConnectorError::Csv {
            path: path_str.clone(),
            source,
        })?
        .iter()
        .enumerate()
        .map(|(i, h)| sanitize_column_name(h, i))
        .collect();

    if headers.is_empty() {
        return Err(ConnectorError::EmptySource(path_str));
    }

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| ConnectorError::Csv {
            path: path_str.clone(),
            source,
        })?;
        let row: Vec<Option<String>> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    None
                } else {
                    Some(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

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
    fn loads_csv_with_header_and_infers_types() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "id,name,active").unwrap();
        writeln!(file, "1,Alice,true").unwrap();
        writeln!(file, "2,Bob,false").unwrap();
        file.flush().unwrap();

        let mut conn = DelimitedConnector::csv(file.path());
        conn.connect().unwrap();
        let datasets = conn.load().unwrap();
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].row_count(), 2);
        assert_eq!(
            datasets[0].column_metadata("active").unwrap().semantic_type,
            nlq_schema::SemanticType::Boolean
        );
    }

    #[test]
    fn rejects_missing_file() {
        let mut conn = DelimitedConnector::csv("/nonexistent/path.csv");
        assert!(conn.connect().is_err());
    }
}
