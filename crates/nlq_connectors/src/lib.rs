//! Connector Layer (C3): loads tabular sources into profiled
//! [`nlq_schema::Dataset`]s. Every format connector funnels into the
//! shared raw-text table builder (`raw.rs`) before calling
//! `Dataset::profile`, so type inference behaves identically
//! regardless of source.

pub mod csv_connector;
pub mod directory;
pub mod error;
pub mod excel_connector;
pub mod json_connector;
pub mod parquet_connector;
mod raw;

pub use csv_connector::DelimitedConnector;
pub use directory::DirectoryConnector;
pub use error::ConnectorError;
pub use excel_connector::ExcelConnector;
pub use json_connector::JsonConnector;
pub use parquet_connector::ParquetConnector;

use nlq_schema::Dataset;

/// A data source that can be connected to, loaded from, and closed
/// (spec.md §4.3). One connector may produce more than one Dataset
/// (the directory connector loads one per recognized file).
pub trait Connector {
    fn connect(&mut self) -> Result<(), ConnectorError>;
    fn load(&self) -> Result<Vec<Dataset>, ConnectorError>;
    fn close(&mut self);
    fn is_connected(&self) -> bool;
}

/// Pick a connector for a single file path based on its extension.
pub fn connector_for_path(path: impl Into<std::path::PathBuf>) -> Result<Box<dyn Connector>, ConnectorError> {
    let path = path.into();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("csv") => Ok(Box::new(DelimitedConnector::csv(path))),
        Some("tsv") | Some("tab") => Ok(Box::new(DelimitedConnector::tsv(path))),
        Some("json") => Ok(Box::new(JsonConnector::json(path))),
        Some("ndjson") | Some("jsonl") => Ok(Box::new(JsonConnector::ndjson(path))),
        Some("parquet") | Some("pq") => Ok(Box::new(ParquetConnector::new(path))),
        Some("xlsx") | Some("xls") | Some("ods") => Ok(Box::new(ExcelConnector::new(path))),
        other => Err(ConnectorError::UnsupportedFileType(
            other.unwrap_or("").to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_for_path_dispatches_by_extension() {
        assert!(connector_for_path("data.csv").is_ok());
        assert!(connector_for_path("data.parquet").is_ok());
        assert!(connector_for_path("data.exe").is_err());
    }
}
