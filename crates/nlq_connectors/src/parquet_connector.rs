//! Parquet connector. Arrow arrays are converted to their textual
//! representation and fed through the same raw-text profiling path as
//! every other connector (spec.md §4.3's Dataset/Schema pass doesn't
//! distinguish by source format), grounded on `arrow_to_duckdb_type`'s
//! by-DataType dispatch in the teacher's DuckDB sink.

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::Array;
use arrow::datatypes::DataType;
use nlq_schema::Dataset;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::info;

use crate::error::ConnectorError;
use crate::raw::table_from_rows;
use crate::Connector;

pub struct ParquetConnector {
    path: PathBuf,
    connected: bool,
}

impl ParquetConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            connected: false,
        }
    }
}

impl Connector for ParquetConnector {
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
        let dataset = load_parquet(&self.path)?;
        info!(path = %self.path.display(), rows = dataset.row_count(), "loaded parquet source");
        Ok(vec![dataset])
    }

    fn close(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

fn load_parquet(path: &Path) -> Result<Dataset, ConnectorError> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|source| ConnectorError::Io {
        path: path_str.clone(),
        source,
    })?;

    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| ConnectorError::Parquet {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
    let schema = builder.schema().clone();
    let reader = builder.build().map_err(|e| ConnectorError::Parquet {
        path: path_str.clone(),
        message: e.to_string(),
    })?;

    let headers: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| ConnectorError::Parquet {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        for row_idx in 0..batch.num_rows() {
            let row: Vec<Option<String>> = (0..batch.num_columns())
                .map(|col_idx| array_value_to_string(batch.column(col_idx).as_ref(), row_idx))
                .collect();
            rows.push(row);
        }
    }

    if headers.is_empty() {
        return Err(ConnectorError::EmptySource(path_str));
    }

    let table = table_from_rows(&headers, &rows);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());
    Ok(Dataset::profile(name, "", table))
}

fn array_value_to_string(array: &dyn Array, index: usize) -> Option<String> {
    use arrow::array::*;

    if array.is_null(index) {
        return None;
    }
    let rendered = match array.data_type() {
        DataType::Boolean => array
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| a.value(index).to_string()),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => array
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(index).to_string())
            .or_else(|| {
                array
                    .as_any()
                    .downcast_ref::<Int32Array>()
                    .map(|a| a.value(index).to_string())
            }),
        DataType::Float32 | DataType::Float64 => array
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(index).to_string())
            .or_else(|| {
                array
                    .as_any()
                    .downcast_ref::<Float32Array>()
                    .map(|a| a.value(index).to_string())
            }),
        DataType::Utf8 => array
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(index).to_string()),
        DataType::LargeUtf8 => array
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(index).to_string()),
        DataType::Date32 => array
            .as_any()
            .downcast_ref::<Date32Array>()
            .and_then(|a| a.value_as_date(index))
            .map(|d| d.format("%Y-%m-%d").to_string()),
        DataType::Timestamp(_, _) => array
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .and_then(|a| a.value_as_datetime(index))
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        _ => Some(format!("{:?}", array.slice(index, 1))),
    };
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_file() {
        let mut conn = ParquetConnector::new("/nonexistent/path.parquet");
        assert!(conn.connect().is_err());
    }
}
