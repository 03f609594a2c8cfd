//! Excel/ODS connector via `calamine`, the workbook-reading crate the
//! wider example pack reaches for (this spec's retrieval pack has no
//! teacher usage of it; `calamine` is the ecosystem standard, so it is
//! imported directly rather than hand-rolled).

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use nlq_schema::Dataset;
use tracing::info;

use crate::error::ConnectorError;
use crate::raw::{sanitize_column_name, table_from_rows};
use crate::Connector;

pub struct ExcelConnector {
    path: PathBuf,
    sheet: Option<String>,
    connected: bool,
}

impl ExcelConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
            connected: false,
        }
    }

    pub fn with_sheet(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: Some(sheet.into()),
            connected: false,
        }
    }
}

impl Connector for ExcelConnector {
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
        let dataset = load_excel(&self.path, self.sheet.as_deref())?;
        info!(path = %self.path.display(), rows = dataset.row_count(), "loaded spreadsheet source");
        Ok(vec![dataset])
    }

    fn close(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

fn load_excel(path: &Path, sheet: Option<&str>) -> Result<Dataset, ConnectorError> {
    let path_str = path.display().to_string();
    let mut workbook = open_workbook_auto(path).map_err(|e| ConnectorError::Excel {
        path: path_str.clone(),
        message: e.to_string(),
    })?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ConnectorError::EmptySource(path_str.clone()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ConnectorError::Excel {
            path: path_str.clone(),
            message: e.to_string(),
        })?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter
        .next()
        .ok_or_else(|| ConnectorError::EmptySource(path_str.clone()))?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| sanitize_column_name(&cell_to_string(cell).unwrap_or_default(), i))
        .collect();

    let rows: Vec<Vec<Option<String>>> = rows_iter
        .map(|row| headers.iter().enumerate().map(|(i, _)| row.get(i).and_then(cell_to_string)).collect())
        .collect();

    let table = table_from_rows(&headers, &rows);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());
    Ok(Dataset::profile(name, "", table))
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.to_string()),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(format!("{:?}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_file() {
        let mut conn = ExcelConnector::new("/nonexistent/path.xlsx");
        assert!(conn.connect().is_err());
    }
}
