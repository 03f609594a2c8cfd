use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse JSON '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON source '{path}' must be an array or object")]
    InvalidJsonShape { path: String },

    #[error("failed to read Parquet '{path}': {message}")]
    Parquet { path: String, message: String },

    #[error("failed to read spreadsheet '{path}': {message}")]
    Excel { path: String, message: String },

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("source is empty or contains no rows: {0}")]
    EmptySource(String),

    #[error("connector is not connected")]
    NotConnected,
}
