//! Response Taxonomy (C1): tagged result values plus the parser that
//! turns a raw `{type, value}` shape (as captured from generated code,
//! spec.md §4.5) into a typed [`Response`].
//!
//! Grounded on `examples/original_source/core/response/parser.py`: the
//! five response classes and the validation rules in
//! `ResponseParser._validate_response`/`_generate_response` map directly
//! onto the `Response` variants and [`parse_response`] below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;

pub const TABLE_ROW_CAP: usize = 25;

/// Declarative chart format discriminator (spec.md §4.1, Design Note a).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    Apex,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub format: ChartFormat,
    /// For `Apex`: the ApexCharts config object. For `Image`: wrapped as
    /// `{"path": ...}` so both formats share one `config` field shape.
    pub config: serde_json::Value,
    /// Inferred/requested variant (`bar`, `line`, `pie`, ...), set by the
    /// Engine's auto-selection heuristic (spec.md §6) when known.
    pub chart_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableResult {
    pub rows: Vec<serde_json::Value>,
    pub total_records: usize,
    pub results_limited: bool,
}

impl TableResult {
    /// Build from an unbounded row set, applying the transport cap
    /// (spec.md §6: `data` capped at 25 rows, `total_records` carries
    /// the untruncated count, `results_limited` flags truncation).
    pub fn capped(rows: Vec<serde_json::Value>) -> Self {
        let total_records = rows.len();
        let results_limited = total_records > TABLE_ROW_CAP;
        let rows = if results_limited {
            rows.into_iter().take(TABLE_ROW_CAP).collect()
        } else {
            rows
        };
        Self {
            rows,
            total_records,
            results_limited,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
    pub last_code: Option<String>,
}

/// The sum type of spec.md §3: `Scalar | Text | Table | Chart | Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    Scalar(f64),
    Text(String),
    Table(TableResult),
    Chart(ChartSpec),
    Error(ErrorDetail),
}

impl Response {
    pub fn error(kind: ErrorKind, message: impl Into<String>, last_code: Option<String>) -> Self {
        Response::Error(ErrorDetail {
            kind,
            message: message.into(),
            last_code,
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    /// A `visualization_available` hint consumed by the HTTP layer
    /// (spec.md §4.10 side-effect), true only for successful charts.
    pub fn visualization_available(&self) -> bool {
        matches!(self, Response::Chart(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidOutputValueMismatch {
    #[error("result must be a {{type, value}} shape, got: {0}")]
    NotShaped(String),
    #[error("invalid output type: {0}")]
    UnknownType(String),
    #[error("expected a numeric value for result type 'scalar', got: {0}")]
    ExpectedNumber(String),
    #[error("expected a string value for result type 'text', got: {0}")]
    ExpectedString(String),
    #[error("expected an array of row objects for result type 'table', got: {0}")]
    ExpectedTable(String),
    #[error("apex chart format requires a 'config' object")]
    ApexMissingConfig,
    #[error("image chart format requires a path string or base64 data URI")]
    ImageBadPath,
}

/// Raw capture shape as produced by the sandboxed executor: a JSON
/// `{"type": ..., "value": ...}` object (the `result`/`resultado`/`df`/
/// `data` variable, normalized; spec.md §4.5).
#[derive(Debug, Clone, Deserialize)]
pub struct RawResult {
    #[serde(rename = "type")]
    pub tag: String,
    pub value: serde_json::Value,
}

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".svg", ".pdf"];

fn looks_like_image_path(s: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| s.ends_with(ext)) || s.starts_with("data:image")
}

/// Parse a raw `{type, value}` result into a typed [`Response`].
/// `plot` is accepted as a legacy synonym for an image-format chart
/// (spec.md §4.1, Design Note a).
pub fn parse_response(raw: &RawResult) -> Result<Response, InvalidOutputValueMismatch> {
    match raw.tag.as_str() {
        "scalar" | "number" => {
            let n = raw
                .value
                .as_f64()
                .ok_or_else(|| InvalidOutputValueMismatch::ExpectedNumber(raw.value.to_string()))?;
            Ok(Response::Scalar(n))
        }
        "text" | "string" => {
            let s = raw
                .value
                .as_str()
                .ok_or_else(|| InvalidOutputValueMismatch::ExpectedString(raw.value.to_string()))?;
            Ok(Response::Text(s.to_string()))
        }
        "table" | "dataframe" => {
            let rows = raw
                .value
                .as_array()
                .ok_or_else(|| InvalidOutputValueMismatch::ExpectedTable(raw.value.to_string()))?
                .clone();
            Ok(Response::Table(TableResult::capped(rows)))
        }
        "plot" => parse_image_chart(&raw.value),
        "chart" => parse_chart(&raw.value),
        other => Err(InvalidOutputValueMismatch::UnknownType(other.to_string())),
    }
}

fn parse_chart(value: &serde_json::Value) -> Result<Response, InvalidOutputValueMismatch> {
    if let Some(obj) = value.as_object() {
        if obj.get("format").and_then(|v| v.as_str()) == Some("apex") {
            let config = obj
                .get("config")
                .cloned()
                .ok_or(InvalidOutputValueMismatch::ApexMissingConfig)?;
            if !config.is_object() {
                return Err(InvalidOutputValueMismatch::ApexMissingConfig);
            }
            let chart_type = config
                .get("chart")
                .and_then(|c| c.get("type"))
                .and_then(|t| t.as_str())
                .map(|s| s.to_string());
            return Ok(Response::Chart(ChartSpec {
                format: ChartFormat::Apex,
                config,
                chart_type,
            }));
        }
        if obj.get("format").and_then(|v| v.as_str()) == Some("image") {
            let path = obj
                .get("config")
                .and_then(|v| v.as_str())
                .ok_or(InvalidOutputValueMismatch::ImageBadPath)?;
            return build_image_chart(path);
        }
    }
    // Bare image path/base64, no format wrapper.
    let path = value
        .as_str()
        .ok_or_else(|| InvalidOutputValueMismatch::ExpectedString(value.to_string()))?;
    build_image_chart(path)
}

fn parse_image_chart(value: &serde_json::Value) -> Result<Response, InvalidOutputValueMismatch> {
    let path = value
        .as_str()
        .ok_or_else(|| InvalidOutputValueMismatch::ExpectedString(value.to_string()))?;
    build_image_chart(path)
}

fn build_image_chart(path: &str) -> Result<Response, InvalidOutputValueMismatch> {
    if !looks_like_image_path(path) && !path.starts_with('/') && !path.contains('/') {
        return Err(InvalidOutputValueMismatch::ImageBadPath);
    }
    Ok(Response::Chart(ChartSpec {
        format: ChartFormat::Image,
        config: serde_json::json!({ "path": path }),
        chart_type: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(tag: &str, value: serde_json::Value) -> RawResult {
        RawResult {
            tag: tag.to_string(),
            value,
        }
    }

    #[test]
    fn parses_scalar() {
        let r = parse_response(&raw("scalar", json!(42))).unwrap();
        assert_eq!(r, Response::Scalar(42.0));
    }

    #[test]
    fn rejects_non_numeric_scalar() {
        let err = parse_response(&raw("scalar", json!("nope"))).unwrap_err();
        assert!(matches!(err, InvalidOutputValueMismatch::ExpectedNumber(_)));
    }

    #[test]
    fn table_rows_are_capped_at_25_with_total_and_flag() {
        let rows: Vec<_> = (0..40).map(|i| json!({ "i": i })).collect();
        let r = parse_response(&raw("table", json!(rows))).unwrap();
        match r {
            Response::Table(t) => {
                assert_eq!(t.rows.len(), 25);
                assert_eq!(t.total_records, 40);
                assert!(t.results_limited);
            }
            _ => panic!("expected table"),
        }
    }

    #[test]
    fn legacy_plot_tag_becomes_image_chart() {
        let r = parse_response(&raw("plot", json!("/tmp/out.png"))).unwrap();
        match r {
            Response::Chart(c) => assert_eq!(c.format, ChartFormat::Image),
            _ => panic!("expected chart"),
        }
    }

    #[test]
    fn apex_chart_requires_config_object() {
        let err = parse_response(&raw("chart", json!({ "format": "apex" }))).unwrap_err();
        assert_eq!(err, InvalidOutputValueMismatch::ApexMissingConfig);
    }

    #[test]
    fn apex_chart_extracts_chart_type_when_present() {
        let r = parse_response(&raw(
            "chart",
            json!({ "format": "apex", "config": { "chart": { "type": "bar" }, "series": [] } }),
        ))
        .unwrap();
        match r {
            Response::Chart(c) => assert_eq!(c.chart_type.as_deref(), Some("bar")),
            _ => panic!("expected chart"),
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = parse_response(&raw("mystery", json!(1))).unwrap_err();
        assert!(matches!(err, InvalidOutputValueMismatch::UnknownType(_)));
    }
}
