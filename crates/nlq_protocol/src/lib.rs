//! Shared identifiers, value model, error taxonomy and Response types
//! used across every Analysis Core crate (`nlq_*`).

pub mod error;
pub mod ids;
pub mod response;
pub mod value;

pub use error::{classify_error, ErrorKind};
pub use ids::{FileId, IdParseError, SessionId};
pub use response::{
    parse_response, ChartFormat, ChartSpec, ErrorDetail, InvalidOutputValueMismatch, RawResult,
    Response, TableResult, TABLE_ROW_CAP,
};
pub use value::Value;
