//! Semantic type lattice (spec.md §3).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Categorical,
    Id,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SemanticType::String => "string",
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::Boolean => "boolean",
            SemanticType::Date => "date",
            SemanticType::DateTime => "datetime",
            SemanticType::Categorical => "categorical",
            SemanticType::Id => "id",
        };
        write!(f, "{}", s)
    }
}

impl SemanticType {
    pub fn is_numeric(self) -> bool {
        matches!(self, SemanticType::Integer | SemanticType::Float)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, SemanticType::Date | SemanticType::DateTime)
    }
}
