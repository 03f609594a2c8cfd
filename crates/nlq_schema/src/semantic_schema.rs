//! Semantic Schema (spec.md §3): a user-supplied or factory-produced
//! description applied at load time. Transformation kinds are a closed
//! sum type per Design Note "Dynamic dispatch in transformations" —
//! the source dispatches by string match, the target is exhaustively
//! matched by the compiler (`transform.rs`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::SemanticType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub semantic_type: SemanticType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRelation {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub cardinality: Cardinality,
}

/// One [`TransformationRule`] per column, applied in declaration order
/// by `transform::apply_transformations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TransformationRule {
    Rename { column: String, to: String },
    FillNa { column: String, value: serde_json::Value },
    DropNa { column: String },
    ConvertType { column: String, to: SemanticType },
    MapValues { column: String, mapping: HashMap<String, String> },
    Clip { column: String, min: Option<f64>, max: Option<f64> },
    Normalize { column: String },
    Standardize { column: String },
    EncodeCategorical { column: String },
    ExtractDate { column: String, components: Vec<DateComponent> },
    Round { column: String, digits: u32 },
    Uppercase { column: String },
    Replace { column: String, from: String, to: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateComponent {
    Year,
    Month,
    Day,
    Weekday,
}

impl TransformationRule {
    pub fn column_name(&self) -> &str {
        match self {
            TransformationRule::Rename { column, .. }
            | TransformationRule::FillNa { column, .. }
            | TransformationRule::DropNa { column }
            | TransformationRule::ConvertType { column, .. }
            | TransformationRule::MapValues { column, .. }
            | TransformationRule::Clip { column, .. }
            | TransformationRule::Normalize { column }
            | TransformationRule::Standardize { column }
            | TransformationRule::EncodeCategorical { column }
            | TransformationRule::ExtractDate { column, .. }
            | TransformationRule::Round { column, .. }
            | TransformationRule::Uppercase { column }
            | TransformationRule::Replace { column, .. } => column,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticSchema {
    pub columns: Vec<ColumnDef>,
    pub relations: Vec<CrossRelation>,
    pub transformations: Vec<TransformationRule>,
}

impl SemanticSchema {
    pub fn empty() -> Self {
        Self::default()
    }
}
