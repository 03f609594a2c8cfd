//! Dataset & Schema (C2): type inference, statistics, relationship
//! detection, and the user-facing Semantic Schema / transformation
//! pipeline that connectors apply at load time.

pub mod dataset;
pub mod inference;
pub mod relationships;
pub mod semantic_schema;
pub mod stats;
pub mod table;
pub mod transform;
pub mod types;

pub use dataset::{detect_all_relationships, ColumnMetadata, Dataset};
pub use relationships::{Relationship, RelationshipKind, TargetCandidate, OVERLAP_THRESHOLD};
pub use semantic_schema::{Cardinality, ColumnDef, CrossRelation, DateComponent, SemanticSchema, TransformationRule};
pub use stats::ColumnStats;
pub use table::{Column, Table};
pub use types::SemanticType;
