//! Alternative Flow (C8): pre-query entity checks, error classification
//! and recovery, query rephrasing, and predefined-suggestion synthesis
//! for when the LLM pipeline fails (spec.md §4.8).

pub mod entities;
pub mod offer;
pub mod recovery;
pub mod rephrase;
pub mod simplify;
pub mod suggestions;

pub use entities::pre_query_check;
pub use offer::offer_predefined_options;
pub use recovery::{classify_error, extract_missing_table_name, missing_table_response, ErrorKind};
pub use rephrase::rephrase_query;
pub use simplify::simplify_query;
pub use suggestions::generate_alternative_queries;
