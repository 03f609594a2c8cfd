//! Feedback Store (C9): a JSON-backed successful-query cache and
//! user-feedback log, with token-overlap similarity lookup (spec.md
//! §4.9).

pub mod atomic;
pub mod error;
pub mod similarity;
pub mod store;
pub mod types;

pub use error::FeedbackError;
pub use store::FeedbackStore;
pub use types::{SuccessfulQuery, UserFeedback};
