//! On-disk record shapes (spec.md §4.9).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessfulQuery {
    pub timestamp: i64,
    pub original_question: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFeedback {
    pub timestamp: i64,
    pub question: String,
    pub feedback: String,
}
