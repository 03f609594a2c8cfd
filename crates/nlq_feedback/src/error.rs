use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
