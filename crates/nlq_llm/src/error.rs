use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key error: {0}")]
    ApiKey(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("rate limit exceeded: retry after {retry_after_ms}ms")]
    RateLimit { retry_after_ms: u64 },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for LlmError {
    fn from(e: serde_json::Error) -> Self {
        LlmError::InvalidResponse(e.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Http(e.to_string())
    }
}
