use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("guest process faulted: {0}")]
    Faulted(String),

    #[error("captured result is not valid JSON: {0}")]
    InvalidCapture(String),

    #[error("failed to spawn guest process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("I/O error talking to guest process: {0}")]
    Io(#[from] std::io::Error),
}
