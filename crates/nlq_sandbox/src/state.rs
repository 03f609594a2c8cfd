//! The execution state machine (spec.md §4.5):
//! `Idle -> Validating -> Executing -> Capturing -> Done`,
//! `Idle -> Validating -> Rejected`, `Executing -> TimedOut`.
//! `Done`, `Rejected`, `TimedOut`, `Faulted` are terminal.

use serde_json::Value as JsonValue;

use crate::error::SandboxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxState {
    Idle,
    Validating,
    Executing,
    Capturing,
    Done,
    Rejected,
    TimedOut,
    Faulted,
}

impl SandboxState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SandboxState::Done
                | SandboxState::Rejected
                | SandboxState::TimedOut
                | SandboxState::Faulted
        )
    }
}

/// The outcome of one sandboxed run: the final state plus whatever data
/// that state carries.
#[derive(Debug, Clone)]
pub struct SandboxOutcome {
    pub state: SandboxState,
    /// The `{type, value}` capture, present only when `state == Done`
    /// and a result variable was found.
    pub capture: Option<JsonValue>,
    pub stdout: String,
    pub stdout_truncated: bool,
    pub message: Option<String>,
}

impl SandboxOutcome {
    pub fn done(capture: Option<JsonValue>, stdout: String, stdout_truncated: bool) -> Self {
        Self {
            state: SandboxState::Done,
            capture,
            stdout,
            stdout_truncated,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            state: SandboxState::Rejected,
            capture: None,
            stdout: String::new(),
            stdout_truncated: false,
            message: Some(message.into()),
        }
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            state: SandboxState::TimedOut,
            capture: None,
            stdout: String::new(),
            stdout_truncated: false,
            message: Some(message.into()),
        }
    }

    pub fn faulted(message: impl Into<String>) -> Self {
        Self {
            state: SandboxState::Faulted,
            capture: None,
            stdout: String::new(),
            stdout_truncated: false,
            message: Some(message.into()),
        }
    }

    pub fn into_result(self) -> Result<Self, SandboxError> {
        match self.state {
            SandboxState::Done => Ok(self),
            SandboxState::Rejected => Err(SandboxError::Validation(
                self.message.unwrap_or_else(|| "rejected".to_string()),
            )),
            SandboxState::TimedOut => Err(SandboxError::Timeout(std::time::Duration::ZERO)),
            SandboxState::Faulted => Err(SandboxError::Faulted(
                self.message.unwrap_or_else(|| "guest faulted".to_string()),
            )),
            _ => unreachable!("non-terminal state reached into_result"),
        }
    }
}
