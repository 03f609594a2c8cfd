//! A deterministic provider used by tests and as the last resort before
//! the fallback skeleton (spec.md §4.7), grounded on the teacher's
//! `MockClaudeProvider`: canned responses consumed in FIFO order, with
//! every request recorded for assertions.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::provider::LlmProvider;

pub struct MockLlmProvider {
    responses: Mutex<VecDeque<String>>,
    received: Mutex<Vec<(String, String)>>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_response(&self, code: impl Into<String>) {
        self.responses.lock().unwrap().push_back(code.into());
    }

    pub fn received_requests(&self) -> Vec<(String, String)> {
        self.received.lock().unwrap().clone()
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-deterministic"
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn generate_code(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.received
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));

        self.responses.lock().unwrap().pop_front().ok_or_else(|| {
            LlmError::Internal("MockLlmProvider: no response queued".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_queued_response_in_order() {
        let provider = MockLlmProvider::new();
        provider.queue_response("result = 1");
        provider.queue_response("result = 2");

        assert_eq!(
            provider.generate_code("sys", "q1").await.unwrap(),
            "result = 1"
        );
        assert_eq!(
            provider.generate_code("sys", "q2").await.unwrap(),
            "result = 2"
        );
        assert_eq!(provider.received_requests().len(), 2);
    }

    #[tokio::test]
    async fn errors_when_nothing_queued() {
        let provider = MockLlmProvider::new();
        assert!(provider.generate_code("sys", "q").await.is_err());
    }
}
