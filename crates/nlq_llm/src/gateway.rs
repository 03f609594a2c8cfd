//! Ties a provider to the post-processor and the fallback skeleton
//! generator (spec.md §4.7): `generate` never fails — a provider
//! exception degrades to the fallback rather than propagating.

use std::sync::Arc;

use nlq_schema::Dataset;
use tracing::warn;

use crate::fallback::fallback_skeleton;
use crate::postprocess::extract_code_block;
use crate::provider::LlmProvider;

pub struct LlmGateway {
    provider: Arc<dyn LlmProvider>,
}

impl LlmGateway {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate(&self, system: &str, user: &str, question: &str, datasets: &[Dataset]) -> String {
        match self.provider.generate_code(system, user).await {
            Ok(raw) => extract_code_block(&raw),
            Err(err) => {
                warn!(provider = self.provider.name(), error = %err, "llm provider failed, using fallback skeleton");
                fallback_skeleton(question, datasets)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLlmProvider;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    #[tokio::test]
    async fn postprocesses_a_successful_response() {
        let mock = Arc::new(MockLlmProvider::new());
        mock.queue_response("prose\n```python\nresult = {\"type\": \"scalar\", \"value\": 1}\n```");
        let gateway = LlmGateway::new(mock);

        let code = gateway.generate("sys", "user", "q", &[]).await;
        assert!(code.contains("result ="));
        assert!(!code.contains("```"));
    }

    #[tokio::test]
    async fn falls_back_when_provider_errors() {
        let mock = Arc::new(MockLlmProvider::new());
        let gateway = LlmGateway::new(mock);
        let dataset = Dataset::profile(
            "orders",
            "",
            Table::new(vec![Column::new("id", vec![Value::Text("1".into())])]),
        );

        let code = gateway.generate("sys", "user", "how many orders?", &[dataset]).await;
        assert!(code.contains("FROM orders"));
    }
}
