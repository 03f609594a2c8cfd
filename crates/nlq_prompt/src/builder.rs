//! Top-level prompt assembly (spec.md §4.6): pairs the fixed system
//! message with a per-question user message.

use nlq_schema::Dataset;
use tracing::debug;

use crate::feedback::FeedbackExample;
use crate::system::build_system_message;
use crate::user::build_user_message;

#[derive(Debug, Clone)]
pub struct PromptMessages {
    pub system: String,
    pub user: String,
}

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(question: &str, datasets: &[Dataset], feedback: &[FeedbackExample]) -> PromptMessages {
        debug!(
            datasets = datasets.len(),
            feedback_examples = feedback.len(),
            "building prompt"
        );
        PromptMessages {
            system: build_system_message(),
            user: build_user_message(question, datasets, feedback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    #[test]
    fn build_pairs_fixed_system_with_question_specific_user_message() {
        let dataset = Dataset::profile(
            "orders",
            "",
            Table::new(vec![Column::new("id", vec![Value::Text("1".into())])]),
        );
        let prompt = PromptBuilder::build("how many orders?", &[dataset], &[]);
        assert!(prompt.system.contains("result"));
        assert!(prompt.user.contains("how many orders?"));
    }
}
