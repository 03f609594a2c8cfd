//! Prompt Builder (C6): assembles the system and user messages sent to
//! the LLM gateway from loaded datasets, their inferred schema, and
//! detected relationships (spec.md §4.6).

pub mod builder;
pub mod examples;
pub mod feedback;
pub mod system;
pub mod user;

pub use builder::{PromptBuilder, PromptMessages};
pub use examples::synthesize_worked_examples;
pub use feedback::FeedbackExample;
pub use system::build_system_message;
pub use user::build_user_message;
