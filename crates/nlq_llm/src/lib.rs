//! LLM Gateway (C7): a uniform `generate_code` capability over cloud
//! providers and a deterministic mock, with a shared post-processor and
//! fallback skeleton generator (spec.md §4.7).

pub mod cloud;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod mock;
pub mod postprocess;
pub mod provider;

pub use cloud::{AnthropicProvider, OpenAiProvider};
pub use error::LlmError;
pub use fallback::fallback_skeleton;
pub use gateway::LlmGateway;
pub use mock::MockLlmProvider;
pub use postprocess::extract_code_block;
pub use provider::{LlmProvider, MAX_TOKENS, TEMPERATURE};
