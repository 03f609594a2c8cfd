//! The gateway's single capability (spec.md §4.7): `generate_code`,
//! implemented by cloud providers and a deterministic mock.

use async_trait::async_trait;

use crate::error::LlmError;

/// Low and pinned rather than configurable: deterministic, close-to-
/// greedy decoding is what a code-generation prompt wants.
pub const TEMPERATURE: f32 = 0.1;
pub const MAX_TOKENS: u32 = 2048;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn is_ready(&self) -> bool;

    /// Send the system/user message pair and return the raw completion
    /// text (code fences and leading prose not yet stripped — that is
    /// [`crate::postprocess::extract_code_block`]'s job).
    async fn generate_code(&self, system: &str, user: &str) -> Result<String, LlmError>;
}
