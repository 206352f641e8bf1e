use async_trait::async_trait;

use crate::errors::T3aResult;
use crate::llm::types::{CallConfig, ChatMessage, LlmResponse};

/// Chat-completion backend. Providers are registered by their config.toml key.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider's identifier (matches config.toml key).
    fn name(&self) -> &str;

    async fn chat(&self, messages: Vec<ChatMessage>, cfg: &CallConfig) -> T3aResult<LlmResponse>;
}
