//! The `predict` contract the agent and the model-assisted description use.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::errors::T3aResult;
use crate::llm::provider::LlmProvider;
use crate::llm::registry::{ModelRole, ProviderRegistry};
use crate::llm::types::{CallConfig, ChatMessage};

/// Result of one text completion.
///
/// `raw_response == None` means the model could not be reached at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Prediction {
    pub text: String,
    pub is_safe: Option<bool>,
    pub raw_response: Option<Value>,
}

impl Prediction {
    pub fn failed() -> Self {
        Self::default()
    }

    /// True only when a safety classifier explicitly vetoed the output.
    pub fn is_vetoed(&self) -> bool {
        self.is_safe == Some(false)
    }

    pub fn is_unavailable(&self) -> bool {
        self.raw_response.is_none()
    }
}

#[async_trait]
pub trait TextModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// Never fails; errors surface as [`Prediction::failed`].
    async fn predict(&self, prompt: &str) -> Prediction;
}

/// A provider role exposed as a [`TextModel`], retrying failed calls.
pub struct RoleModel {
    role: ModelRole,
    provider: Arc<dyn LlmProvider>,
    call: CallConfig,
    max_retries: u32,
    retry_delay: Duration,
}

impl RoleModel {
    pub fn new(
        role: ModelRole,
        provider: Arc<dyn LlmProvider>,
        call: CallConfig,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            role,
            provider,
            call,
            max_retries,
            retry_delay,
        }
    }

    pub fn for_role(
        registry: &ProviderRegistry,
        role: ModelRole,
        max_retries: u32,
        retry_delay: Duration,
    ) -> T3aResult<Self> {
        let (provider, call) = registry.call_config_for_role(role)?;
        Ok(Self::new(role, provider, call, max_retries, retry_delay))
    }
}

#[async_trait]
impl TextModel for RoleModel {
    fn model_name(&self) -> &str {
        &self.call.model
    }

    async fn predict(&self, prompt: &str) -> Prediction {
        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            match self
                .provider
                .chat(vec![ChatMessage::user(prompt)], &self.call)
                .await
            {
                Ok(resp) => {
                    let filtered = resp.is_content_filtered();
                    if filtered {
                        tracing::warn!(role = %self.role, model = %self.call.model, "output blocked by content filter");
                    }
                    return Prediction {
                        text: resp.content,
                        is_safe: Some(!filtered),
                        raw_response: Some(resp.raw),
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        role = %self.role,
                        model = %self.call.model,
                        attempt,
                        attempts,
                        error = %e,
                        "model call failed"
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        tracing::error!(role = %self.role, model = %self.call.model, "model unavailable after retries");
        Prediction::failed()
    }
}
