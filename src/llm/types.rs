use serde::{Deserialize, Serialize};

/// One chat-completion message. The agent is text-only, so content is always a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub kind: StreamChunkKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamChunkKind {
    Reasoning,
    Content,
    /// `content` holds the finish reason, empty for the `[DONE]` sentinel.
    Done,
}

/// Per-call settings resolved from a role.
#[derive(Debug, Clone, PartialEq)]
pub struct CallConfig {
    pub model: String,
    pub stream: bool,
    pub temperature: f32,
}

/// Accumulated completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub reasoning: String,
    pub finish_reason: Option<String>,
    /// Provider payload, kept for step logs. Streaming responses carry a
    /// synthesized object since no single payload exists.
    pub raw: serde_json::Value,
}

impl LlmResponse {
    pub fn is_content_filtered(&self) -> bool {
        self.finish_reason.as_deref() == Some("content_filter")
    }
}
