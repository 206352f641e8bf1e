use async_trait::async_trait;
use futures_util::StreamExt;

use crate::errors::{T3aError, T3aResult};
use crate::llm::provider::LlmProvider;
use crate::llm::sse_parser;
use crate::llm::types::{CallConfig, ChatMessage, LlmResponse, StreamChunkKind};

pub struct OpenAiCompatibleProvider {
    id: String,
    api_base: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(id: String, api_base: String, api_key: String) -> Self {
        Self {
            id,
            api_base,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.id
    }

    async fn chat(&self, messages: Vec<ChatMessage>, cfg: &CallConfig) -> T3aResult<LlmResponse> {
        let body = serde_json::json!({
            "model": cfg.model,
            "messages": &messages,
            "stream": cfg.stream,
            "temperature": cfg.temperature,
        });

        tracing::debug!(
            provider = %self.id,
            model = %cfg.model,
            stream = cfg.stream,
            prompt_chars = messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "sending LLM request"
        );

        let response = self
            .client
            .post(&self.api_base)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(T3aError::LlmProvider(format!("{}: {}", status, err_body)));
        }

        if cfg.stream {
            self.handle_stream(response).await
        } else {
            self.handle_json(response).await
        }
    }
}

impl OpenAiCompatibleProvider {
    /// Handle SSE streaming response, accumulating the full completion.
    async fn handle_stream(&self, response: reqwest::Response) -> T3aResult<LlmResponse> {
        let mut byte_stream = response.bytes_stream();
        let mut lines = LineSplitter::default();
        let mut acc = StreamAccumulator::default();

        'stream: while let Some(result) = byte_stream.next().await {
            let bytes = result?;
            for line in lines.push(&bytes) {
                if acc.push_line(line.trim()) {
                    break 'stream;
                }
            }
        }
        // Stream may end without a trailing newline.
        if let Some(rest) = lines.finish() {
            acc.push_line(rest.trim());
        }

        let resp = acc.finish();
        tracing::info!(
            provider = %self.id,
            content_len = resp.content.len(),
            reasoning_len = resp.reasoning.len(),
            finish_reason = ?resp.finish_reason,
            "LLM stream complete"
        );
        Ok(resp)
    }

    /// Handle a non-streaming JSON response.
    async fn handle_json(&self, response: reqwest::Response) -> T3aResult<LlmResponse> {
        let json: serde_json::Value = response.json().await?;
        let resp = response_from_json(json);
        tracing::info!(
            provider = %self.id,
            content_len = resp.content.len(),
            finish_reason = ?resp.finish_reason,
            "LLM JSON response received"
        );
        Ok(resp)
    }
}

fn response_from_json(json: serde_json::Value) -> LlmResponse {
    let choice = &json["choices"][0];
    let content = choice["message"]["content"].as_str().unwrap_or("").to_string();
    let reasoning = choice["message"]["reasoning_content"]
        .as_str()
        .unwrap_or("")
        .to_string();
    let finish_reason = choice["finish_reason"].as_str().map(str::to_string);
    LlmResponse {
        content,
        reasoning,
        finish_reason,
        raw: json,
    }
}

/// Splits a byte stream into lines. Bytes are buffered until a newline so a
/// multi-byte character cut across network chunks decodes intact.
#[derive(Default)]
struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// Whatever followed the last newline, if non-blank.
    fn finish(self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        (!rest.trim().is_empty()).then_some(rest)
    }
}

/// Folds SSE lines into one response.
#[derive(Default)]
struct StreamAccumulator {
    content: String,
    reasoning: String,
    finish_reason: Option<String>,
    chunks: usize,
}

impl StreamAccumulator {
    /// Returns true once the `[DONE]` sentinel has been seen.
    fn push_line(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        match sse_parser::parse_sse_line(line) {
            Ok(Some(chunk)) => {
                self.chunks += 1;
                match chunk.kind {
                    StreamChunkKind::Reasoning => self.reasoning.push_str(&chunk.content),
                    StreamChunkKind::Content => self.content.push_str(&chunk.content),
                    StreamChunkKind::Done if chunk.content.is_empty() => return true,
                    StreamChunkKind::Done => self.finish_reason = Some(chunk.content),
                }
            }
            Ok(None) => {}
            Err(e) => tracing::debug!("SSE parse skipped: {e}"),
        }
        false
    }

    fn finish(self) -> LlmResponse {
        let raw = serde_json::json!({
            "streamed": true,
            "chunks": self.chunks,
            "content": self.content,
            "finish_reason": self.finish_reason,
        });
        LlmResponse {
            content: self.content,
            reasoning: self.reasoning,
            finish_reason: self.finish_reason,
            raw,
        }
    }
}
