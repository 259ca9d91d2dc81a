// orchestrator/src/experts/llm_client.rs

use async_trait::async_trait;
use common_utils::GateConfig;
use gate_core::{CompletionClient, LlmError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageContent,
}

#[derive(Deserialize)]
struct ChatMessageContent {
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat-completions client for a local OpenAI-compatible service.
pub struct HttpCompletionClient {
    client: Client,
    chat_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_ms: u64,
}

impl HttpCompletionClient {
    pub fn new(config: &GateConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.llm_timeout_ms))
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            chat_url: config.chat_completions_url(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_ms: config.llm_timeout_ms,
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    fn name(&self) -> &'static str {
        "http_chat_completions"
    }

    async fn complete(&self, messages: Vec<Value>) -> Result<String, LlmError> {
        let request_body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        debug!(url = %self.chat_url, model = %self.model, "[LlmClient] Sending completion request");
        let response = self
            .client
            .post(&self.chat_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Could not read error body: {}", e));
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let response_text = response.text().await.map_err(|e| self.transport_error(e))?;
        let chat_response: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| LlmError::MalformedEnvelope(format!("{}. Raw text: {}", e, response_text)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or(LlmError::EmptyCompletion)
    }
}

impl HttpCompletionClient {
    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout { timeout_ms: self.timeout_ms }
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}
