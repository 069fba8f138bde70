/*!
 * Ollama client.
 *
 * Uses the `/api/chat` endpoint with the batch JSON schema passed as the
 * `format` field, which constrains generation to a matching object.
 */

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BatchProvider;
use super::structured::parse_batch_response;
use crate::errors::ProviderError;
use crate::translation::planner::BatchSchema;
use crate::translation::prompts::{PromptContext, render_batch_request};

/// Ollama client for interacting with Ollama API
#[derive(Debug, Clone)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// HTTP client for making requests
    client: Client,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, or tool)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// JSON schema the answer must satisfy
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Value>,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Model name
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    pub done: bool,
    /// Number of prompt tokens
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(default)]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    /// Create a new non-streaming chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            format: None,
            stream: false,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Constrain the answer to a JSON schema
    pub fn format(mut self, schema: Value) -> Self {
        self.format = Some(schema);
        self
    }
}

impl Ollama {
    /// Create a new Ollama client
    ///
    /// Ollama typically uses HTTP/1.1, so HTTP/2 is not forced.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout_secs: u64, temperature: f32) -> Self {
        Self {
            base_url: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Send a chat request
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let response_text = response.text().await?;
        serde_json::from_str::<ChatResponse>(&response_text)
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama API response: {}", e)))
    }
}

#[async_trait]
impl BatchProvider for Ollama {
    async fn translate_batch(
        &self,
        schema: &BatchSchema,
        prompt: &PromptContext,
    ) -> Result<HashMap<String, String>, ProviderError> {
        let request = ChatRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::new("system", prompt.instruction.clone()),
                ChatMessage::new("user", render_batch_request(schema)),
            ],
        )
        .temperature(self.temperature)
        .format(schema.to_json_schema());

        let response = self.chat(&request).await?;
        debug!(
            "Ollama {} answered {} key(s) (prompt tokens: {:?}, completion tokens: {:?})",
            response.model,
            schema.keys().len(),
            response.prompt_eval_count,
            response.eval_count
        );
        parse_batch_response(&response.message.content, schema)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
