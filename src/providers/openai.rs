/*!
 * OpenAI-compatible chat completions client.
 *
 * Serves both the OpenAI API and LM Studio's local server. The batch schema
 * is sent as a strict `json_schema` response format.
 */

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::BatchProvider;
use super::structured::parse_batch_response;
use crate::errors::ProviderError;
use crate::translation::planner::BatchSchema;
use crate::translation::prompts::{PromptContext, render_batch_request};

/// OpenAI client for interacting with OpenAI-compatible APIs
#[derive(Debug, Clone)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL including the `/v1` segment
    endpoint: String,
    /// Model name
    model: String,
    /// Maximum number of tokens to generate
    max_tokens: u32,
    /// Sampling temperature
    temperature: f32,
    /// Name reported in logs (`openai` or `lmstudio`)
    label: &'static str,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completions request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,
    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Structured output contract
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    /// Number of prompt tokens
    pub prompt_tokens: u32,
    /// Number of completion tokens
    pub completion_tokens: u32,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// The generated message
    pub message: OpenAIMessage,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Chat completions response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Completion choices
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIRequest {
    /// Create a new chat completions request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
            response_format: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: Some(content.into()),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Require the answer to satisfy a JSON schema
    pub fn json_schema(mut self, name: &str, schema: Value) -> Self {
        self.response_format = Some(json!({
            "type": "json_schema",
            "json_schema": {
                "name": name,
                "strict": true,
                "schema": schema,
            }
        }));
        self
    }
}

impl OpenAI {
    /// Create a client for the OpenAI API
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            max_tokens,
            temperature,
            label: "openai",
        }
    }

    /// Create a client for an LM Studio local server
    pub fn lm_studio(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        let api_key = api_key.into();
        // LM Studio ignores the key but some builds reject an empty bearer token
        let api_key = if api_key.is_empty() { "lm-studio".to_string() } else { api_key };
        Self {
            label: "lmstudio",
            ..Self::new(api_key, endpoint, model, timeout_secs, max_tokens, temperature)
        }
    }

    /// Complete a chat request
    pub async fn complete(&self, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let api_url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("{} API error ({}): {}", self.label, status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse {} API response: {}", self.label, e)))
    }

    /// Extract text from the first choice
    pub fn extract_text_from_response(response: &OpenAIResponse) -> Option<&str> {
        response.choices.first().and_then(|choice| choice.message.content.as_deref())
    }
}

#[async_trait]
impl BatchProvider for OpenAI {
    async fn translate_batch(
        &self,
        schema: &BatchSchema,
        prompt: &PromptContext,
    ) -> Result<HashMap<String, String>, ProviderError> {
        let request = OpenAIRequest::new(self.model.clone())
            .add_message("system", prompt.instruction.clone())
            .add_message("user", render_batch_request(schema))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .json_schema("batch_translation", schema.to_json_schema());

        let response = self.complete(&request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                "{} answered batch of {} key(s) ({} prompt / {} completion tokens)",
                self.label,
                schema.keys().len(),
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let text = Self::extract_text_from_response(&response)
            .ok_or_else(|| ProviderError::ParseError("response contained no message content".to_string()))?;
        parse_batch_response(text, schema)
    }

    fn name(&self) -> &str {
        self.label
    }
}
