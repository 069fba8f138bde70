/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration (also serves LM Studio)
 * - Anthropic: Anthropic API integration
 * - Mock: scripted provider for tests
 *
 * Providers expose a single capability, [`BatchProvider::translate_batch`],
 * and perform no retries of their own.
 */

use std::collections::HashMap;

use async_trait::async_trait;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::translation::planner::BatchSchema;
use crate::translation::prompts::PromptContext;

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod structured;

use self::anthropic::Anthropic;
use self::ollama::Ollama;
use self::openai::OpenAI;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation engine.
#[async_trait]
pub trait BatchProvider: Send + Sync {
    /// Translate every key of a batch
    ///
    /// # Arguments
    /// * `schema` - The keys to translate and the shape the answer must have
    /// * `prompt` - Target locale, message context and instruction
    ///
    /// # Returns
    /// * `Result<HashMap<String, String>, ProviderError>` - Requested keys mapped to
    ///   their translation; keys the model omitted are absent
    async fn translate_batch(
        &self,
        schema: &BatchSchema,
        prompt: &PromptContext,
    ) -> Result<HashMap<String, String>, ProviderError>;

    /// Short provider identifier used in logs
    fn name(&self) -> &str;
}

/// Provider selected by configuration
#[derive(Debug, Clone)]
pub enum ProviderClient {
    /// Ollama LLM service
    Ollama(Ollama),
    /// OpenAI API service
    OpenAI(OpenAI),
    /// LM Studio local server (OpenAI-compatible)
    LMStudio(OpenAI),
    /// Anthropic API service
    Anthropic(Anthropic),
}

impl ProviderClient {
    /// Build the client for the active provider of a configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        let model = config.get_model();
        let endpoint = config.get_endpoint();
        let timeout_secs = config.get_timeout_secs();
        let max_tokens = config.get_max_tokens();
        let temperature = config.common.temperature;

        match config.provider {
            TranslationProvider::Ollama => Self::Ollama(Ollama::new(endpoint, model, timeout_secs, temperature)),
            TranslationProvider::OpenAI => Self::OpenAI(OpenAI::new(
                config.get_api_key(),
                endpoint,
                model,
                timeout_secs,
                max_tokens,
                temperature,
            )),
            TranslationProvider::LMStudio => Self::LMStudio(OpenAI::lm_studio(
                config.get_api_key(),
                endpoint,
                model,
                timeout_secs,
                max_tokens,
                temperature,
            )),
            TranslationProvider::Anthropic => Self::Anthropic(Anthropic::new(
                config.get_api_key(),
                endpoint,
                model,
                timeout_secs,
                max_tokens,
                temperature,
            )),
        }
    }
}

#[async_trait]
impl BatchProvider for ProviderClient {
    async fn translate_batch(
        &self,
        schema: &BatchSchema,
        prompt: &PromptContext,
    ) -> Result<HashMap<String, String>, ProviderError> {
        match self {
            Self::Ollama(client) => client.translate_batch(schema, prompt).await,
            Self::OpenAI(client) | Self::LMStudio(client) => client.translate_batch(schema, prompt).await,
            Self::Anthropic(client) => client.translate_batch(schema, prompt).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Ollama(client) => client.name(),
            Self::OpenAI(client) | Self::LMStudio(client) => client.name(),
            Self::Anthropic(client) => client.name(),
        }
    }
}
