/*!
 * Per-task execution with bounded retries.
 *
 * A task is attempted at most `max_retries + 1` times with a fixed delay
 * between attempts. Exhausting the attempts yields a failed outcome; it never
 * aborts sibling tasks.
 */

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::prompts::{PromptContext, PromptTemplate};
use super::task::TranslationTask;
use crate::errors::ProviderError;
use crate::providers::BatchProvider;

/// How a response that omits requested keys is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialResponsePolicy {
    /// Merge what was returned; omitted keys stay pending
    #[default]
    Accept,
    /// Count the response as a failed attempt
    Retry,
}

/// Retry budget of a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Fixed pause between two attempts
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    /// Total number of attempts a task may make
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Final state of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The provider answered; `missing` lists requested keys it omitted
    Succeeded {
        translations: HashMap<String, String>,
        missing: Vec<String>,
        attempts: u32,
    },
    /// Every attempt failed
    Failed { error: String, attempts: u32 },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Runs tasks against a provider, applying the retry and partial-response policies
pub struct TaskExecutor<'a, P: BatchProvider> {
    provider: &'a P,
    retry: RetryPolicy,
    partial_responses: PartialResponsePolicy,
    template: &'a PromptTemplate,
}

impl<'a, P: BatchProvider> TaskExecutor<'a, P> {
    pub fn new(
        provider: &'a P,
        retry: RetryPolicy,
        partial_responses: PartialResponsePolicy,
        template: &'a PromptTemplate,
    ) -> Self {
        Self {
            provider,
            retry,
            partial_responses,
            template,
        }
    }

    /// Execute one task until it succeeds or its attempts run out
    pub async fn execute(&self, task: &TranslationTask) -> TaskOutcome {
        let prompt = PromptContext::with_template(self.template, &task.locale, &task.context);
        let max_attempts = self.retry.max_attempts();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let error = match self.attempt(task, &prompt).await {
                Ok((translations, missing)) => {
                    debug!(
                        "{}: {} of {} key(s) translated by {} after {} attempt(s)",
                        task.label(),
                        translations.len(),
                        task.keys().len(),
                        self.provider.name(),
                        attempts
                    );
                    return TaskOutcome::Succeeded {
                        translations,
                        missing,
                        attempts,
                    };
                }
                Err(error) => error,
            };

            if attempts >= max_attempts {
                warn!("{}: giving up after {} attempt(s): {}", task.label(), attempts, error);
                return TaskOutcome::Failed {
                    error: error.to_string(),
                    attempts,
                };
            }

            warn!(
                "{}: attempt {}/{} failed: {}; retrying in {:?}",
                task.label(),
                attempts,
                max_attempts,
                error,
                self.retry.retry_delay
            );
            tokio::time::sleep(self.retry.retry_delay).await;
        }
    }

    async fn attempt(
        &self,
        task: &TranslationTask,
        prompt: &PromptContext,
    ) -> Result<(HashMap<String, String>, Vec<String>), ProviderError> {
        let translations = self.provider.translate_batch(&task.schema, prompt).await?;
        let missing = task.schema.missing_keys(&translations);

        if !missing.is_empty() && self.partial_responses == PartialResponsePolicy::Retry {
            return Err(ProviderError::IncompleteResponse { missing });
        }
        Ok((translations, missing))
    }
}
