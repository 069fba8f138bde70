/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds, translating every key
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::fail_first(n)` - Fails the first n requests, then works
 * - `MockProvider::partial(n)` - Omits every nth key of a batch
 *
 * Every mock records the batches it receives and the peak number of
 * concurrent requests, so tests can assert on scheduling.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::BatchProvider;
use crate::translation::planner::BatchSchema;
use crate::translation::prompts::PromptContext;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Always succeeds with a translation for every key
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Fails the first N requests, then succeeds
    FailFirst { failures: usize },
    /// Succeeds but omits every Nth key of the batch
    Partial { drop_every: usize },
    /// Succeeds with an empty string for every key
    Empty,
}

/// One request observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub locale: String,
    pub context: String,
    pub keys: Vec<String>,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Simulated latency of every request
    delay: Option<Duration>,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Requests currently awaiting their answer
    in_flight: Arc<AtomicUsize>,
    /// Highest value `in_flight` reached
    peak_in_flight: Arc<AtomicUsize>,
    /// Every request received, in arrival order
    calls: Arc<Mutex<Vec<MockCall>>>,
    /// Custom translation generator (optional)
    custom_response: Option<fn(&str, &PromptContext) -> String>,
}

struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails its first `failures` requests
    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    /// Create a mock that omits every `drop_every`th key
    pub fn partial(drop_every: usize) -> Self {
        Self::new(MockBehavior::Partial { drop_every: drop_every.max(1) })
    }

    /// Create a mock that translates every key to the empty string
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Delay every answer, keeping requests in flight for a while
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay = Some(Duration::from_millis(delay_ms));
        self
    }

    /// Set a custom translation generator
    pub fn with_custom_response(mut self, generator: fn(&str, &PromptContext) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Translation produced for a key when no custom generator is set
    pub fn default_translation(key: &str, prompt: &PromptContext) -> String {
        format!("[{}] {}", prompt.locale, key)
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of requests that were awaiting an answer at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Requests received so far, in arrival order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    fn translate(&self, key: &str, prompt: &PromptContext) -> String {
        match self.custom_response {
            Some(generator) => generator(key, prompt),
            None => Self::default_translation(key, prompt),
        }
    }

    fn answer(&self, schema: &BatchSchema, prompt: &PromptContext) -> HashMap<String, String> {
        schema
            .keys()
            .iter()
            .map(|key| (key.clone(), self.translate(key, prompt)))
            .collect()
    }
}

#[async_trait]
impl BatchProvider for MockProvider {
    async fn translate_batch(
        &self,
        schema: &BatchSchema,
        prompt: &PromptContext,
    ) -> Result<HashMap<String, String>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(MockCall {
            locale: prompt.locale.clone(),
            context: prompt.context.clone(),
            keys: schema.keys().to_vec(),
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlightGuard(Arc::clone(&self.in_flight));
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.answer(schema, prompt)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 500,
                        message: format!("Simulated intermittent failure on request {}", count + 1),
                    })
                } else {
                    Ok(self.answer(schema, prompt))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),

            MockBehavior::FailFirst { failures } => {
                if count < failures {
                    Err(ProviderError::RateLimitExceeded(format!(
                        "Simulated rate limit on request {}",
                        count + 1
                    )))
                } else {
                    Ok(self.answer(schema, prompt))
                }
            }

            MockBehavior::Partial { drop_every } => Ok(schema
                .keys()
                .iter()
                .enumerate()
                .filter(|(position, _)| position % drop_every != drop_every - 1)
                .map(|(_, key)| (key.clone(), self.translate(key, prompt)))
                .collect()),

            MockBehavior::Empty => Ok(schema.keys().iter().map(|key| (key.clone(), String::new())).collect()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
