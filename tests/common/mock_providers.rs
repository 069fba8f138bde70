/*!
 * Scripted providers for end-to-end tests
 *
 * `posync::providers::mock::MockProvider` covers generic behaviors. The
 * provider here answers from a fixed dictionary and can be told to fail a
 * given batch a number of times before answering, which is what the
 * worked examples need.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use posync::errors::ProviderError;
use posync::providers::BatchProvider;
use posync::translation::{BatchSchema, PromptContext};

/// Answers from a dictionary; keys it does not know are left out of the answer
#[derive(Debug, Clone, Default)]
pub struct DictionaryProvider {
    translations: HashMap<String, String>,
    /// Remaining failures, by first key of the batch
    failures: Arc<Mutex<HashMap<String, usize>>>,
    /// Attempts seen, by first key of the batch
    attempts: Arc<Mutex<HashMap<String, usize>>>,
}

impl DictionaryProvider {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            translations: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            ..Self::default()
        }
    }

    /// Fail the batch starting with `key` the next `times` times it is requested
    pub fn failing_on(self, key: &str, times: usize) -> Self {
        self.failures.lock().insert(key.to_string(), times);
        self
    }

    /// Attempts made for the batch starting with `key`
    pub fn attempts_for(&self, key: &str) -> usize {
        self.attempts.lock().get(key).copied().unwrap_or_default()
    }
}

#[async_trait]
impl BatchProvider for DictionaryProvider {
    async fn translate_batch(
        &self,
        schema: &BatchSchema,
        _prompt: &PromptContext,
    ) -> Result<HashMap<String, String>, ProviderError> {
        let first = schema.keys().first().cloned().unwrap_or_default();
        *self.attempts.lock().entry(first.clone()).or_default() += 1;

        {
            let mut failures = self.failures.lock();
            if let Some(remaining) = failures.get_mut(&first) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ProviderError::ConnectionError(format!("scripted failure for {:?}", first)));
                }
            }
        }

        Ok(schema
            .keys()
            .iter()
            .filter_map(|key| self.translations.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    fn name(&self) -> &str {
        "dictionary"
    }
}
