/*!
 * Batch planning.
 *
 * Splits a backlog into fixed-capacity, order-preserving batches per context
 * and attaches to each batch the schema its provider response must satisfy.
 */

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;

use serde_json::{Map, Value, json};

use crate::catalog::Backlog;
use crate::errors::ProviderError;

/// Response contract for one batch: every key maps to a required string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSchema {
    keys: Vec<String>,
}

impl BatchSchema {
    pub fn for_keys(keys: &[String]) -> Self {
        Self { keys: keys.to_vec() }
    }

    /// Requested keys in batch order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// JSON Schema object handed to structured-output capable providers
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .keys
            .iter()
            .map(|key| (key.clone(), json!({ "type": "string" })))
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.keys,
            "additionalProperties": false,
        })
    }

    /// Check a provider response against the schema.
    ///
    /// The response must be a JSON object and every requested key it carries
    /// must hold a string. Keys that were not requested are dropped so that a
    /// task can never write outside its own batch. Requested keys that are
    /// absent are not an error here; see [`BatchSchema::missing_keys`].
    pub fn validate(&self, response: &Value) -> Result<HashMap<String, String>, ProviderError> {
        let object = response.as_object().ok_or_else(|| {
            ProviderError::SchemaViolation(format!("expected a JSON object, got {}", kind_of(response)))
        })?;

        let mut translations = HashMap::with_capacity(self.keys.len());
        for key in &self.keys {
            match object.get(key) {
                Some(Value::String(text)) => {
                    translations.insert(key.clone(), text.clone());
                }
                Some(other) => {
                    return Err(ProviderError::SchemaViolation(format!(
                        "value for {:?} must be a string, got {}",
                        key,
                        kind_of(other)
                    )));
                }
                None => {}
            }
        }
        Ok(translations)
    }

    /// Requested keys that a response did not cover, in batch order
    pub fn missing_keys(&self, translations: &HashMap<String, String>) -> Vec<String> {
        self.keys
            .iter()
            .filter(|key| !translations.contains_key(*key))
            .cloned()
            .collect()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One bounded slice of a context backlog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Position of the batch within its context, from zero
    pub index: usize,
    pub schema: BatchSchema,
}

impl Batch {
    pub fn keys(&self) -> &[String] {
        self.schema.keys()
    }
}

/// Batches planned for one context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPlan {
    pub context: String,
    pub batches: Vec<Batch>,
}

/// Batches planned for every context of one target catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub contexts: Vec<ContextPlan>,
}

impl Plan {
    pub fn batch_count(&self) -> usize {
        self.contexts.iter().map(|plan| plan.batches.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batch_count() == 0
    }
}

/// Chunk one context's keys into consecutive batches of at most `batch_size`
pub fn plan_context(keys: &[String], batch_size: NonZeroUsize) -> Vec<Batch> {
    keys.chunks(batch_size.get())
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            schema: BatchSchema::for_keys(chunk),
        })
        .collect()
}

/// Plan batches for every context of a backlog
pub fn plan_batches(backlog: &Backlog, batch_size: NonZeroUsize) -> Plan {
    let contexts = backlog
        .contexts()
        .map(|context| ContextPlan {
            context: context.context.clone(),
            batches: plan_context(&context.keys, batch_size),
        })
        .collect();
    Plan { contexts }
}

/// True when `batches` partition `keys` exactly, in order
pub fn is_exact_partition(keys: &[String], batches: &[Batch]) -> bool {
    let flattened: Vec<&String> = batches.iter().flat_map(|batch| batch.keys()).collect();
    let unique: HashSet<&String> = flattened.iter().copied().collect();
    unique.len() == flattened.len() && flattened.into_iter().eq(keys.iter())
}
