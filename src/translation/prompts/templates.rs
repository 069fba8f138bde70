/*!
 * Prompt templates for batch catalog translation.
 *
 * The system prompt carries the fixed translation instruction; the user
 * message carries the batch itself as a JSON object so that the model can
 * answer with the same keys.
 */

use serde_json::{Map, Value};

use crate::translation::planner::BatchSchema;

/// System prompt template for catalog translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Instruction sent with every batch
    pub const BATCH_TRANSLATOR: &'static str = r#"You are a professional software localizer translating user interface messages into {target_language} ({locale}).

## Rules
- Translate literally; do not paraphrase, summarize or add commentary
- Preserve every placeholder exactly as written (%s, %d, %1$s, {name}, {{count}}, $VAR)
- Preserve markup, HTML tags, escape sequences and leading or trailing whitespace
- Keep the same punctuation style as the original message
{context_rule}
## Output Requirements
- Return ONLY a JSON object
- Use every key of the input object unchanged as a key of the output object
- Each value must be the {target_language} translation of its key
- Do not include any text outside the JSON object"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default batch translator template.
    pub fn batch_translator() -> Self {
        Self::new(Self::BATCH_TRANSLATOR)
    }

    /// Render the template for a target language and message context
    pub fn render(&self, target_language: &str, locale: &str, context: &str) -> String {
        let context_rule = if context.is_empty() {
            String::new()
        } else {
            format!("- All messages belong to the \"{}\" context; use it to disambiguate\n", context)
        };
        self.template
            .replace("{target_language}", target_language)
            .replace("{locale}", locale)
            .replace("{context_rule}", &context_rule)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::batch_translator()
    }
}

/// Render the user message for one batch: a JSON object mapping every
/// requested key to its source text.
pub fn render_batch_request(schema: &BatchSchema) -> String {
    let object: Map<String, Value> = schema
        .keys()
        .iter()
        .map(|key| (key.clone(), Value::String(key.clone())))
        .collect();
    // Serializing a map of strings cannot fail
    serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_default()
}
