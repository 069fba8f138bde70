/*!
 * Prompt construction for batch translation.
 *
 * A `PromptContext` is built once per task and handed to the provider
 * together with the batch schema.
 */

pub mod templates;

pub use templates::{PromptTemplate, render_batch_request};

use crate::language_utils::locale_display_name;

/// Everything a provider needs besides the batch itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    /// Target locale tag, e.g. `pt-BR`
    pub locale: String,
    /// Human-readable target language, e.g. `Portuguese (BR)`
    pub language_name: String,
    /// Message context shared by every key of the batch
    pub context: String,
    /// Rendered system instruction
    pub instruction: String,
}

impl PromptContext {
    pub fn new(locale: &str, context: &str) -> Self {
        Self::with_template(&PromptTemplate::default(), locale, context)
    }

    pub fn with_template(template: &PromptTemplate, locale: &str, context: &str) -> Self {
        let language_name = locale_display_name(locale);
        let instruction = template.render(&language_name, locale, context);
        Self {
            locale: locale.to_string(),
            language_name,
            context: context.to_string(),
            instruction,
        }
    }
}
