/*!
 * Backlog extraction: which entries of a synchronized catalog still need a translation.
 */

use super::model::{Catalog, Entry};

/// Pending keys of one context, in the context's own order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBacklog {
    pub context: String,
    pub keys: Vec<String>,
}

/// Pending keys of a catalog, grouped by context in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backlog {
    contexts: Vec<ContextBacklog>,
}

impl Backlog {
    pub fn contexts(&self) -> std::slice::Iter<'_, ContextBacklog> {
        self.contexts.iter()
    }

    pub fn get(&self, context: &str) -> Option<&[String]> {
        self.contexts
            .iter()
            .find(|backlog| backlog.context == context)
            .map(|backlog| backlog.keys.as_slice())
    }

    /// Number of pending keys across all contexts
    pub fn total(&self) -> usize {
        self.contexts.iter().map(|backlog| backlog.keys.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl FromIterator<ContextBacklog> for Backlog {
    fn from_iter<I: IntoIterator<Item = ContextBacklog>>(iter: I) -> Self {
        Self {
            contexts: iter.into_iter().filter(|backlog| !backlog.keys.is_empty()).collect(),
        }
    }
}

fn needs_translation(entry: &Entry) -> bool {
    // Plural messages are carried through untouched
    !entry.is_header() && !entry.is_plural() && entry.is_normalized_pending()
}

/// Collect the pending, non-header keys of every context.
///
/// Contexts without pending keys are left out.
pub fn extract_backlog(catalog: &Catalog) -> Backlog {
    catalog
        .contexts()
        .map(|context| ContextBacklog {
            context: context.name().to_string(),
            keys: context
                .iter()
                .filter(|entry| needs_translation(entry))
                .map(|entry| entry.key().to_string())
                .collect(),
        })
        .collect()
}
