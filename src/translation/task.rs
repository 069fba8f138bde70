/*!
 * Units of work handed to the scheduler.
 */

use std::fmt;
use std::path::PathBuf;

use super::planner::{Batch, BatchSchema};

/// Identity of one source → target catalog mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogPair {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl CatalogPair {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for CatalogPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source.display(), self.target.display())
    }
}

/// One batch of one context of one target catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTask {
    pub pair: CatalogPair,
    /// Target locale tag
    pub locale: String,
    pub context: String,
    pub batch_index: usize,
    pub schema: BatchSchema,
}

impl TranslationTask {
    pub fn new(pair: CatalogPair, locale: impl Into<String>, context: impl Into<String>, batch: &Batch) -> Self {
        Self {
            pair,
            locale: locale.into(),
            context: context.into(),
            batch_index: batch.index,
            schema: batch.schema.clone(),
        }
    }

    /// Keys requested by this task, in batch order
    pub fn keys(&self) -> &[String] {
        self.schema.keys()
    }

    /// Short label used in log lines
    pub fn label(&self) -> String {
        let context = if self.context.is_empty() { "<default>" } else { self.context.as_str() };
        format!(
            "{} [{}] context {} batch {}",
            self.pair.target.display(),
            self.locale,
            context,
            self.batch_index
        )
    }
}
