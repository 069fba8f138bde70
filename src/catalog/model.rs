/*!
 * In-memory message catalog model.
 *
 * A `Catalog` is an ordered set of named `Context`s, each an ordered map of
 * message keys to `Entry` values. Insertion order is preserved everywhere so
 * that backlog extraction and batch planning are reproducible for identical
 * inputs.
 */

use std::collections::HashMap;

/// Name of the context holding messages without an explicit `msgctxt`
pub const DEFAULT_CONTEXT: &str = "";

/// Reserved key of the header entry; never translated
pub const HEADER_KEY: &str = "";

/// Translation state of an entry.
///
/// Tracked separately from the translated text so that a message explicitly
/// translated to the empty string is not mistaken for a pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationStatus {
    /// Waiting for a translation
    #[default]
    Pending,
    /// Holds a translation (possibly the empty string)
    Translated,
}

/// Structural metadata carried opaquely alongside an entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Translator and extracted comments
    pub comments: String,
    /// Source references (`path:line`)
    pub source: String,
    /// Flags such as `fuzzy` or `c-format`
    pub flags: Vec<String>,
    /// Plural msgid, when the message has plural forms
    pub plural_key: Option<String>,
}

/// One translatable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    forms: Vec<String>,
    status: TranslationStatus,
    metadata: EntryMetadata,
}

impl Entry {
    /// Create an entry, deriving its status from the forms.
    ///
    /// An entry whose forms are all empty is pending; the header entry is
    /// always considered translated.
    pub fn new(key: impl Into<String>, forms: Vec<String>, metadata: EntryMetadata) -> Self {
        let key = key.into();
        let status = if key != HEADER_KEY && forms.iter().all(|form| form.is_empty()) {
            TranslationStatus::Pending
        } else {
            TranslationStatus::Translated
        };
        Self {
            key,
            forms,
            status,
            metadata,
        }
    }

    /// Create a pending singular entry with normalized empty form
    pub fn pending(key: impl Into<String>, metadata: EntryMetadata) -> Self {
        Self {
            key: key.into(),
            forms: vec![String::new()],
            status: TranslationStatus::Pending,
            metadata,
        }
    }

    /// Create a header entry holding the raw header text
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            key: HEADER_KEY.to_string(),
            forms: vec![text.into()],
            status: TranslationStatus::Translated,
            metadata: EntryMetadata::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn forms(&self) -> &[String] {
        &self.forms
    }

    pub fn status(&self) -> TranslationStatus {
        self.status
    }

    pub fn metadata(&self) -> &EntryMetadata {
        &self.metadata
    }

    /// First translated form, or the empty string
    pub fn text(&self) -> &str {
        self.forms.first().map(String::as_str).unwrap_or_default()
    }

    pub fn is_header(&self) -> bool {
        self.key == HEADER_KEY
    }

    pub fn is_plural(&self) -> bool {
        self.metadata.plural_key.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.status == TranslationStatus::Pending
    }

    /// Pending in the normalized `[""]` representation
    pub fn is_normalized_pending(&self) -> bool {
        self.is_pending() && self.forms.len() == 1 && self.forms[0].is_empty()
    }

    /// Rewrite an empty pending form list as `[""]`.
    ///
    /// Returns `true` when the entry changed.
    pub fn normalize_pending(&mut self) -> bool {
        if self.is_pending() && self.forms.is_empty() {
            self.forms.push(String::new());
            return true;
        }
        false
    }

    /// Copy of this entry as it should be inserted into a target catalog.
    ///
    /// Metadata is cloned verbatim; non-header entries start pending.
    pub fn pending_copy(&self) -> Self {
        if self.is_header() {
            return self.clone();
        }
        Self::pending(self.key.clone(), self.metadata.clone())
    }

    /// Store a translation as the single form
    pub fn set_translation(&mut self, text: impl Into<String>) {
        self.forms = vec![text.into()];
        self.status = TranslationStatus::Translated;
    }
}

/// Ordered key → entry map for one `msgctxt`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    name: String,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert an entry, replacing any entry with the same key in place.
    ///
    /// Replacement keeps the original position; new keys are appended.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        match self.index.get(entry.key()) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position], entry)),
            None => {
                self.index.insert(entry.key().to_string(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&position| &self.entries[position])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        match self.index.get(key) {
            Some(&position) => Some(&mut self.entries[position]),
            None => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entry> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed message catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    contexts: Vec<Context>,
    index: HashMap<String, usize>,
}

/// Header text with the `name` field set to `value`.
///
/// Other lines are kept as they are; field names compare case-insensitively.
pub(crate) fn with_header_field(header: &str, name: &str, value: &str) -> String {
    let mut found = false;
    let mut lines: Vec<String> = header
        .lines()
        .map(|line| match line.split_once(':') {
            Some((field, _)) if field.trim().eq_ignore_ascii_case(name) => {
                found = true;
                format!("{}: {}", name, value)
            }
            _ => line.to_string(),
        })
        .collect();
    if !found {
        lines.push(format!("{}: {}", name, value));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.index.get(name).map(|&position| &self.contexts[position])
    }

    pub fn context_mut(&mut self, name: &str) -> Option<&mut Context> {
        match self.index.get(name) {
            Some(&position) => Some(&mut self.contexts[position]),
            None => None,
        }
    }

    /// Get the named context, appending an empty one if it does not exist
    pub fn ensure_context(&mut self, name: &str) -> &mut Context {
        let position = match self.index.get(name) {
            Some(&position) => position,
            None => {
                self.index.insert(name.to_string(), self.contexts.len());
                self.contexts.push(Context::new(name));
                self.contexts.len() - 1
            }
        };
        &mut self.contexts[position]
    }

    /// Contexts in insertion order
    pub fn contexts(&self) -> std::slice::Iter<'_, Context> {
        self.contexts.iter()
    }

    pub fn contexts_mut(&mut self) -> std::slice::IterMut<'_, Context> {
        self.contexts.iter_mut()
    }

    pub fn entry(&self, context: &str, key: &str) -> Option<&Entry> {
        self.context(context).and_then(|ctx| ctx.get(key))
    }

    pub fn entry_mut(&mut self, context: &str, key: &str) -> Option<&mut Entry> {
        self.context_mut(context).and_then(|ctx| ctx.get_mut(key))
    }

    /// Insert an entry into a context, creating the context if needed
    pub fn insert(&mut self, context: &str, entry: Entry) -> Option<Entry> {
        self.ensure_context(context).insert(entry)
    }

    pub fn header(&self) -> Option<&Entry> {
        self.entry(DEFAULT_CONTEXT, HEADER_KEY)
    }

    pub fn set_header(&mut self, text: impl Into<String>) {
        self.insert(DEFAULT_CONTEXT, Entry::header(text));
    }

    /// Value of the `Language:` header field, if any
    pub fn language(&self) -> Option<&str> {
        self.header()?
            .text()
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("language"))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Set the `Language:` header field, appending it when absent
    pub fn set_language(&mut self, locale: &str) {
        self.set_header_field("Language", locale);
    }

    /// Set a `Name: value` header field, appending it when absent
    pub fn set_header_field(&mut self, name: &str, value: &str) {
        let header = self.header().map(Entry::text).unwrap_or_default();
        let text = with_header_field(header, name, value);
        self.set_header(text);
    }

    /// Total number of entries across all contexts, header included
    pub fn len(&self) -> usize {
        self.contexts.iter().map(Context::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
