/*!
 * Result merging: writes a successful task outcome into its target catalog.
 */

use std::collections::HashMap;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::Catalog;

/// printf-style (`%s`, `%1$d`, `%.2f`), brace (`{name}`, `{0}`, `{{count}}`)
/// and shell-style (`$NAME`, `${name}`) placeholders
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(?:\d+\$)?[-+ #0]*\d*(?:\.\d+)?[sdifuxXoeEgGcp@]|\{\{\s*[\w.]+\s*\}\}|\{[\w.]*\}|\$\{\w+\}|\$[A-Z_][A-Z0-9_]*")
        .expect("placeholder pattern is valid")
});

/// What a merge wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Entries that received a translation
    pub written: usize,
    /// Returned keys with no entry in the target context
    pub ignored: Vec<String>,
    /// Expected keys the result did not cover; they stay pending
    pub missing: Vec<String>,
}

/// Placeholders of `text`, in order of appearance
pub fn placeholders(text: &str) -> Vec<&str> {
    PLACEHOLDER_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}

/// Placeholders of `source` that `translation` does not contain
pub fn missing_placeholders<'a>(source: &'a str, translation: &str) -> Vec<&'a str> {
    let mut available: HashMap<&str, usize> = HashMap::new();
    for placeholder in placeholders(translation) {
        *available.entry(placeholder).or_default() += 1;
    }

    placeholders(source)
        .into_iter()
        .filter(|placeholder| match available.get_mut(placeholder) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .collect()
}

/// Write translations into one context of a target catalog.
///
/// Only keys present in `translations` are touched; each is set to its
/// trimmed value and marked translated, the empty string included. Keys with
/// no entry in the context, and the header key, are ignored.
pub fn merge_outcome(
    catalog: &mut Catalog,
    context: &str,
    translations: &HashMap<String, String>,
    expected_keys: &[String],
) -> MergeReport {
    let mut report = MergeReport {
        missing: expected_keys
            .iter()
            .filter(|key| !translations.contains_key(*key))
            .cloned()
            .collect(),
        ..MergeReport::default()
    };

    let mut keys: Vec<&String> = translations.keys().collect();
    keys.sort_unstable();

    for key in keys {
        let entry = match catalog.entry_mut(context, key) {
            Some(entry) if !entry.is_header() => entry,
            _ => {
                report.ignored.push(key.clone());
                continue;
            }
        };

        let value = translations[key].trim();
        if !value.is_empty() {
            let dropped = missing_placeholders(key, value);
            if !dropped.is_empty() {
                warn!("Translation of {:?} lost placeholder(s) {}: {:?}", key, dropped.join(" "), value);
            }
        }

        entry.set_translation(value);
        report.written += 1;
    }

    debug!(
        "Merged context {:?}: {} written, {} ignored, {} missing",
        context,
        report.written,
        report.ignored.len(),
        report.missing.len()
    );
    report
}
