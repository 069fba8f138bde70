use log::debug;
use std::path::{Path, PathBuf};

use crate::app_config::FileMapping;
use crate::language_utils::locales_match;
use crate::translation::task::CatalogPair;

// @module: File and directory utilities

/// Placeholder replaced by a locale tag in path templates
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

// @struct: One target catalog to keep in sync with a source catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub pair: CatalogPair,
    pub locale: String,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @expands: `{locale}` in a path template
    pub fn expand_template(template: &str, locale: &str) -> PathBuf {
        PathBuf::from(template.replace(LOCALE_PLACEHOLDER, locale))
    }

    // @resolves: Every (source, target) pair for the configured locales
    // @params: base_dir, source_locale, locales, mappings
    //
    // Relative templates are resolved against `base_dir`. The source locale
    // is never a target, and a target that would overwrite its own source is
    // skipped. Pairs come out in mapping order, then locale order.
    pub fn resolve_targets(
        base_dir: &Path,
        source_locale: &str,
        locales: &[String],
        mappings: &[FileMapping],
    ) -> Vec<ResolvedTarget> {
        let mut targets: Vec<ResolvedTarget> = Vec::new();

        for mapping in mappings {
            let source = base_dir.join(Self::expand_template(&mapping.source, source_locale));

            for locale in locales {
                if locales_match(locale, source_locale) {
                    debug!("Skipping source locale {} for {}", locale, source.display());
                    continue;
                }

                let target = base_dir.join(Self::expand_template(&mapping.target, locale));
                if target == source {
                    debug!("Skipping {}: target path equals source path", locale);
                    continue;
                }
                if targets.iter().any(|existing| existing.pair.target == target) {
                    debug!("Skipping duplicate target {}", target.display());
                    continue;
                }

                targets.push(ResolvedTarget {
                    pair: CatalogPair::new(source.clone(), target),
                    locale: locale.clone(),
                });
            }
        }

        targets
    }
}
