/*!
 * Tests for file utility functions
 */

use std::path::{Path, PathBuf};

use posync::app_config::FileMapping;
use posync::file_utils::{FileManager, LOCALE_PLACEHOLDER};

#[test]
fn test_expandTemplate_shouldReplaceEveryPlaceholder() {
    let template = format!("po/{0}/messages-{0}.po", LOCALE_PLACEHOLDER);
    assert_eq!(
        FileManager::expand_template(&template, "de"),
        PathBuf::from("po/de/messages-de.po")
    );
    assert_eq!(FileManager::expand_template("po/fixed.po", "de"), PathBuf::from("po/fixed.po"));
}

#[test]
fn test_resolveTargets_withSeveralMappings_shouldOrderByMappingThenLocale() {
    let locales = vec!["fr".to_string(), "de".to_string()];
    let mappings = vec![
        FileMapping {
            source: "app/en.po".to_string(),
            target: "app/{locale}.po".to_string(),
        },
        FileMapping {
            source: "docs/en.po".to_string(),
            target: "docs/{locale}.po".to_string(),
        },
    ];

    let targets = FileManager::resolve_targets(Path::new("/repo"), "en", &locales, &mappings);
    let resolved: Vec<(String, PathBuf)> = targets
        .into_iter()
        .map(|target| (target.locale, target.pair.target))
        .collect();

    assert_eq!(
        resolved,
        vec![
            ("fr".to_string(), PathBuf::from("/repo/app/fr.po")),
            ("de".to_string(), PathBuf::from("/repo/app/de.po")),
            ("fr".to_string(), PathBuf::from("/repo/docs/fr.po")),
            ("de".to_string(), PathBuf::from("/repo/docs/de.po")),
        ]
    );
}

#[test]
fn test_resolveTargets_withDuplicateLocale_shouldKeepFirst() {
    let locales = vec!["fr".to_string(), "fr".to_string()];
    let mappings = vec![FileMapping {
        source: "en.po".to_string(),
        target: "{locale}.po".to_string(),
    }];

    let targets = FileManager::resolve_targets(Path::new("."), "en", &locales, &mappings);
    assert_eq!(targets.len(), 1);
}
