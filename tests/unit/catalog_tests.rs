/*!
 * Tests for the catalog model, synchronizer and backlog extractor
 */

use std::num::NonZeroUsize;

use crate::common;
use posync::catalog::{
    Catalog, DEFAULT_CONTEXT, Entry, EntryMetadata, HEADER_KEY, extract_backlog, parse_catalog, serialize_catalog,
    synchronize, synchronize_with_report,
};
use posync::translation::planner::{is_exact_partition, plan_batches};

fn source_catalog() -> Catalog {
    let mut source = common::catalog_with_keys("en", &["hello", "bye"]);
    source.insert("menu", Entry::pending("Open", EntryMetadata::default()));
    source.insert(
        "menu",
        Entry::new(
            "%d file",
            vec![String::new(), String::new()],
            EntryMetadata {
                plural_key: Some("%d files".to_string()),
                ..EntryMetadata::default()
            },
        ),
    );
    source
}

fn all_keys(catalog: &Catalog) -> Vec<(String, String)> {
    catalog
        .contexts()
        .flat_map(|context| context.keys().map(move |key| (context.name().to_string(), key.to_string())))
        .collect()
}

#[test]
fn test_synchronize_withVariousTargets_shouldProduceSuperset() {
    let source = source_catalog();
    let targets = vec![
        Catalog::new(),
        common::catalog_with_keys("fr", &["bye", "legacy"]),
        {
            let mut target = common::catalog_with_keys("fr", &[]);
            target.insert("other", Entry::pending("Close", EntryMetadata::default()));
            target
        },
    ];

    for mut target in targets {
        let before = all_keys(&target);
        synchronize(&source, &mut target);
        let after = all_keys(&target);

        for key in all_keys(&source) {
            assert!(after.contains(&key), "missing {:?}", key);
        }
        for key in before {
            assert!(after.contains(&key), "dropped {:?}", key);
        }
    }
}

#[test]
fn test_synchronize_workedExample_shouldCopyHeaderAndQueueKeys() {
    let mut source = Catalog::new();
    source.set_header("Language: en\n");
    for key in ["hello", "bye"] {
        source.insert(DEFAULT_CONTEXT, Entry::pending(key, EntryMetadata::default()));
    }
    let mut target = Catalog::new();

    let report = synchronize_with_report(&source, &mut target);

    assert_eq!(report.added, 3);
    assert_eq!(target.entry(DEFAULT_CONTEXT, HEADER_KEY).unwrap().text(), "Language: en\n");
    assert!(target.entry(DEFAULT_CONTEXT, "hello").unwrap().is_normalized_pending());

    let backlog = extract_backlog(&target);
    assert_eq!(
        backlog.get(DEFAULT_CONTEXT),
        Some(&["hello".to_string(), "bye".to_string()][..])
    );

    let plan = plan_batches(&backlog, NonZeroUsize::MIN);
    assert_eq!(plan.batch_count(), 2);
    assert_eq!(plan.contexts[0].batches[0].keys(), &["hello".to_string()]);
    assert_eq!(plan.contexts[0].batches[1].keys(), &["bye".to_string()]);
}

#[test]
fn test_synchronize_twice_shouldReportNoChange() {
    let source = source_catalog();
    let mut target = Catalog::new();

    assert!(synchronize_with_report(&source, &mut target).changed());
    let snapshot = target.clone();
    assert!(!synchronize_with_report(&source, &mut target).changed());
    assert_eq!(target, snapshot);
}

#[test]
fn test_backlog_shouldSkipPluralsAndFollowContextOrder() {
    let mut target = Catalog::new();
    synchronize(&source_catalog(), &mut target);

    let backlog = extract_backlog(&target);
    let contexts: Vec<&str> = backlog.contexts().map(|c| c.context.as_str()).collect();
    assert_eq!(contexts, vec![DEFAULT_CONTEXT, "menu"]);
    assert_eq!(backlog.get("menu"), Some(&["Open".to_string()][..]));
    assert_eq!(backlog.total(), 3);
}

#[test]
fn test_planBatches_overBacklog_shouldPartitionEveryContext() {
    let keys: Vec<String> = (0..23).map(|i| format!("message {}", i)).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let target = common::catalog_with_keys("de", &key_refs);
    let backlog = extract_backlog(&target);

    for batch_size in [1, 4, 5, 23, 50] {
        let plan = plan_batches(&backlog, NonZeroUsize::new(batch_size).unwrap());
        let context = &plan.contexts[0];
        assert_eq!(context.batches.len(), keys.len().div_ceil(batch_size));
        assert!(is_exact_partition(&keys, &context.batches));
    }
}

#[test]
fn test_poCodec_roundTrip_shouldKeepPluralsAndContexts() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "en.po", common::SOURCE_PO).unwrap();

    let mut catalog = parse_catalog(&path).unwrap();
    catalog.insert(
        "menu",
        Entry::new(
            "%d file",
            vec!["%d fichier".to_string(), "%d fichiers".to_string()],
            EntryMetadata {
                plural_key: Some("%d files".to_string()),
                ..EntryMetadata::default()
            },
        ),
    );
    catalog.entry_mut("menu", "Open").unwrap().set_translation("Ouvrir");

    let out = dir.path().join("out").join("fr.po");
    serialize_catalog(&catalog, &out).unwrap();
    let reloaded = parse_catalog(&out).unwrap();

    assert_eq!(reloaded.entry("menu", "Open").unwrap().text(), "Ouvrir");
    let plural = reloaded.entry("menu", "%d file").unwrap();
    assert!(plural.is_plural());
    assert_eq!(plural.forms().len(), 2);
    assert!(reloaded.entry(DEFAULT_CONTEXT, "hello").unwrap().is_pending());
    assert_eq!(reloaded.language(), Some("en"));
}
