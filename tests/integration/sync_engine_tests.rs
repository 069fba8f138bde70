/*!
 * Integration tests for the synchronization and translation engine.
 *
 * Catalogs are built in memory and run through `Engine` with scripted or
 * mock providers.
 */

use std::time::Duration;

use crate::common::{self, mock_providers::DictionaryProvider};
use posync::catalog::{Catalog, DEFAULT_CONTEXT, Entry, EntryMetadata, extract_backlog};
use posync::providers::mock::MockProvider;
use posync::translation::{
    CatalogPair, Engine, PartialResponsePolicy, RetryPolicy, RunContext, SchedulingMode, TaskOutcome,
};

fn pair(locale: &str) -> CatalogPair {
    CatalogPair::new("en.po", format!("{}.po", locale))
}

fn run_with(source: &Catalog, locales: &[&str]) -> RunContext {
    let mut run = RunContext::new();
    for locale in locales {
        run.register(pair(locale), *locale, source.clone(), Catalog::new());
    }
    run
}

fn many_keys(count: usize) -> Catalog {
    let keys: Vec<String> = (0..count).map(|i| format!("message {}", i)).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    common::catalog_with_keys("en", &key_refs)
}

#[tokio::test]
async fn test_engine_workedExample_shouldTranslateAfterRetries() {
    let source = common::catalog_with_keys("en", &["hello", "bye"]);
    let provider = DictionaryProvider::new(&[("hello", "bonjour"), ("bye", "au revoir")]).failing_on("bye", 2);
    let mut settings = common::fast_settings(1, 2, SchedulingMode::Windowed);
    settings.retry = RetryPolicy::new(2, Duration::ZERO);
    let engine = Engine::new(provider, settings);

    let mut run = run_with(&source, &["fr"]);
    let summary = engine.run(&mut run).await;

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 2);
    assert!(summary.is_complete());
    assert_eq!(engine.provider().attempts_for("hello"), 1);
    assert_eq!(engine.provider().attempts_for("bye"), 3);

    let target = run.catalog(&pair("fr")).unwrap();
    assert_eq!(target.entry(DEFAULT_CONTEXT, "hello").unwrap().text(), "bonjour");
    assert_eq!(target.entry(DEFAULT_CONTEXT, "bye").unwrap().text(), "au revoir");
    assert_eq!(target.language(), Some("en"));
    assert!(extract_backlog(target).is_empty());
}

#[tokio::test]
async fn test_engine_withEmptyTranslation_shouldNotRequeueKey() {
    let source = common::catalog_with_keys("en", &["hello"]);
    let engine = Engine::new(MockProvider::empty(), common::fast_settings(10, 1, SchedulingMode::Windowed));

    let mut run = run_with(&source, &["fr"]);
    let summary = engine.run(&mut run).await;
    assert_eq!(summary.keys_written, 1);

    let hello = run.catalog(&pair("fr")).unwrap().entry(DEFAULT_CONTEXT, "hello").unwrap();
    assert_eq!(hello.forms(), &[String::new()]);
    assert!(!hello.is_pending());

    // A second pass over the same run finds nothing left to do
    assert_eq!(engine.prepare(&mut run), 0);
    assert_eq!(engine.provider().request_count(), 1);
}

#[tokio::test]
async fn test_engine_inFlightBound_shouldHoldInBothModes() {
    let source = many_keys(12);

    for mode in [SchedulingMode::Windowed, SchedulingMode::Sliding] {
        for concurrency in [1, 3, 5] {
            let provider = MockProvider::working().with_delay(5);
            let engine = Engine::new(provider, common::fast_settings(2, concurrency, mode));

            let mut run = run_with(&source, &["fr", "de"]);
            let summary = engine.run(&mut run).await;

            assert_eq!(summary.total, 12);
            assert_eq!(summary.succeeded, 12);
            let peak = engine.provider().peak_in_flight();
            assert!(peak <= concurrency, "{:?}: peak {} over {}", mode, peak, concurrency);
            assert!(peak >= 1);
            assert_eq!(summary.keys_written, 24);
        }
    }
}

#[tokio::test]
async fn test_engine_withFailingProvider_shouldAttemptExactlyMaxRetriesPlusOne() {
    let source = common::catalog_with_keys("en", &["hello", "bye", "thanks"]);
    let mut settings = common::fast_settings(1, 2, SchedulingMode::Sliding);
    settings.retry = RetryPolicy::new(4, Duration::ZERO);
    let engine = Engine::new(MockProvider::failing(), settings);

    let mut run = run_with(&source, &["fr"]);
    let summary = engine.run(&mut run).await;

    assert_eq!(summary.failed, 3);
    assert_eq!(summary.succeeded, 0);
    assert!(summary.failures.iter().all(|failure| failure.attempts == 5));
    assert_eq!(engine.provider().request_count(), 15);

    // Failed keys stay pending for a later run
    let target = run.catalog(&pair("fr")).unwrap();
    assert_eq!(extract_backlog(target).total(), 3);
}

#[tokio::test]
async fn test_engine_withPartialAnswers_shouldOnlyWriteReturnedKeys() {
    let source = common::catalog_with_keys("en", &["a", "b", "c", "d"]);
    let engine = Engine::new(MockProvider::partial(2), common::fast_settings(4, 1, SchedulingMode::Windowed));

    let mut run = run_with(&source, &["fr"]);
    let summary = engine.run(&mut run).await;

    assert!(summary.is_complete());
    assert_eq!(summary.keys_written, 2);
    assert_eq!(summary.keys_missing, 2);

    let target = run.catalog(&pair("fr")).unwrap();
    let pending: Vec<&str> = ["a", "b", "c", "d"]
        .into_iter()
        .filter(|key| target.entry(DEFAULT_CONTEXT, key).unwrap().is_pending())
        .collect();
    assert_eq!(pending.len(), 2);
    assert_eq!(extract_backlog(target).total(), 2);
}

#[tokio::test]
async fn test_engine_withRetryPolicyOnPartialAnswers_shouldFailBatch() {
    let source = common::catalog_with_keys("en", &["hello", "bye"]);
    let provider = DictionaryProvider::new(&[("hello", "hallo")]);
    let mut settings = common::fast_settings(2, 1, SchedulingMode::Windowed);
    settings.retry = RetryPolicy::new(1, Duration::ZERO);
    settings.partial_responses = PartialResponsePolicy::Retry;
    let engine = Engine::new(provider, settings);

    let mut run = run_with(&source, &["de"]);
    let summary = engine.run(&mut run).await;

    assert_eq!(summary.failed, 1);
    assert!(summary.failures[0].error.contains("bye"));
    assert_eq!(engine.provider().attempts_for("hello"), 2);
    assert!(
        run.catalog(&pair("de"))
            .unwrap()
            .entry(DEFAULT_CONTEXT, "hello")
            .unwrap()
            .is_pending()
    );
}

#[tokio::test]
async fn test_engine_withContexts_shouldPromptPerContext() {
    let mut source = common::catalog_with_keys("en", &["hello"]);
    source.insert("menu", Entry::pending("Open", EntryMetadata::default()));
    source.insert("menu", Entry::pending("Close", EntryMetadata::default()));
    let engine = Engine::new(MockProvider::working(), common::fast_settings(5, 1, SchedulingMode::Windowed));

    let mut run = run_with(&source, &["pt-BR"]);
    engine.run(&mut run).await;

    let calls = engine.provider().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].context, DEFAULT_CONTEXT);
    assert_eq!(calls[1].context, "menu");
    assert_eq!(calls[1].keys, vec!["Open".to_string(), "Close".to_string()]);
    assert!(calls.iter().all(|call| call.locale == "pt-BR"));

    let target = run.catalog(&pair("pt-BR")).unwrap();
    assert_eq!(target.entry("menu", "Close").unwrap().text(), "[pt-BR] Close");
}

#[tokio::test]
async fn test_engine_progressCallback_shouldSeeEveryTask() {
    let source = many_keys(5);
    let engine = Engine::new(MockProvider::intermittent(3), common::fast_settings(1, 2, SchedulingMode::Windowed));

    let mut run = run_with(&source, &["it"]);
    engine.prepare(&mut run);

    let mut settled = Vec::new();
    let summary = engine
        .execute_with_progress(&mut run, |task, outcome| {
            settled.push((task.batch_index, matches!(outcome, TaskOutcome::Succeeded { .. })));
        })
        .await;

    assert_eq!(settled.len(), 5);
    assert!(settled.iter().all(|(_, ok)| *ok));
    assert_eq!(summary.succeeded, 5);
}

#[tokio::test]
async fn test_runContexts_shouldStayIndependent() {
    let source = common::catalog_with_keys("en", &["hello"]);
    let engine = Engine::new(MockProvider::working(), common::fast_settings(1, 1, SchedulingMode::Windowed));

    let mut first = run_with(&source, &["fr"]);
    let mut second = run_with(&source, &["fr"]);
    engine.run(&mut first).await;

    assert!(first.catalog(&pair("fr")).unwrap().entry(DEFAULT_CONTEXT, "hello").is_some());
    assert!(second.catalog(&pair("fr")).unwrap().is_empty());
    assert_eq!(engine.prepare(&mut second), 1);
}
