/*!
 * Integration tests for application lifecycle
 *
 * The controller runs over real PO files in a temporary directory, with a
 * mock provider standing in for the network.
 */

use anyhow::Result;
use std::path::Path;

use crate::common;
use posync::app_config::Config;
use posync::app_controller::Controller;
use posync::catalog::{DEFAULT_CONTEXT, extract_backlog, parse_catalog};
use posync::providers::mock::MockProvider;

fn project(dir: &Path, config: Config) -> Result<Controller> {
    common::create_test_file(dir, "en.po", common::SOURCE_PO)?;
    common::create_test_file(dir, "fr.po", common::PARTIAL_FR_PO)?;
    Ok(Controller::with_config(config)?.with_base_dir(dir))
}

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config().source_locale, "en");
    assert_eq!(controller.base_dir(), Path::new("."));
    Ok(())
}

#[tokio::test]
async fn test_controller_run_shouldSyncTranslateAndWriteCatalogs() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let controller = project(temp_dir.path(), common::test_config(&["fr", "de"]))?;

    let summary = controller.run_with_provider(MockProvider::working()).await?;
    assert!(summary.is_complete());
    // fr: bye, Open, Save %s in two contexts; de: all four keys in two contexts
    assert_eq!(summary.total, 4);
    assert_eq!(summary.keys_written, 7);

    let fr = parse_catalog(&temp_dir.path().join("fr.po"))?;
    assert_eq!(fr.entry(DEFAULT_CONTEXT, "hello").unwrap().text(), "salut");
    assert_eq!(fr.entry(DEFAULT_CONTEXT, "bye").unwrap().text(), "[fr] bye");
    assert_eq!(fr.entry(DEFAULT_CONTEXT, "obsolete").unwrap().text(), "obsolète");
    assert_eq!(fr.entry("menu", "Save %s").unwrap().text(), "[fr] Save %s");
    assert_eq!(fr.language(), Some("fr"));

    let de = parse_catalog(&temp_dir.path().join("de.po"))?;
    assert_eq!(de.language(), Some("de"));
    assert_eq!(de.entry("menu", "Open").unwrap().text(), "[de] Open");
    assert!(extract_backlog(&de).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_controller_secondRun_shouldHaveNothingToDo() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = project(temp_dir.path(), common::test_config(&["fr"]))?;
    controller.run_with_provider(MockProvider::working()).await?;

    let provider = MockProvider::working();
    let summary = controller.run_with_provider(provider.clone()).await?;

    assert_eq!(summary.total, 0);
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_controller_withoutCreateMissingTargets_shouldSkipMissingCatalogs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(&["fr", "de"]);
    config.create_missing_targets = false;
    let controller = project(temp_dir.path(), config)?;

    let summary = controller.run_with_provider(MockProvider::working()).await?;

    assert_eq!(summary.total, 2);
    assert!(!temp_dir.path().join("de.po").exists());
    Ok(())
}

#[test]
fn test_controller_withMissingSource_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(&["fr"]))?.with_base_dir(temp_dir.path());

    let result = tokio_test::block_on(controller.run_with_provider(MockProvider::working()));
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("Failed to load source catalog"));
    assert!(message.contains("not found"));
    Ok(())
}

#[tokio::test]
async fn test_controller_withFailingProvider_shouldStillWriteSynchronizedEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(&["fr"]);
    config.engine.max_retries = 1;
    let controller = project(temp_dir.path(), config)?;

    let provider = MockProvider::failing();
    let summary = controller.run_with_provider(provider.clone()).await?;

    assert_eq!(summary.failed, 2);
    assert_eq!(provider.request_count(), 4);

    let fr = parse_catalog(&temp_dir.path().join("fr.po"))?;
    assert!(fr.entry(DEFAULT_CONTEXT, "bye").unwrap().is_pending());
    assert!(fr.entry("menu", "Open").unwrap().is_pending());
    assert_eq!(extract_backlog(&fr).total(), 3);
    Ok(())
}

#[test]
fn test_controller_plan_shouldReportWithoutWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(&["fr", "de"]);
    config.engine.batch_size = 1;
    let controller = project(temp_dir.path(), config)?;
    let before = std::fs::read_to_string(temp_dir.path().join("fr.po"))?;

    let planned = controller.plan()?;

    assert_eq!(planned.len(), 2);
    assert_eq!(planned[0].locale, "fr");
    assert_eq!(planned[0].pending, 3);
    assert_eq!(planned[0].batches, 3);
    assert_eq!(planned[1].locale, "de");
    assert_eq!(planned[1].pending, 4);
    assert_eq!(std::fs::read_to_string(temp_dir.path().join("fr.po"))?, before);
    assert!(!temp_dir.path().join("de.po").exists());
    Ok(())
}
