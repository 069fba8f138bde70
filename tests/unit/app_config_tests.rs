/*!
 * Tests for application configuration functionality
 */

use std::str::FromStr;

use posync::app_config::{Config, EngineConfig, LogLevel, TranslationProvider};
use posync::translation::{PartialResponsePolicy, SchedulingMode};

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_locale, "en");
    assert_eq!(config.locales, vec!["fr".to_string()]);
    assert!(config.create_missing_targets);
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.log_level, LogLevel::Info);

    assert_eq!(config.engine.batch_size, 20);
    assert_eq!(config.engine.language_concurrency, 4);
    assert_eq!(config.engine.max_retries, 3);
    assert_eq!(config.engine.retry_delay_ms, 1000);
    assert_eq!(config.engine.scheduling, SchedulingMode::Windowed);
    assert_eq!(config.engine.partial_responses, PartialResponsePolicy::Accept);

    let ollama_config = config
        .translation
        .get_provider_config(&TranslationProvider::Ollama)
        .expect("Ollama provider config should exist");
    assert_eq!(ollama_config.endpoint, "http://localhost:11434");

    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    // Invalid source locale
    config.source_locale = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_locale = "en".to_string();

    // No target locale
    config.locales.clear();
    assert!(config.validate().is_err());
    config.locales = vec!["pt-BR".to_string(), "zh_Hant".to_string()];
    assert!(config.validate().is_ok());

    // Target template without placeholder
    config.files[0].target = "locales/fr.po".to_string();
    assert!(config.validate().is_err());
    config.files[0].target = "locales/{locale}.po".to_string();

    // Zero batch size
    config.engine.batch_size = 0;
    assert!(config.validate().is_err());
    config.engine.batch_size = 1;

    // Provider that requires an API key
    config.translation.provider = TranslationProvider::OpenAI;
    assert!(config.validate().is_err());
    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());

    // Malformed endpoint
    config.translation.active_provider_config_mut().endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_fromFile_withPartialJson_shouldApplyDefaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{
            "source_locale": "en",
            "locales": ["de", "es"],
            "files": [{ "source": "po/messages.pot", "target": "po/{locale}.po" }],
            "engine": { "batch_size": 5, "scheduling": "sliding", "partial_responses": "retry" },
            "translation": { "provider": "anthropic" }
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.locales, vec!["de".to_string(), "es".to_string()]);
    assert_eq!(config.engine.batch_size, 5);
    assert_eq!(config.engine.language_concurrency, 4);
    assert_eq!(config.engine.scheduling, SchedulingMode::Sliding);
    assert_eq!(config.engine.partial_responses, PartialResponsePolicy::Retry);
    assert_eq!(config.translation.provider, TranslationProvider::Anthropic);
    assert!(config.create_missing_targets);
    assert_eq!(config.translation.get_endpoint(), "https://api.anthropic.com");
}

#[test]
fn test_config_save_thenLoad_shouldKeepValues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.locales = vec!["it".to_string()];
    config.engine = EngineConfig {
        max_retries: 7,
        ..EngineConfig::default()
    };
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.locales, config.locales);
    assert_eq!(loaded.engine, config.engine);
}

#[test]
fn test_translationProvider_fromStr_shouldBeCaseInsensitive() {
    assert_eq!(TranslationProvider::from_str("OpenAI").unwrap(), TranslationProvider::OpenAI);
    assert_eq!(TranslationProvider::from_str("lmstudio").unwrap(), TranslationProvider::LMStudio);
    assert!(TranslationProvider::from_str("gemini").is_err());
    assert_eq!(TranslationProvider::LMStudio.to_string(), "lmstudio");
    assert!(!TranslationProvider::LMStudio.requires_api_key());
}

#[test]
fn test_activeProviderConfigMut_withMissingEntry_shouldInsertDefaults() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::LMStudio;

    config.translation.active_provider_config_mut().model = "qwen2.5-7b".to_string();
    assert_eq!(config.translation.get_model(), "qwen2.5-7b");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:1234/v1");
}

#[test]
fn test_logLevel_intoLevelFilter_shouldMapEveryLevel() {
    assert_eq!(log::LevelFilter::from(&LogLevel::Error), log::LevelFilter::Error);
    assert_eq!(log::LevelFilter::from(&LogLevel::Trace), log::LevelFilter::Trace);
}
