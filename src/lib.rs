/*!
 * # posync - gettext catalog synchronization with AI translation
 *
 * A Rust library that keeps localized gettext catalogs in step with a source
 * catalog and fills in their missing translations through an LLM provider.
 *
 * ## Features
 *
 * - Synchronize target catalogs with their source, context by context
 * - Extract the backlog of pending messages
 * - Split the backlog into bounded batches, each with its own response schema
 * - Translate batches using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API and LM Studio
 *   - Anthropic API
 * - Windowed or sliding concurrency, fixed-delay retries
 * - Merge results without touching keys a provider did not return
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `catalog`: catalog model, PO codec, synchronizer and backlog extractor
 * - `translation`: batch planning, scheduling, execution and merging
 * - `providers`: client implementations for various LLM providers
 * - `app_config`: configuration management
 * - `app_controller`: main application controller
 * - `file_utils`: path templates and file system helpers
 * - `language_utils`: locale tag utilities
 * - `errors`: custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod catalog;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use catalog::{Catalog, Entry, TranslationStatus, extract_backlog, synchronize};
pub use errors::{CatalogError, ProviderError};
pub use language_utils::{locale_display_name, validate_locale};
pub use providers::BatchProvider;
pub use translation::{Engine, EngineSettings, RunContext, RunSummary};
