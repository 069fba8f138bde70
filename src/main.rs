// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use posync::app_config::{Config, LogLevel, TranslationProvider};
use posync::app_controller::Controller;
use posync::translation::{PartialResponsePolicy, SchedulingMode};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for SchedulingMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliScheduling {
    Windowed,
    Sliding,
}

impl From<CliScheduling> for SchedulingMode {
    fn from(cli_mode: CliScheduling) -> Self {
        match cli_mode {
            CliScheduling::Windowed => SchedulingMode::Windowed,
            CliScheduling::Sliding => SchedulingMode::Sliding,
        }
    }
}

/// CLI Wrapper for PartialResponsePolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliPartialResponses {
    Accept,
    Retry,
}

impl From<CliPartialResponses> for PartialResponsePolicy {
    fn from(cli_policy: CliPartialResponses) -> Self {
        match cli_policy {
            CliPartialResponses::Accept => PartialResponsePolicy::Accept,
            CliPartialResponses::Retry => PartialResponsePolicy::Retry,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synchronize catalogs and translate their backlog (default command)
    #[command(alias = "translate")]
    Sync(SyncArgs),

    /// Generate shell completions for posync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct SyncArgs {
    /// Configuration file path
    #[arg(short, long, env = "POSYNC_CONFIG", default_value = "conf.json")]
    config_path: String,

    /// Directory relative catalog paths are resolved against
    #[arg(short = 'd', long)]
    base_dir: Option<PathBuf>,

    /// Target locales, overriding the configured list (e.g. 'fr,de,pt-BR')
    #[arg(short = 'L', long, value_delimiter = ',')]
    locales: Option<Vec<String>>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum number of keys per provider request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Maximum number of requests in flight
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Retries after the first failed attempt of a batch
    #[arg(short = 'r', long)]
    max_retries: Option<u32>,

    /// How batches are scheduled
    #[arg(long, value_enum)]
    scheduling: Option<CliScheduling>,

    /// What to do with responses that omit requested keys
    #[arg(long, value_enum)]
    partial_responses: Option<CliPartialResponses>,

    /// Synchronize and plan only; no provider calls, nothing written
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// posync - keep gettext catalogs in sync and translated with AI
///
/// Synchronizes every localized catalog with its source catalog, then
/// translates the pending messages in bounded, retryable batches using
/// various AI providers (Ollama, OpenAI, Anthropic, LM Studio).
#[derive(Parser, Debug)]
#[command(name = "posync")]
#[command(version)]
#[command(about = "AI-assisted gettext catalog synchronization")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "posync synchronizes gettext catalogs with their source and translates the backlog using AI providers.

EXAMPLES:
    posync                                       # Sync and translate using conf.json
    posync -n                                    # Show what would be translated
    posync -L fr,de                              # Only these target locales
    posync -p openai -m gpt-4o-mini              # Use specific provider and model
    posync -b 50 -j 8 --scheduling sliding       # Larger batches, more parallelism
    posync --log-level debug -d ./project        # Resolve paths from another directory
    posync completions bash > posync.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    sync: SyncArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // Filtering is left to log::set_max_level so the level can change after init
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "posync", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Sync(args)) => run_sync(args).await,
        None => run_sync(cli.sync).await,
    }
}

/// Load the configuration file, writing a default one when it is absent
fn load_or_create_config(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        return Config::from_file(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path.display());
    let config = Config::default();
    config.save(config_path)?;
    Ok(config)
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &SyncArgs) {
    if let Some(locales) = &options.locales {
        config.locales = locales.iter().map(|locale| locale.trim().to_string()).collect();
    }
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if let Some(batch_size) = options.batch_size {
        config.engine.batch_size = batch_size;
    }
    if let Some(concurrency) = options.concurrency {
        config.engine.language_concurrency = concurrency;
    }
    if let Some(max_retries) = options.max_retries {
        config.engine.max_retries = max_retries;
    }
    if let Some(scheduling) = &options.scheduling {
        config.engine.scheduling = scheduling.clone().into();
    }
    if let Some(policy) = &options.partial_responses {
        config.engine.partial_responses = policy.clone().into();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_sync(options: SyncArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level((&level).into());
    }

    let mut config = load_or_create_config(Path::new(&options.config_path))?;
    apply_overrides(&mut config, &options);

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;
    log::set_max_level((&config.log_level).into());

    let mut controller = Controller::with_config(config)?;
    if let Some(base_dir) = &options.base_dir {
        if !base_dir.is_dir() {
            return Err(anyhow!("Base directory does not exist: {}", base_dir.display()));
        }
        controller = controller.with_base_dir(base_dir);
    }

    if options.dry_run {
        let planned = controller.plan()?;
        if planned.is_empty() {
            info!("Nothing to synchronize");
        }
        for target in &planned {
            info!(
                "{} [{}]: +{} new, {} pending in {} batch(es)",
                target.target.display(),
                target.locale,
                target.added,
                target.pending,
                target.batches
            );
        }
        return Ok(());
    }

    let summary = controller.run().await?;
    if !summary.is_complete() {
        error!("{} of {} batch(es) failed; their keys remain pending", summary.failed, summary.total);
        return Err(anyhow!("{} batch(es) failed", summary.failed));
    }

    Ok(())
}
