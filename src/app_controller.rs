use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::catalog::{Catalog, parse_catalog, serialize_catalog};
use crate::errors::CatalogError;
use crate::file_utils::FileManager;
use crate::providers::{BatchProvider, ProviderClient};
use crate::translation::{Engine, EngineSettings, RunContext, RunSummary, TaskOutcome, prepare_run};

// @module: Application controller for catalog synchronization runs

/// What a dry run found for one target catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTarget {
    pub target: PathBuf,
    pub locale: String,
    /// Entries added by synchronization
    pub added: usize,
    /// Keys awaiting translation
    pub pending: usize,
    pub batches: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Directory relative catalog paths are resolved against
    base_dir: PathBuf,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        EngineSettings::from_config(&config.engine)?;
        Ok(Self {
            config,
            base_dir: PathBuf::from("."),
        })
    }

    /// Resolve relative catalog paths against `base_dir`
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load every configured catalog pair into a fresh run.
    ///
    /// A missing source catalog is an error. A missing target is created from
    /// the source header when `create_missing_targets` is set and skipped
    /// otherwise. Returns the run and the targets that were created.
    pub fn load_run(&self) -> Result<(RunContext, HashSet<PathBuf>)> {
        let targets = FileManager::resolve_targets(
            &self.base_dir,
            &self.config.source_locale,
            &self.config.locales,
            &self.config.files,
        );
        if targets.is_empty() {
            warn!("No target catalogs resolved from the configuration");
        }

        let mut sources: HashMap<PathBuf, Catalog> = HashMap::new();
        let mut created = HashSet::new();
        let mut run = RunContext::new();

        for resolved in targets {
            let source = match sources.get(&resolved.pair.source) {
                Some(source) => source.clone(),
                None => {
                    let source = parse_catalog(&resolved.pair.source)
                        .with_context(|| format!("Failed to load source catalog {}", resolved.pair.source.display()))?;
                    sources.insert(resolved.pair.source.clone(), source.clone());
                    source
                }
            };

            let target = match parse_catalog(&resolved.pair.target) {
                Ok(target) => target,
                Err(CatalogError::NotFound(path)) if self.config.create_missing_targets => {
                    info!("Creating {} [{}]", path.display(), resolved.locale);
                    created.insert(path);
                    Self::new_target(&source, &resolved.locale)
                }
                Err(CatalogError::NotFound(path)) => {
                    warn!("Skipping {}: target catalog does not exist", path.display());
                    continue;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to load target catalog for {}", resolved.locale));
                }
            };

            debug!("Registered {} [{}]", resolved.pair, resolved.locale);
            run.register(resolved.pair, resolved.locale, source, target);
        }

        Ok((run, created))
    }

    /// Synchronize and plan without calling a provider or writing anything
    pub fn plan(&self) -> Result<Vec<PlannedTarget>> {
        let settings = EngineSettings::from_config(&self.config.engine)?;
        let (mut run, _) = self.load_run()?;
        prepare_run(&mut run, settings.batch_size);

        Ok(run
            .pairs()
            .map(|registered| PlannedTarget {
                target: registered.pair.target.clone(),
                locale: registered.locale.clone(),
                added: registered.sync.added,
                pending: registered
                    .plan
                    .contexts
                    .iter()
                    .flat_map(|context| context.batches.iter())
                    .map(|batch| batch.keys().len())
                    .sum(),
                batches: registered.plan.batch_count(),
            })
            .collect())
    }

    /// Run with the provider selected by the configuration
    pub async fn run(&self) -> Result<RunSummary> {
        let provider = ProviderClient::from_config(&self.config.translation);
        info!(
            "🚀 posync: {} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        );
        self.run_with_provider(provider).await
    }

    /// Synchronize, translate and write back every configured catalog
    pub async fn run_with_provider<P: BatchProvider>(&self, provider: P) -> Result<RunSummary> {
        let start_time = Instant::now();
        let settings = EngineSettings::from_config(&self.config.engine)?;
        let engine = Engine::new(provider, settings);

        let (mut run, created) = self.load_run()?;
        let total = engine.prepare(&mut run);

        let summary = if total == 0 {
            engine.execute(&mut run).await
        } else {
            let progress_bar = ProgressBar::new(total as u64);
            let template_result = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
                .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            progress_bar.set_style(template_result.progress_chars("█▓▒░"));
            progress_bar.set_message("Translating");

            let pb = progress_bar.clone();
            let summary = engine
                .execute_with_progress(&mut run, move |task, outcome| {
                    if let TaskOutcome::Failed { error, .. } = outcome {
                        pb.println(format!("✗ {}: {}", task.label(), error));
                    }
                    pb.set_message(task.label());
                    pb.inc(1);
                })
                .await;
            progress_bar.finish_and_clear();
            summary
        };

        let written = self.write_catalogs(&run, &created)?;
        info!(
            "Run {} finished in {}: {} catalog(s) written. {}",
            summary.run_id,
            Self::format_duration(start_time.elapsed()),
            written,
            summary
        );
        for failure in &summary.failures {
            warn!("{} failed after {} attempt(s): {}", failure.task, failure.attempts, failure.error);
        }

        Ok(summary)
    }

    /// Write back every target that changed or was created; returns the count
    pub fn write_catalogs(&self, run: &RunContext, created: &HashSet<PathBuf>) -> Result<usize> {
        let mut written = 0;
        for registered in run.pairs() {
            if !registered.is_modified() && !created.contains(&registered.pair.target) {
                debug!("{} unchanged", registered.pair.target.display());
                continue;
            }
            serialize_catalog(&registered.target, &registered.pair.target)
                .with_context(|| format!("Failed to save {}", registered.pair.target.display()))?;
            info!("Success: {}", registered.pair.target.display());
            written += 1;
        }
        Ok(written)
    }

    /// An empty target carrying the source header with its language replaced
    fn new_target(source: &Catalog, locale: &str) -> Catalog {
        let mut target = Catalog::new();
        if let Some(header) = source.header() {
            target.set_header(header.text());
        }
        target.set_language(locale);
        target
    }

    /// Directory relative catalog paths are resolved against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
