/*!
 * End-to-end translation pipeline.
 *
 * `prepare` synchronizes every registered target with its source, extracts
 * the backlog and plans batches. `execute` flattens the plan into tasks, runs
 * them through the scheduler and merges each successful outcome into its
 * target as soon as it settles.
 */

use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::{Result, anyhow};
use log::{error, info};
use uuid::Uuid;

use super::executor::{PartialResponsePolicy, RetryPolicy, TaskExecutor, TaskOutcome};
use super::merger::merge_outcome;
use super::planner::plan_batches;
use super::prompts::PromptTemplate;
use super::run::RunContext;
use super::scheduler::{Scheduler, SchedulingMode, flatten_tasks};
use super::task::TranslationTask;
use crate::app_config::EngineConfig;
use crate::catalog::{extract_backlog, synchronize_with_report};
use crate::providers::BatchProvider;

/// Validated engine parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Maximum keys per batch
    pub batch_size: NonZeroUsize,
    /// Maximum tasks in flight
    pub concurrency: NonZeroUsize,
    pub retry: RetryPolicy,
    pub scheduling: SchedulingMode,
    pub partial_responses: PartialResponsePolicy,
}

impl EngineSettings {
    /// Build settings from configuration, rejecting zero sizes
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            batch_size: NonZeroUsize::new(config.batch_size).ok_or_else(|| anyhow!("batch_size must be at least 1"))?,
            concurrency: NonZeroUsize::new(config.language_concurrency)
                .ok_or_else(|| anyhow!("language_concurrency must be at least 1"))?,
            retry: RetryPolicy::new(config.max_retries, Duration::from_millis(config.retry_delay_ms)),
            scheduling: config.scheduling,
            partial_responses: config.partial_responses,
        })
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(20).unwrap_or(NonZeroUsize::MIN),
            concurrency: NonZeroUsize::new(4).unwrap_or(NonZeroUsize::MIN),
            retry: RetryPolicy::default(),
            scheduling: SchedulingMode::default(),
            partial_responses: PartialResponsePolicy::default(),
        }
    }
}

/// A task that exhausted its attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: String,
    pub error: String,
    pub attempts: u32,
}

/// Tally of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Tasks scheduled
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Entries that received a translation
    pub keys_written: usize,
    /// Requested keys left pending by successful but partial answers
    pub keys_missing: usize,
    pub failures: Vec<TaskFailure>,
}

impl RunSummary {
    pub fn new(run_id: Uuid, total: usize) -> Self {
        Self {
            run_id,
            total,
            succeeded: 0,
            failed: 0,
            keys_written: 0,
            keys_missing: 0,
            failures: Vec::new(),
        }
    }

    /// True when every task succeeded
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {}: {} task(s), {} succeeded, {} failed, {} key(s) written",
            self.run_id, self.total, self.succeeded, self.failed, self.keys_written
        )?;
        if self.keys_missing > 0 {
            write!(f, ", {} key(s) left pending by partial answers", self.keys_missing)?;
        }
        Ok(())
    }
}

/// Synchronize every registered target with its source and plan its batches.
///
/// Needs no provider, so it also serves dry runs. Returns the number of
/// tasks planned.
pub fn prepare_run(run: &mut RunContext, batch_size: NonZeroUsize) -> usize {
    for registered in run.pairs_mut() {
        registered.sync = synchronize_with_report(&registered.source, &mut registered.target);
        let backlog = extract_backlog(&registered.target);
        registered.plan = plan_batches(&backlog, batch_size);

        info!(
            "{} [{}]: {} new entr(ies), {} pending key(s) in {} batch(es)",
            registered.pair.target.display(),
            registered.locale,
            registered.sync.added,
            backlog.total(),
            registered.plan.batch_count()
        );
    }
    run.task_count()
}

/// Synchronizes, plans, schedules and merges
pub struct Engine<P: BatchProvider> {
    provider: P,
    settings: EngineSettings,
    template: PromptTemplate,
}

impl<P: BatchProvider> Engine<P> {
    pub fn new(provider: P, settings: EngineSettings) -> Self {
        Self {
            provider,
            settings,
            template: PromptTemplate::default(),
        }
    }

    /// Use a custom system prompt template
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Synchronize every registered target and plan its batches.
    ///
    /// Returns the number of tasks planned.
    pub fn prepare(&self, run: &mut RunContext) -> usize {
        prepare_run(run, self.settings.batch_size)
    }

    /// Execute the planned tasks of a prepared run
    pub async fn execute(&self, run: &mut RunContext) -> RunSummary {
        self.execute_with_progress(run, |_, _| {}).await
    }

    /// Execute the planned tasks, calling `progress` as each task settles
    pub async fn execute_with_progress<F>(&self, run: &mut RunContext, mut progress: F) -> RunSummary
    where
        F: FnMut(&TranslationTask, &TaskOutcome),
    {
        let tasks = flatten_tasks(run);
        let mut summary = RunSummary::new(run.id(), tasks.len());
        if tasks.is_empty() {
            info!("Run {}: nothing to translate", run.id());
            return summary;
        }

        info!(
            "Run {}: {} task(s) via {} ({:?}, concurrency {})",
            run.id(),
            tasks.len(),
            self.provider.name(),
            self.settings.scheduling,
            self.settings.concurrency
        );

        let executor = TaskExecutor::new(
            &self.provider,
            self.settings.retry,
            self.settings.partial_responses,
            &self.template,
        );
        let scheduler = Scheduler::new(self.settings.scheduling, self.settings.concurrency);

        scheduler
            .run(&executor, &tasks, |index, outcome| {
                let task = &tasks[index];
                match &outcome {
                    TaskOutcome::Succeeded {
                        translations, missing, ..
                    } => match run.get_mut(&task.pair) {
                        Some(registered) => {
                            let report = merge_outcome(&mut registered.target, &task.context, translations, task.keys());
                            registered.keys_written += report.written;
                            summary.succeeded += 1;
                            summary.keys_written += report.written;
                            summary.keys_missing += missing.len();
                        }
                        None => {
                            error!("{}: target catalog is not registered in this run", task.label());
                            summary.failed += 1;
                        }
                    },
                    TaskOutcome::Failed { error, attempts } => {
                        summary.failed += 1;
                        summary.failures.push(TaskFailure {
                            task: task.label(),
                            error: error.clone(),
                            attempts: *attempts,
                        });
                    }
                }
                progress(task, &outcome);
            })
            .await;

        info!("Completed {}", summary);
        summary
    }

    /// Prepare and execute a run
    pub async fn run(&self, run: &mut RunContext) -> RunSummary {
        self.prepare(run);
        self.execute(run).await
    }
}
