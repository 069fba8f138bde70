/*!
 * Task scheduling.
 *
 * Tasks are futures polled within the caller's own task; nothing is spawned.
 * Two policies bound the number of tasks in flight:
 *
 * - `Windowed`: fixed windows of `concurrency` tasks, each window fully
 *   settled before the next one starts
 * - `Sliding`: a new task starts as soon as any in-flight task settles
 */

use std::num::NonZeroUsize;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::executor::{TaskExecutor, TaskOutcome};
use super::run::RunContext;
use super::task::TranslationTask;
use crate::providers::BatchProvider;

/// Scheduling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulingMode {
    /// Barrier between fixed windows of tasks
    #[default]
    Windowed,
    /// Sliding window of in-flight tasks
    Sliding,
}

/// Flatten the planned batches of a run into tasks.
///
/// Order: pairs in registration order, contexts in catalog order, batches by
/// index.
pub fn flatten_tasks(run: &RunContext) -> Vec<TranslationTask> {
    run.pairs()
        .flat_map(|registered| {
            registered.plan.contexts.iter().flat_map(move |context_plan| {
                context_plan.batches.iter().map(move |batch| {
                    TranslationTask::new(
                        registered.pair.clone(),
                        registered.locale.clone(),
                        context_plan.context.clone(),
                        batch,
                    )
                })
            })
        })
        .collect()
}

/// Runs tasks through an executor under a concurrency bound
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    mode: SchedulingMode,
    concurrency: NonZeroUsize,
}

impl Scheduler {
    pub fn new(mode: SchedulingMode, concurrency: NonZeroUsize) -> Self {
        Self { mode, concurrency }
    }

    /// Execute every task, reporting each outcome with the task's index.
    ///
    /// `on_settled` runs on the caller's task between polls, so it may
    /// mutate state that the tasks themselves never touch.
    pub async fn run<P, F>(&self, executor: &TaskExecutor<'_, P>, tasks: &[TranslationTask], on_settled: F)
    where
        P: BatchProvider,
        F: FnMut(usize, TaskOutcome),
    {
        debug!(
            "Scheduling {} task(s), {:?} mode, concurrency {}",
            tasks.len(),
            self.mode,
            self.concurrency
        );
        match self.mode {
            SchedulingMode::Windowed => self.run_windowed(executor, tasks, on_settled).await,
            SchedulingMode::Sliding => self.run_sliding(executor, tasks, on_settled).await,
        }
    }

    async fn run_windowed<P, F>(&self, executor: &TaskExecutor<'_, P>, tasks: &[TranslationTask], mut on_settled: F)
    where
        P: BatchProvider,
        F: FnMut(usize, TaskOutcome),
    {
        let window_size = self.concurrency.get();
        for (window_index, window) in tasks.chunks(window_size).enumerate() {
            let outcomes = join_all(window.iter().map(|task| executor.execute(task))).await;
            let first = window_index * window_size;
            for (offset, outcome) in outcomes.into_iter().enumerate() {
                on_settled(first + offset, outcome);
            }
        }
    }

    async fn run_sliding<P, F>(&self, executor: &TaskExecutor<'_, P>, tasks: &[TranslationTask], mut on_settled: F)
    where
        P: BatchProvider,
        F: FnMut(usize, TaskOutcome),
    {
        let mut outcomes = stream::iter(tasks.iter().enumerate())
            .map(|(index, task)| async move { (index, executor.execute(task).await) })
            .buffer_unordered(self.concurrency.get());

        while let Some((index, outcome)) = outcomes.next().await {
            on_settled(index, outcome);
        }
    }
}
