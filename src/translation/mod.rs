/*!
 * Batch translation of catalog backlogs using AI providers.
 *
 * This module turns synchronized catalogs into provider requests and writes
 * the answers back. It is split into several submodules:
 *
 * - `planner`: batch planning and the per-batch response schema
 * - `task`: catalog pairs and translation tasks
 * - `prompts`: prompt templates and the per-task prompt context
 * - `executor`: per-task retries and partial-response policy
 * - `scheduler`: windowed and sliding concurrency bounds
 * - `merger`: writing outcomes into target catalogs
 * - `run`: run-scoped catalog and batch tables
 * - `engine`: the end-to-end pipeline
 */

// Re-export main types for easier usage
pub use self::engine::{Engine, EngineSettings, RunSummary, TaskFailure, prepare_run};
pub use self::executor::{PartialResponsePolicy, RetryPolicy, TaskExecutor, TaskOutcome};
pub use self::merger::{MergeReport, merge_outcome};
pub use self::planner::{Batch, BatchSchema, ContextPlan, Plan, plan_batches};
pub use self::prompts::{PromptContext, PromptTemplate};
pub use self::run::{RegisteredPair, RunContext};
pub use self::scheduler::{Scheduler, SchedulingMode, flatten_tasks};
pub use self::task::{CatalogPair, TranslationTask};

// Submodules
pub mod engine;
pub mod executor;
pub mod merger;
pub mod planner;
pub mod prompts;
pub mod run;
pub mod scheduler;
pub mod task;
