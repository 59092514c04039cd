//! Demo runner: replays persisted task records through the workflow engine.
//!
//! Tasks run one at a time, phase by phase in ascending order and in catalog
//! order within a phase. A failing task never stops the batch; its record is
//! marked `blocked` and the next run retries it. Records already `done` are
//! skipped, so re-running only dispatches outstanding work.

pub mod artifacts;
mod summary;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::catalog::{Catalog, TaskDescriptor};
use crate::config::{DEMO_PROJECT, DEMO_SPRINT};
use crate::context::ServiceContext;
use crate::error::{RunnerError, TaskErrorKind};
use crate::ports::{WorkflowError, WorkflowRequest};
use crate::store::{TaskRecord, TaskStatus, TaskStore};

pub use artifacts::{ArtifactFile, ArtifactKind};
pub use summary::{
    AgentsReport, CountsReport, PlannedTask, ReportMeta, RunReport, RunResult, RunSummary,
    TaskOutcome, TaskState,
};

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Phases to run; empty means all.
    pub phases: Vec<u8>,
    /// Print the plan without dispatching anything.
    pub dry_run: bool,
    /// Bound on the engine's internal review cycles.
    pub max_iterations: u32,
    /// Ask the operator before dispatching.
    pub confirm: bool,
    /// Run the concept catalog instead of the full one.
    pub concept_mode: bool,
    /// Lead agent spec.
    pub lead_agent: String,
    /// Drafter agent spec.
    pub drafter_agent: String,
    /// Per-task wall-clock bound.
    pub timeout: Option<Duration>,
}

/// Executes demo tasks against a task-state directory.
pub struct Runner<'a> {
    ctx: &'a ServiceContext,
    store: TaskStore<'a>,
    log_dir: Option<PathBuf>,
    artifact_dir: Option<PathBuf>,
}

impl<'a> Runner<'a> {
    /// Creates a runner reading records from `state_dir`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, state_dir: &Path) -> Self {
        Self { ctx, store: TaskStore::new(ctx, state_dir), log_dir: None, artifact_dir: None }
    }

    /// Saves each task's workflow output to `<dir>/<task_id>.log`.
    #[must_use]
    pub fn with_log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = Some(dir);
        self
    }

    /// Extracts artifacts from successful output into `<dir>/<kind>/`.
    #[must_use]
    pub fn with_artifact_dir(mut self, dir: PathBuf) -> Self {
        self.artifact_dir = Some(dir);
        self
    }

    /// Tasks in scope, in execution order. The epic is never included.
    #[must_use]
    pub fn plan(catalog: Catalog, phases: &[u8]) -> Vec<&'static TaskDescriptor> {
        let mut tasks: Vec<_> = catalog
            .get_tasks(None)
            .into_iter()
            .filter(|t| phases.is_empty() || phases.contains(&t.phase))
            .collect();
        tasks.sort_by_key(|t| t.phase);
        tasks
    }

    /// Runs every task in scope.
    ///
    /// A dry run only fills [`RunSummary::planned`]. A declined confirmation
    /// returns an empty summary with `aborted` set. Per-task failures are
    /// recorded in the results and never returned as errors.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Store`] if the state directory exists but
    /// cannot be listed.
    pub async fn run(&self, options: &RunOptions) -> Result<RunSummary, RunnerError> {
        let started = Instant::now();
        let catalog = Catalog::for_mode(options.concept_mode);
        let tasks = Self::plan(catalog, &options.phases);
        let mut summary = RunSummary {
            planned: tasks
                .iter()
                .map(|t| PlannedTask {
                    task_id: t.id.to_string(),
                    phase: t.phase,
                    title: t.title.to_string(),
                    depends_on: t.depends_on.iter().map(ToString::to_string).collect(),
                })
                .collect(),
            dry_run: options.dry_run,
            ..RunSummary::default()
        };

        if options.dry_run {
            debug!(planned = tasks.len(), "dry run; nothing dispatched");
            return Ok(summary);
        }

        self.store.list_ids()?;

        if options.confirm {
            let question = format!(
                "Run {} task(s) through the workflow engine ({} / {})?",
                tasks.len(),
                options.lead_agent,
                options.drafter_agent
            );
            if !self.ctx.prompt.confirm(&question) {
                info!("run declined by operator");
                summary.aborted = true;
                return Ok(summary);
            }
        }

        if let Some(epic) = catalog.epic() {
            self.complete_epic(epic.id);
        }

        for task in tasks {
            summary.results.push(self.run_task(task, options).await);
        }
        summary.duration = started.elapsed();
        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            "run finished"
        );
        Ok(summary)
    }

    async fn run_task(&self, task: &TaskDescriptor, options: &RunOptions) -> RunResult {
        let started = Instant::now();
        let mut record = match self.store.load(task.id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!(task = task.id, "no persisted record; skipping (run task-setup first)");
                return RunResult::new(
                    task.id,
                    task.phase,
                    TaskState::Pending,
                    started.elapsed(),
                    Some((TaskErrorKind::MissingTaskState, "no persisted record".into())),
                );
            }
            Err(e) => {
                warn!(task = task.id, error = %e, "unreadable record; skipping");
                return RunResult::new(
                    task.id,
                    task.phase,
                    TaskState::Pending,
                    started.elapsed(),
                    Some((TaskErrorKind::MissingTaskState, e.to_string())),
                );
            }
        };
        if record.status == TaskStatus::Done {
            debug!(task = task.id, "already done");
            return RunResult::skipped(task.id, task.phase, "already done");
        }

        let mut state = TaskState::Pending.start();
        self.update(&mut record, TaskStatus::InProgress, None);
        info!(task = task.id, phase = task.phase, "dispatching");

        let request = WorkflowRequest {
            task_id: record.id.clone(),
            project_id: DEMO_PROJECT.to_string(),
            sprint_id: DEMO_SPRINT.to_string(),
            prompt: record.prompt.clone(),
            lead_agent: options.lead_agent.clone(),
            drafter_agent: options.drafter_agent.clone(),
            max_iterations: options.max_iterations,
            timeout: options.timeout,
        };
        let mut artifacts = Vec::new();
        let error = match self.ctx.workflow.execute(&request).await {
            Ok(output) => {
                state = state.finish(true);
                self.update(&mut record, TaskStatus::Done, None);
                self.save_log(task.id, &output.log);
                artifacts = self.save_artifacts(task.id, &output.log);
                None
            }
            Err(e) => {
                state = state.finish(false);
                warn!(task = task.id, error = %e, "task failed");
                self.update(&mut record, TaskStatus::Blocked, Some(e.to_string()));
                let kind = match e {
                    WorkflowError::Timeout(_) => TaskErrorKind::Timeout,
                    WorkflowError::Failed(_) => TaskErrorKind::ExternalWorkflow,
                };
                Some((kind, e.to_string()))
            }
        };
        let result = RunResult::new(task.id, task.phase, state, started.elapsed(), error);
        RunResult { artifacts, ..result }
    }

    fn update(&self, record: &mut TaskRecord, status: TaskStatus, detail: Option<String>) {
        record.set_status(status, detail, self.ctx.clock.now());
        if let Err(e) = self.store.save(record) {
            warn!(task = %record.id, status = status.as_str(), error = %e, "status not persisted");
        }
    }

    fn complete_epic(&self, id: &str) {
        match self.store.load(id) {
            Ok(Some(mut epic)) if epic.status != TaskStatus::Done => {
                self.update(&mut epic, TaskStatus::Done, Some("tracking started".into()));
            }
            Ok(Some(_)) => {}
            Ok(None) => debug!(epic = id, "no epic record"),
            Err(e) => warn!(epic = id, error = %e, "unreadable epic record"),
        }
    }

    fn save_artifacts(&self, task_id: &str, output: &str) -> Vec<ArtifactFile> {
        let Some(dir) = &self.artifact_dir else { return Vec::new() };
        match artifacts::extract(self.ctx.fs.as_ref(), dir, task_id, output) {
            Ok(files) => {
                if files.is_empty() && ArtifactKind::for_task(task_id).is_some() {
                    warn!(task = task_id, "no artifacts found in workflow output");
                }
                debug!(task = task_id, count = files.len(), "artifacts extracted");
                files
            }
            Err(e) => {
                warn!(task = task_id, error = %e, "artifacts not saved");
                Vec::new()
            }
        }
    }

    fn save_log(&self, task_id: &str, log: &str) {
        let Some(dir) = &self.log_dir else { return };
        let path = dir.join(format!("{task_id}.log"));
        if let Err(e) = self.ctx.fs.write(&path, log) {
            warn!(task = task_id, path = %path.display(), error = %e, "workflow log not saved");
        }
    }
}
