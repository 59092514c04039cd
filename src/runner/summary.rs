//! Per-task results, the run summary, and its JSON report form.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{DEMO_PROJECT, DEMO_SPRINT};
use crate::error::{StoreError, TaskErrorKind};
use crate::ports::FileSystem;

use super::artifacts::{ArtifactFile, ArtifactKind};

/// Execution state of one task within a single run.
///
/// `Pending -> Running -> {Succeeded, Failed}`. Terminal states ignore
/// further transitions, and a task that never left `Pending` was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    /// Not yet dispatched.
    #[default]
    Pending,
    /// Dispatched to the workflow engine.
    Running,
    /// Workflow returned success.
    Succeeded,
    /// Workflow failed or timed out.
    Failed,
}

impl TaskState {
    /// `Pending` becomes `Running`; anything else is unchanged.
    #[must_use]
    pub fn start(self) -> Self {
        match self {
            Self::Pending => Self::Running,
            other => other,
        }
    }

    /// `Running` becomes `Succeeded` or `Failed`; anything else is unchanged.
    #[must_use]
    pub fn finish(self, success: bool) -> Self {
        match (self, success) {
            (Self::Running, true) => Self::Succeeded,
            (Self::Running, false) => Self::Failed,
            (other, _) => other,
        }
    }

    /// Returns `true` for `Succeeded` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Final disposition of a task in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Dispatched and succeeded.
    Succeeded,
    /// Dispatched and failed.
    Failed,
    /// Never dispatched.
    Skipped,
}

impl From<TaskState> for TaskOutcome {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Succeeded => Self::Succeeded,
            TaskState::Failed => Self::Failed,
            TaskState::Pending | TaskState::Running => Self::Skipped,
        }
    }
}

/// Result of one task in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// Task id.
    pub task_id: String,
    /// Task phase.
    pub phase: u8,
    /// Disposition.
    pub outcome: TaskOutcome,
    /// `true` only for [`TaskOutcome::Succeeded`].
    pub success: bool,
    /// Wall-clock time spent on the task.
    pub duration_ms: u64,
    /// Failure class, for failed tasks and missing records.
    pub error_kind: Option<TaskErrorKind>,
    /// Failure or skip detail.
    pub error_detail: Option<String>,
    /// Artifact files extracted from the workflow output.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactFile>,
}

impl RunResult {
    /// Builds a result from the task's final state.
    #[must_use]
    pub fn new(
        task_id: &str,
        phase: u8,
        state: TaskState,
        duration: Duration,
        error: Option<(TaskErrorKind, String)>,
    ) -> Self {
        let outcome = TaskOutcome::from(state);
        let (error_kind, error_detail) = match error {
            Some((kind, detail)) => (Some(kind), Some(detail)),
            None => (None, None),
        };
        Self {
            task_id: task_id.to_string(),
            phase,
            outcome,
            success: outcome == TaskOutcome::Succeeded,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            error_kind,
            error_detail,
            artifacts: Vec::new(),
        }
    }

    /// A task skipped without an error, e.g. already done.
    #[must_use]
    pub fn skipped(task_id: &str, phase: u8, reason: &str) -> Self {
        Self {
            error_detail: Some(reason.to_string()),
            ..Self::new(task_id, phase, TaskState::Pending, Duration::ZERO, None)
        }
    }
}

/// One entry of the planned invocation sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTask {
    /// Task id.
    pub task_id: String,
    /// Task phase.
    pub phase: u8,
    /// Task title.
    pub title: String,
    /// Ids this task follows; advisory only.
    pub depends_on: Vec<String>,
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks in scope, in execution order.
    pub planned: Vec<PlannedTask>,
    /// One result per planned task; empty for dry and aborted runs.
    pub results: Vec<RunResult>,
    /// The operator declined confirmation.
    pub aborted: bool,
    /// Nothing was dispatched because this was a dry run.
    pub dry_run: bool,
    /// Total wall-clock time.
    pub duration: Duration,
}

impl RunSummary {
    fn count(&self, outcome: TaskOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Tasks that succeeded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(TaskOutcome::Succeeded)
    }

    /// Tasks that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(TaskOutcome::Failed)
    }

    /// Tasks that were never dispatched.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(TaskOutcome::Skipped)
    }

    /// Number of artifact files written, per kind.
    #[must_use]
    pub fn artifact_counts(&self) -> BTreeMap<ArtifactKind, usize> {
        let mut counts = BTreeMap::new();
        for file in self.results.iter().flat_map(|r| &r.artifacts) {
            *counts.entry(file.kind).or_insert(0) += 1;
        }
        counts
    }

    /// `true` when the run was not aborted and no attempted task failed.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.aborted && self.failed() == 0
    }

    /// Builds the structured form written by `--output`.
    #[must_use]
    pub fn to_report(&self, meta: ReportMeta, executed_at: DateTime<Utc>) -> RunReport {
        RunReport {
            demo: meta.demo,
            project_id: DEMO_PROJECT.to_string(),
            sprint_id: DEMO_SPRINT.to_string(),
            executed_at,
            duration_ms: u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX),
            agents: AgentsReport { lead: meta.lead_agent, drafter: meta.drafter_agent },
            max_iterations: meta.max_iterations,
            summary: CountsReport {
                planned: self.planned.len(),
                succeeded: self.succeeded(),
                failed: self.failed(),
                skipped: self.skipped(),
                aborted: self.aborted,
                dry_run: self.dry_run,
                success: self.success(),
            },
            planned: self.planned.clone(),
            results: self.results.clone(),
            artifacts: self.artifact_counts(),
        }
    }
}

/// Run settings echoed into the report.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    /// Demo name.
    pub demo: String,
    /// Lead agent spec.
    pub lead_agent: String,
    /// Drafter agent spec.
    pub drafter_agent: String,
    /// Review-iteration bound.
    pub max_iterations: u32,
}

/// `--output` file contents.
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct RunReport {
    pub demo: String,
    pub project_id: String,
    pub sprint_id: String,
    pub executed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub agents: AgentsReport,
    pub max_iterations: u32,
    pub summary: CountsReport,
    pub planned: Vec<PlannedTask>,
    pub results: Vec<RunResult>,
    pub artifacts: BTreeMap<ArtifactKind, usize>,
}

/// Agent specs section of [`RunReport`].
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct AgentsReport {
    pub lead: String,
    pub drafter: String,
}

/// Counts section of [`RunReport`].
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct CountsReport {
    pub planned: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub aborted: bool,
    pub dry_run: bool,
    pub success: bool,
}

impl RunReport {
    /// Writes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or writing fails.
    pub fn write(&self, fs: &dyn FileSystem, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| StoreError::Format { path: path.to_path_buf(), source })?;
        fs.write(path, &json).map_err(|e| StoreError::Io {
            action: "write",
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_do_not_transition() {
        let done = TaskState::Pending.start().finish(true);
        assert_eq!(done, TaskState::Succeeded);
        assert!(done.is_terminal());
        assert_eq!(done.start(), TaskState::Succeeded);
        assert_eq!(done.finish(false), TaskState::Succeeded);
        assert_eq!(TaskState::Pending.finish(true), TaskState::Pending);
    }

    #[test]
    fn never_started_task_is_skipped() {
        let result = RunResult::new(
            "DEMO-P1-SLOS",
            1,
            TaskState::Pending,
            Duration::ZERO,
            Some((TaskErrorKind::MissingTaskState, "no record".into())),
        );
        assert_eq!(result.outcome, TaskOutcome::Skipped);
        assert!(!result.success);
    }

    #[test]
    fn success_requires_no_failures_and_no_abort() {
        let ok = RunResult::new("A", 1, TaskState::Succeeded, Duration::from_millis(5), None);
        let skipped = RunResult::skipped("B", 1, "already done");
        let mut summary = RunSummary { results: vec![ok, skipped], ..RunSummary::default() };
        assert!(summary.success());
        assert_eq!((summary.succeeded(), summary.skipped()), (1, 1));

        summary.aborted = true;
        assert!(!summary.success());
    }

    #[test]
    fn report_serializes_counts_and_error_kinds() {
        let failed = RunResult::new(
            "DEMO-P1-ALERTS",
            1,
            TaskState::Failed,
            Duration::from_millis(1500),
            Some((TaskErrorKind::Timeout, "timed out".into())),
        );
        let summary = RunSummary { results: vec![failed], ..RunSummary::default() };
        let meta = ReportMeta {
            demo: "self-tracking".into(),
            lead_agent: "lead".into(),
            drafter_agent: "drafter".into(),
            max_iterations: 2,
        };
        let report = summary.to_report(meta, DateTime::<Utc>::UNIX_EPOCH);
        let value = serde_json::to_value(report).unwrap();

        assert_eq!(value["summary"]["failed"], 1);
        assert_eq!(value["summary"]["success"], false);
        assert_eq!(value["results"][0]["error_kind"], "timeout");
        assert_eq!(value["results"][0]["duration_ms"], 1500);
        assert_eq!(value["project_id"], "ecosystem-demo");
    }

    #[test]
    fn dry_run_report_lists_planned_tasks() {
        let summary = RunSummary {
            planned: vec![PlannedTask {
                task_id: "DEMO-P3-LOAD-TRACES".into(),
                phase: 3,
                title: "Load traces".into(),
                depends_on: vec!["DEMO-P2-HISTORY".into()],
            }],
            dry_run: true,
            ..RunSummary::default()
        };
        let meta = ReportMeta {
            demo: "self-tracking".into(),
            lead_agent: "lead".into(),
            drafter_agent: "drafter".into(),
            max_iterations: 1,
        };
        let value = serde_json::to_value(summary.to_report(meta, DateTime::<Utc>::UNIX_EPOCH))
            .unwrap();

        assert_eq!(value["summary"]["dry_run"], true);
        assert_eq!(value["planned"][0]["task_id"], "DEMO-P3-LOAD-TRACES");
        assert_eq!(value["planned"][0]["depends_on"][0], "DEMO-P2-HISTORY");
        assert_eq!(value["results"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn artifacts_are_counted_per_kind() {
        let file = |kind, path: &str| ArtifactFile { kind, path: path.into() };
        let mut dashboards = RunResult::new("A", 1, TaskState::Succeeded, Duration::ZERO, None);
        dashboards.artifacts = vec![
            file(ArtifactKind::Dashboard, "/out/dashboards/a-dashboard.json"),
            file(ArtifactKind::Dashboard, "/out/dashboards/b-dashboard.json"),
        ];
        let mut slos = RunResult::new("B", 1, TaskState::Succeeded, Duration::ZERO, None);
        slos.artifacts = vec![file(ArtifactKind::Slo, "/out/slo-definitions/a-slo.yaml")];
        let summary = RunSummary { results: vec![dashboards, slos], ..RunSummary::default() };

        let counts = summary.artifact_counts();
        assert_eq!(counts[&ArtifactKind::Dashboard], 2);
        assert_eq!(counts[&ArtifactKind::Slo], 1);

        let meta = ReportMeta {
            demo: "d".into(),
            lead_agent: "l".into(),
            drafter_agent: "r".into(),
            max_iterations: 1,
        };
        let value = serde_json::to_value(summary.to_report(meta, DateTime::<Utc>::UNIX_EPOCH))
            .unwrap();
        assert_eq!(value["artifacts"]["dashboard"], 2);
        assert_eq!(value["results"][0]["artifacts"][0]["kind"], "dashboard");
    }
}
