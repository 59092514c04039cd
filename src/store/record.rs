//! Persisted task record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{TaskDescriptor, TaskKind};
use crate::config::{DEMO_PROJECT, DEMO_SPRINT};

/// Version of the on-disk record layout.
pub const SCHEMA_VERSION: u32 = 2;

/// Lifecycle status of a persisted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Dispatched to the workflow engine.
    InProgress,
    /// Completed successfully.
    Done,
    /// Last attempt failed.
    Blocked,
}

impl TaskStatus {
    /// Lower-case label as stored on disk.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }
}

/// Task priority derived from its phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Phases 0 through 2.
    High,
    /// Later phases.
    Medium,
}

impl Priority {
    /// Early phases are high priority.
    #[must_use]
    pub fn for_phase(phase: u8) -> Self {
        if phase <= 2 {
            Self::High
        } else {
            Self::Medium
        }
    }
}

/// One task as written to `<state_dir>/<id>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task id, also the file stem.
    pub id: String,
    /// Demo phase; 0 for the epic.
    pub phase: u8,
    /// Epic or task.
    pub kind: TaskKind,
    /// One-line title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Advisory dependencies.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Rendered prompt for the workflow engine.
    pub prompt: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Detail recorded with the last status change, if any.
    #[serde(default)]
    pub status_description: Option<String>,
    /// Priority label.
    pub priority: Priority,
    /// Owning project.
    pub project_id: String,
    /// Owning sprint.
    pub sprint_id: String,
    /// Trace the task's span belongs to.
    pub trace_id: String,
    /// The task's own span id.
    pub span_id: String,
    /// Span name, `task:<id>`.
    pub span_name: String,
    /// Span of the epic this task hangs under.
    #[serde(default)]
    pub parent_span_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Time the task reached `done`.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Record layout version.
    pub schema_version: u32,
}

impl TaskRecord {
    /// Builds a fresh `todo` record for a catalog entry.
    #[must_use]
    pub fn from_descriptor(
        descriptor: &TaskDescriptor,
        trace_id: String,
        span_id: String,
        parent_span_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: descriptor.id.to_string(),
            phase: descriptor.phase,
            kind: descriptor.kind,
            title: descriptor.title.to_string(),
            description: descriptor.description.to_string(),
            depends_on: descriptor.depends_on.iter().map(|d| (*d).to_string()).collect(),
            prompt: descriptor.render_prompt(DEMO_PROJECT, DEMO_SPRINT),
            status: TaskStatus::Todo,
            status_description: None,
            priority: Priority::for_phase(descriptor.phase),
            project_id: DEMO_PROJECT.to_string(),
            sprint_id: DEMO_SPRINT.to_string(),
            trace_id,
            span_id,
            span_name: format!("task:{}", descriptor.id),
            parent_span_id,
            created_at: now,
            updated_at: now,
            completed_at: None,
            schema_version: SCHEMA_VERSION,
        }
    }

    /// Moves the record to `status`, stamping `updated_at` and, for `done`,
    /// `completed_at`.
    pub fn set_status(&mut self, status: TaskStatus, detail: Option<String>, now: DateTime<Utc>) {
        self.status = status;
        self.status_description = detail;
        self.updated_at = now;
        self.completed_at = (status == TaskStatus::Done).then_some(now);
    }

    /// Returns `true` for the epic record.
    #[must_use]
    pub fn is_epic(&self) -> bool {
        self.kind == TaskKind::Epic
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::catalog::Catalog;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, hour, 0, 0).unwrap()
    }

    #[test]
    fn record_from_descriptor_carries_span_identity() {
        let descriptor = Catalog::Full.find("DEMO-P3-LOAD-TRACES").unwrap();
        let record = TaskRecord::from_descriptor(
            descriptor,
            "a".repeat(32),
            "b".repeat(16),
            Some("c".repeat(16)),
            at(9),
        );
        assert_eq!(record.span_name, "task:DEMO-P3-LOAD-TRACES");
        assert_eq!(record.priority, Priority::Medium);
        assert_eq!(record.status, TaskStatus::Todo);
        assert_eq!(record.project_id, DEMO_PROJECT);
        assert_eq!(record.schema_version, 2);
        assert_eq!(record.depends_on, ["DEMO-P2-HISTORY"]);
        assert!(!record.prompt.contains("{project}"));
    }

    #[test]
    fn done_sets_completion_time_and_other_statuses_clear_it() {
        let descriptor = Catalog::Full.find("DEMO-P1-ALERTS").unwrap();
        let mut record =
            TaskRecord::from_descriptor(descriptor, String::new(), String::new(), None, at(9));
        assert_eq!(record.priority, Priority::High);

        record.set_status(TaskStatus::Done, None, at(10));
        assert_eq!(record.completed_at, Some(at(10)));
        assert_eq!(record.updated_at, at(10));

        record.set_status(TaskStatus::Blocked, Some("boom".into()), at(11));
        assert_eq!(record.completed_at, None);
        assert_eq!(record.status_description.as_deref(), Some("boom"));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
    }
}
