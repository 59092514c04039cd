//! Reduced seven-record catalog for the short concept walkthrough.

use super::descriptor::{TaskDescriptor, TaskKind};

/// Expected number of tasks in phases 1 through 6.
pub const PHASE_COUNTS: [usize; 6] = [1, 1, 1, 1, 1, 1];

/// Concept catalog in execution order.
pub const TASKS: &[TaskDescriptor] = &[
    TaskDescriptor {
        id: "CONCEPT-P0-EPIC",
        phase: 0,
        kind: TaskKind::Epic,
        title: "Tasks as spans: concept walkthrough",
        description: "Epic for the short walkthrough of project tracking through telemetry.",
        depends_on: &[],
        prompt_template: "Epic container for the {project} concept walkthrough ({sprint}).",
    },
    TaskDescriptor {
        id: "CONCEPT-P1-CONTEXT",
        phase: 1,
        kind: TaskKind::Task,
        title: "Describe the project context",
        description: "Business value, owners, and risks that drive what gets observed.",
        depends_on: &[],
        prompt_template: "Write a one-page project context for {project}: business value, owner, \
            criticality, and the top three delivery risks.",
    },
    TaskDescriptor {
        id: "CONCEPT-P2-TASK-SPANS",
        phase: 2,
        kind: TaskKind::Task,
        title: "Model tasks as spans",
        description: "Show how a task's lifecycle maps to span start, events, and end.",
        depends_on: &["CONCEPT-P1-CONTEXT"],
        prompt_template: "Explain, with one worked example from sprint {sprint}, how a task's \
            status changes become span events and how completion ends the span.",
    },
    TaskDescriptor {
        id: "CONCEPT-P3-STATUS",
        phase: 3,
        kind: TaskKind::Task,
        title: "Derive status from telemetry",
        description: "Replace status meetings with queries.",
        depends_on: &["CONCEPT-P2-TASK-SPANS"],
        prompt_template: "Write the TraceQL and LogQL queries that answer 'what is blocked in \
            {project} right now' without asking anyone.",
    },
    TaskDescriptor {
        id: "CONCEPT-P4-DASHBOARD",
        phase: 4,
        kind: TaskKind::Task,
        title: "Build the portfolio dashboard",
        description: "One dashboard showing every task's state.",
        depends_on: &["CONCEPT-P3-STATUS"],
        prompt_template: "Generate a single Grafana dashboard for {project} that shows task \
            status counts, blocked tasks, and sprint {sprint} progress.",
    },
    TaskDescriptor {
        id: "CONCEPT-P5-INSIGHTS",
        phase: 5,
        kind: TaskKind::Task,
        title: "Record agent insights",
        description: "Capture decisions made by agents as queryable telemetry.",
        depends_on: &["CONCEPT-P4-DASHBOARD"],
        prompt_template: "List the decisions an agent made while working on {project} and emit \
            each as a structured insight with confidence and rationale.",
    },
    TaskDescriptor {
        id: "CONCEPT-P6-WRAPUP",
        phase: 6,
        kind: TaskKind::Task,
        title: "Wrap up the walkthrough",
        description: "Summarise what the audience saw.",
        depends_on: &["CONCEPT-P5-INSIGHTS"],
        prompt_template: "Summarise the {project} concept walkthrough in five bullet points.",
    },
];
