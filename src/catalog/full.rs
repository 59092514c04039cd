//! The full six-phase self-tracking demo catalog.
//!
//! Phase 1 derives the observability artifacts, phase 2 prepares historical
//! telemetry, phase 3 loads both into the stack, phase 4 checks each backend,
//! phase 5 checks the dashboards end to end, phase 6 writes the report.

use super::descriptor::{TaskDescriptor, TaskKind};

/// Expected number of tasks in phases 1 through 6.
pub const PHASE_COUNTS: [usize; 6] = [5, 2, 2, 2, 1, 1];

/// Full catalog in execution order.
pub const TASKS: &[TaskDescriptor] = &[
    TaskDescriptor {
        id: "DEMO-P0-EPIC",
        phase: 0,
        kind: TaskKind::Epic,
        title: "ContextCore self-tracking observability demo",
        description: "Epic grouping every demo task; completed automatically when a run starts.",
        depends_on: &[],
        prompt_template: "Epic container for the {project} self-tracking demo ({sprint}). \
            Groups artifact generation, telemetry loading, and backend verification.",
    },
    TaskDescriptor {
        id: "DEMO-P1-DASHBOARDS",
        phase: 1,
        kind: TaskKind::Task,
        title: "Generate Grafana dashboards for project health",
        description: "Derive task-progress and sprint-velocity dashboards from project context.",
        depends_on: &[],
        prompt_template: "Generate Grafana dashboard JSON for project {project} covering task \
            status breakdown, sprint {sprint} burndown, blocked-task count, and cycle time. \
            Query task spans in Tempo via TraceQL and derived metrics in Mimir.",
    },
    TaskDescriptor {
        id: "DEMO-P1-ALERTS",
        phase: 1,
        kind: TaskKind::Task,
        title: "Generate PrometheusRule alert definitions",
        description: "Alerts for stalled tasks, blocked tasks, and sprint risk.",
        depends_on: &[],
        prompt_template: "Write PrometheusRule YAML for project {project}: alert when a task \
            stays in_progress for more than 24h, when blocked tasks exceed 2, and when sprint \
            {sprint} completion falls behind plan.",
    },
    TaskDescriptor {
        id: "DEMO-P1-SLOS",
        phase: 1,
        kind: TaskKind::Task,
        title: "Generate SLO definitions",
        description: "Delivery SLOs expressed over task span metrics.",
        depends_on: &[],
        prompt_template: "Define SLOs for project {project}: 95% of tasks complete within their \
            estimate, fewer than 5% of tasks blocked at any time. Emit one YAML document per SLO.",
    },
    TaskDescriptor {
        id: "DEMO-P1-NOTIFY",
        phase: 1,
        kind: TaskKind::Task,
        title: "Generate notification policies",
        description: "Route alerts to the owning channels by severity.",
        depends_on: &[],
        prompt_template: "Produce Grafana notification policy YAML for project {project} routing \
            critical alerts to the on-call channel and warnings to the team channel.",
    },
    TaskDescriptor {
        id: "DEMO-P1-RUNBOOKS",
        phase: 1,
        kind: TaskKind::Task,
        title: "Generate operational runbooks",
        description: "One markdown runbook per alert.",
        depends_on: &[],
        prompt_template: "Write a markdown runbook for each alert defined for project {project}, \
            including the TraceQL query that finds the affected task spans.",
    },
    TaskDescriptor {
        id: "DEMO-P2-HISTORY",
        phase: 2,
        kind: TaskKind::Task,
        title: "Generate historical task telemetry",
        description: "Backfill several sprints of task spans so dashboards have data.",
        depends_on: &["DEMO-P1-DASHBOARDS"],
        prompt_template: "Generate three sprints of historical task spans for project {project} \
            ending with {sprint}, with realistic status transitions and blocked periods.",
    },
    TaskDescriptor {
        id: "DEMO-P2-LOKI-RULES",
        phase: 2,
        kind: TaskKind::Task,
        title: "Generate Loki recording rules",
        description: "Recording rules that turn task status-change logs into metrics.",
        depends_on: &["DEMO-P1-ALERTS"],
        prompt_template: "Write Loki recording rules for project {project} counting task status \
            transitions per minute from the structured task logs.",
    },
    TaskDescriptor {
        id: "DEMO-P3-LOAD-TRACES",
        phase: 3,
        kind: TaskKind::Task,
        title: "Load task telemetry into Tempo and Loki",
        description: "Ship the historical spans and logs over OTLP.",
        depends_on: &["DEMO-P2-HISTORY"],
        prompt_template: "Load the generated historical telemetry for project {project} into the \
            local stack over OTLP and confirm the exporter reports zero dropped spans.",
    },
    TaskDescriptor {
        id: "DEMO-P3-LOAD-ARTIFACTS",
        phase: 3,
        kind: TaskKind::Task,
        title: "Import observability artifacts to the Grafana stack",
        description: "Import dashboards, rules, and policies produced in phases 1 and 2.",
        depends_on: &[
            "DEMO-P1-DASHBOARDS",
            "DEMO-P1-ALERTS",
            "DEMO-P1-SLOS",
            "DEMO-P1-NOTIFY",
            "DEMO-P1-RUNBOOKS",
            "DEMO-P2-LOKI-RULES",
        ],
        prompt_template: "Import every generated dashboard, alert rule, SLO, notification policy, \
            and Loki rule for project {project} into Grafana, Mimir, and Loki. Report counts.",
    },
    TaskDescriptor {
        id: "DEMO-P4-VERIFY-TEMPO",
        phase: 4,
        kind: TaskKind::Task,
        title: "Verify task spans in Tempo",
        description: "TraceQL returns the expected span count for the project.",
        depends_on: &["DEMO-P3-LOAD-TRACES"],
        prompt_template: "Query Tempo for spans with project.id = {project} and verify that every \
            task of sprint {sprint} appears with the right status attribute.",
    },
    TaskDescriptor {
        id: "DEMO-P4-VERIFY-LOKI-MIMIR",
        phase: 4,
        kind: TaskKind::Task,
        title: "Verify logs in Loki and metrics in Mimir",
        description: "Status-change logs and derived metrics are queryable.",
        depends_on: &["DEMO-P3-LOAD-TRACES", "DEMO-P3-LOAD-ARTIFACTS"],
        prompt_template: "Query Loki for task status logs and Mimir for the recording-rule metrics \
            of project {project}; report any series that is missing.",
    },
    TaskDescriptor {
        id: "DEMO-P5-VERIFY-DASHBOARDS",
        phase: 5,
        kind: TaskKind::Task,
        title: "Verify dashboards render with live data",
        description: "Every imported dashboard panel returns data.",
        depends_on: &["DEMO-P4-VERIFY-TEMPO", "DEMO-P4-VERIFY-LOKI-MIMIR"],
        prompt_template: "Open each imported dashboard for project {project} through the Grafana \
            API and confirm every panel query returns at least one data point.",
    },
    TaskDescriptor {
        id: "DEMO-P6-SUMMARY",
        phase: 6,
        kind: TaskKind::Task,
        title: "Generate execution summary and coverage report",
        description: "Summarise what ran, what it cost, and what is visible in Grafana.",
        depends_on: &["DEMO-P5-VERIFY-DASHBOARDS"],
        prompt_template: "Summarise the {project} demo run for sprint {sprint}: tasks executed, \
            artifacts produced, backends verified, and any gaps found.",
    },
];
