//! Static task descriptor type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a catalog entry is the demo's epic or an executable task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Container record; never dispatched to the workflow engine.
    Epic,
    /// Executable unit of demo work.
    Task,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Epic => "epic",
            Self::Task => "task",
        })
    }
}

/// One entry of a task catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDescriptor {
    /// Unique id, `<PREFIX>-P<phase>-<NAME>`.
    pub id: &'static str,
    /// Demo phase; 0 is reserved for the epic.
    pub phase: u8,
    /// Epic or task.
    pub kind: TaskKind,
    /// One-line title.
    pub title: &'static str,
    /// Longer description.
    pub description: &'static str,
    /// Ids that should complete first. Advisory only.
    pub depends_on: &'static [&'static str],
    /// Instruction for the workflow engine, with `{project}` and `{sprint}` placeholders.
    pub prompt_template: &'static str,
}

impl TaskDescriptor {
    /// Renders the prompt template for a project and sprint.
    #[must_use]
    pub fn render_prompt(&self, project: &str, sprint: &str) -> String {
        self.prompt_template.replace("{project}", project).replace("{sprint}", sprint)
    }

    /// Returns `true` for the epic entry.
    #[must_use]
    pub fn is_epic(&self) -> bool {
        self.kind == TaskKind::Epic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_prompt_fills_placeholders() {
        let d = TaskDescriptor {
            id: "DEMO-P1-X",
            phase: 1,
            kind: TaskKind::Task,
            title: "x",
            description: "x",
            depends_on: &[],
            prompt_template: "Track {project} in {sprint}; {project} again.",
        };
        assert_eq!(
            d.render_prompt("p", "s"),
            "Track p in s; p again."
        );
    }
}
