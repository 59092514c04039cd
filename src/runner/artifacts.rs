//! Turns workflow output into artifact files under the output directory.
//!
//! The task id's trailing key (`DEMO-P1-DASHBOARDS` -> `DASHBOARDS`) picks an
//! [`ArtifactKind`]. Output may hold several artifacts separated by
//! `--- DASHBOARD: name ---` lines; sections of another kind are ignored.
//! Output with no delimiter at all is saved as one artifact named after the
//! project. Code fences are stripped, and JSON and YAML are cut down to the
//! first document so trailing commentary never reaches the file.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::config::DEMO_PROJECT;
use crate::ports::{FileSystem, PortError};

/// Artifact families a task can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Grafana dashboard JSON.
    Dashboard,
    /// `PrometheusRule` alert YAML.
    PrometheusRule,
    /// SLO definition YAML.
    Slo,
    /// Notification policy YAML.
    Notification,
    /// Loki recording rule YAML.
    LokiRule,
    /// Markdown runbook.
    Runbook,
}

impl ArtifactKind {
    /// Kind produced by a task, or `None` when the task has no artifacts.
    #[must_use]
    pub fn for_task(task_id: &str) -> Option<Self> {
        let key = task_id.splitn(3, '-').nth(2)?;
        Some(match key {
            "DASHBOARDS" | "DASHBOARD" => Self::Dashboard,
            "ALERTS" => Self::PrometheusRule,
            "SLOS" => Self::Slo,
            "NOTIFY" => Self::Notification,
            "LOKI-RULES" => Self::LokiRule,
            "RUNBOOKS" | "RUNBOOK" => Self::Runbook,
            _ => return None,
        })
    }

    /// Tag used in `--- TAG: name ---` delimiters.
    #[must_use]
    pub fn delimiter(self) -> &'static str {
        match self {
            Self::Dashboard => "DASHBOARD",
            Self::PrometheusRule => "PROMETHEUS_RULE",
            Self::Slo => "SLO",
            Self::Notification => "NOTIFICATION",
            Self::LokiRule => "LOKI_RULE",
            Self::Runbook => "RUNBOOK",
        }
    }

    /// Sub-directory of the output directory.
    #[must_use]
    pub fn dir(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboards",
            Self::PrometheusRule => "prometheus-rules",
            Self::Slo => "slo-definitions",
            Self::Notification => "notification-policies",
            Self::LokiRule => "loki-rules",
            Self::Runbook => "runbooks",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::PrometheusRule => "rules",
            Self::Slo => "slo",
            Self::Notification => "notifications",
            Self::LokiRule => "loki-rules",
            Self::Runbook => "runbook",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Dashboard => "json",
            Self::Runbook => "md",
            _ => "yaml",
        }
    }

    /// File name for the artifact of `name`.
    #[must_use]
    pub fn file_name(self, name: &str) -> String {
        format!("{name}-{}.{}", self.suffix(), self.extension())
    }

    fn clean(self, text: &str) -> String {
        let text = strip_code_fences(text);
        match self.extension() {
            "json" => first_json_value(&text).to_string(),
            "yaml" => yaml_before_commentary(&text).to_string(),
            _ => text,
        }
    }
}

/// One artifact file written for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFile {
    /// Artifact family.
    pub kind: ArtifactKind,
    /// Where the file was written.
    pub path: PathBuf,
}

fn delimiter_regex() -> &'static Regex {
    static DELIMITER: OnceLock<Regex> = OnceLock::new();
    DELIMITER.get_or_init(|| {
        Regex::new(r"(?m)^---\s*(\w+):\s*(\S+)\s*---\s*$").expect("delimiter pattern is valid")
    })
}

/// Splits `output` into `(name, content)` pairs of the given kind.
#[must_use]
pub fn split(kind: ArtifactKind, output: &str) -> Vec<(String, String)> {
    let re = delimiter_regex();
    let marks: Vec<_> = re.captures_iter(output).collect();
    if marks.is_empty() {
        let content = kind.clean(output);
        return if content.is_empty() {
            Vec::new()
        } else {
            vec![(DEMO_PROJECT.to_string(), content)]
        };
    }

    let mut sections = Vec::new();
    for (i, caps) in marks.iter().enumerate() {
        if &caps[1] != kind.delimiter() {
            continue;
        }
        let start = caps.get(0).map_or(0, |m| m.end());
        let end = marks.get(i + 1).and_then(|c| c.get(0)).map_or(output.len(), |m| m.start());
        let content = kind.clean(&output[start..end]);
        if !content.is_empty() {
            sections.push((caps[2].to_string(), content));
        }
    }
    sections
}

/// Writes the artifacts found in a task's output under `output_dir`.
///
/// # Errors
///
/// Returns the first write failure. Files written before it are kept.
pub fn extract(
    fs: &dyn FileSystem,
    output_dir: &Path,
    task_id: &str,
    output: &str,
) -> Result<Vec<ArtifactFile>, PortError> {
    let Some(kind) = ArtifactKind::for_task(task_id) else {
        return Ok(Vec::new());
    };
    let dir = output_dir.join(kind.dir());
    let mut written = Vec::new();
    for (name, content) in split(kind, output) {
        let path = dir.join(kind.file_name(&name));
        fs.write(&path, &format!("{content}\n"))?;
        written.push(ArtifactFile { kind, path });
    }
    Ok(written)
}

fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let line = line.trim_end();
            !(line.starts_with("```") && line[3..].chars().all(char::is_alphanumeric))
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn first_json_value(text: &str) -> &str {
    let text = text.trim_start();
    if !text.starts_with(['{', '[']) {
        return text;
    }
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<serde_json::Value>();
    match stream.next() {
        Some(Ok(_)) => text[..stream.byte_offset()].trim_end(),
        _ => text,
    }
}

/// Cuts at the first markdown heading that follows YAML content.
fn yaml_before_commentary(text: &str) -> &str {
    let mut seen_content = false;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if seen_content && (trimmed.starts_with("# ") || trimmed.starts_with("## ")) {
            return text[..offset].trim_end();
        }
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            seen_content = true;
        }
        offset += line.len();
    }
    text.trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    #[test]
    fn kind_comes_from_task_key() {
        assert_eq!(ArtifactKind::for_task("DEMO-P1-DASHBOARDS"), Some(ArtifactKind::Dashboard));
        assert_eq!(ArtifactKind::for_task("DEMO-P2-LOKI-RULES"), Some(ArtifactKind::LokiRule));
        assert_eq!(ArtifactKind::for_task("CONCEPT-P4-DASHBOARD"), Some(ArtifactKind::Dashboard));
        assert_eq!(ArtifactKind::for_task("DEMO-P3-LOAD-TRACES"), None);
        assert_eq!(ArtifactKind::for_task("DEMO"), None);
    }

    #[test]
    fn fenced_json_loses_trailing_notes() {
        let sections =
            split(ArtifactKind::Dashboard, "```json\n{\"uid\": \"health\"}\n```\nNotes follow.");
        assert_eq!(sections, [("ecosystem-demo".to_string(), "{\"uid\": \"health\"}".to_string())]);
    }

    #[test]
    fn delimited_sections_of_other_kinds_are_ignored() {
        let output = "Intro\n\
            --- PROMETHEUS_RULE: api ---\n```yaml\ngroups: []\n```\n\
            --- SLO: api ---\nslo: 1\n\
            --- PROMETHEUS_RULE: worker ---\ngroups:\n  - name: w\n## Summary\nprose\n";
        let sections = split(ArtifactKind::PrometheusRule, output);
        assert_eq!(
            sections,
            [
                ("api".to_string(), "groups: []".to_string()),
                ("worker".to_string(), "groups:\n  - name: w".to_string())
            ]
        );
    }

    #[test]
    fn leading_yaml_comment_is_kept() {
        assert_eq!(yaml_before_commentary("# slo file\nslo: 1\n# Notes\n"), "# slo file\nslo: 1");
    }

    #[test]
    fn extract_writes_under_kind_directory() {
        let fs = MemoryFileSystem::new();
        let files = extract(
            &fs,
            Path::new("/out"),
            "DEMO-P1-RUNBOOKS",
            "--- RUNBOOK: stalled ---\n# Stalled task\nCheck Tempo.\n",
        )
        .unwrap();

        let path = PathBuf::from("/out/runbooks/stalled-runbook.md");
        assert_eq!(files, [ArtifactFile { kind: ArtifactKind::Runbook, path: path.clone() }]);
        assert_eq!(fs.read_to_string(&path).unwrap(), "# Stalled task\nCheck Tempo.\n");
    }

    #[test]
    fn tasks_without_artifacts_write_nothing() {
        let fs = MemoryFileSystem::new();
        assert!(extract(&fs, Path::new("/out"), "DEMO-P6-SUMMARY", "{}").unwrap().is_empty());
        assert!(fs.paths().is_empty());
    }
}
