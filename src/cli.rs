//! CLI argument definitions for the three binaries.

use std::path::PathBuf;

use clap::{Args, Parser};

/// Flags every binary accepts.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Show progress and debug diagnostics.
    #[arg(short, long)]
    pub verbose: bool,
    /// State root holding one directory per project (overrides CONTEXTCORE_STATE_DIR).
    #[arg(long, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,
    /// YAML configuration file (overrides CONTEXTCORE_DEMO_CONFIG).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// `task-setup`: materialize demo task records.
#[derive(Debug, Parser)]
#[command(
    name = "task-setup",
    version,
    about = "Create demo task records in the ContextCore state directory"
)]
pub struct TaskSetupCli {
    /// Only these phases (1-6). The epic is always included.
    #[arg(long, num_args = 1.., value_parser = clap::value_parser!(u8).range(1..=6))]
    pub phases: Vec<u8>,
    /// Show what would be written without touching the state directory.
    #[arg(long)]
    pub dry_run: bool,
    /// Remove this demo's existing records first.
    #[arg(long)]
    pub clean: bool,
    /// List the catalog with each task's persisted status, then exit.
    #[arg(long)]
    pub list: bool,
    /// Use the seven-record concept catalog.
    #[arg(long)]
    pub concept_mode: bool,
    /// Shared flags.
    #[command(flatten)]
    pub common: CommonArgs,
}

/// `demo-runner`: replay task records through the workflow engine.
#[derive(Debug, Parser)]
#[command(name = "demo-runner", version, about = "Run demo tasks through the multi-agent workflow")]
pub struct DemoRunnerCli {
    /// Check prerequisites and exit.
    #[arg(long)]
    pub check: bool,
    /// Only these phases (1-6).
    #[arg(long, num_args = 1.., value_parser = clap::value_parser!(u8).range(1..=6))]
    pub phases: Vec<u8>,
    /// Print the plan without calling the workflow engine.
    #[arg(long)]
    pub dry_run: bool,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
    /// Write a JSON run report to FILE.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Lead agent spec (default from config).
    #[arg(long, value_name = "SPEC")]
    pub lead_agent: Option<String>,
    /// Drafter agent spec (default from config).
    #[arg(long, value_name = "SPEC")]
    pub drafter_agent: Option<String>,
    /// Bound on review iterations per task.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_iterations: Option<u32>,
    /// Re-create task records (clean) before running.
    #[arg(long)]
    pub setup: bool,
    /// Run the concept catalog.
    #[arg(long)]
    pub concept_mode: bool,
    /// Per-task timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Shared flags.
    #[command(flatten)]
    pub common: CommonArgs,
}

/// `setup-environment`: prepare the observability stack for the demo.
#[derive(Debug, Parser)]
#[command(
    name = "setup-environment",
    version,
    about = "Prepare Grafana, Tempo, Loki, and Mimir for the demo"
)]
pub struct SetupEnvironmentCli {
    /// Shared flags.
    #[command(flatten)]
    pub common: CommonArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_setup_accepts_multiple_phases() {
        let cli = TaskSetupCli::parse_from(["task-setup", "--phases", "1", "3", "--clean", "-v"]);
        assert_eq!(cli.phases, [1, 3]);
        assert!(cli.clean);
        assert!(cli.common.verbose);
    }

    #[test]
    fn phase_out_of_range_is_rejected() {
        assert!(TaskSetupCli::try_parse_from(["task-setup", "--phases", "7"]).is_err());
        assert!(DemoRunnerCli::try_parse_from(["demo-runner", "--phases", "0"]).is_err());
    }

    #[test]
    fn demo_runner_flags() {
        let cli = DemoRunnerCli::parse_from([
            "demo-runner",
            "-y",
            "-o",
            "out.json",
            "--max-iterations",
            "5",
            "--lead-agent",
            "anthropic:claude-opus",
            "--state-dir",
            "/tmp/state",
        ]);
        assert!(cli.yes);
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert_eq!(cli.max_iterations, Some(5));
        assert_eq!(cli.lead_agent.as_deref(), Some("anthropic:claude-opus"));
        assert_eq!(cli.common.state_dir, Some(PathBuf::from("/tmp/state")));
        assert!(cli.phases.is_empty());
    }

    #[test]
    fn zero_iterations_is_rejected() {
        assert!(DemoRunnerCli::try_parse_from(["demo-runner", "--max-iterations", "0"]).is_err());
    }
}
