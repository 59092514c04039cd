//! `demo-runner` command.

use std::time::Duration;

use crate::catalog::Catalog;
use crate::cli::DemoRunnerCli;
use crate::config::{DemoConfig, API_KEY_ENV_VAR};
use crate::context::ServiceContext;
use crate::materialize::{CreateOptions, Materializer};
use crate::prereq;
use crate::runner::{ReportMeta, RunOptions, RunSummary, Runner, TaskOutcome};

use super::{load_config, runtime, table};

const DEMO_NAME: &str = "contextcore-self-tracking";

/// Execute the `demo-runner` command.
///
/// # Errors
///
/// Returns an error string when prerequisites are unmet, setup fails, or any
/// dispatched task fails.
pub fn run(cli: &DemoRunnerCli) -> Result<(), String> {
    crate::logging::init(cli.common.verbose)?;
    let config = load_config(&cli.common)?;
    let ctx = ServiceContext::live(&config);
    runtime()?.block_on(run_with_context(&ctx, &config, cli))
}

/// Execute the `demo-runner` command against the given context.
///
/// # Errors
///
/// Returns an error string when prerequisites are unmet, setup fails, or any
/// dispatched task fails. A declined confirmation is not an error.
pub async fn run_with_context(
    ctx: &ServiceContext,
    config: &DemoConfig,
    cli: &DemoRunnerCli,
) -> Result<(), String> {
    let state_dir = config.state_dir();

    if cli.check {
        let report = prereq::check(ctx, &prereq::runner_probes(config), config.probe_timeout())
            .await
            .map_err(|e| e.to_string())?;
        println!("Prerequisite check");
        print!("{}", report.render());
        if report.ready {
            return Ok(());
        }
        if !report.is_ok("api_key_set") {
            println!("Set {API_KEY_ENV_VAR} to run tasks through the workflow.");
        }
        return Err("Prerequisites not met.".to_string());
    }

    if cli.setup {
        let options = CreateOptions {
            clean: true,
            concept_mode: cli.concept_mode,
            dry_run: cli.dry_run,
            ..CreateOptions::default()
        };
        let report = Materializer::new(ctx, &state_dir)
            .create(&options)
            .map_err(|e| format!("Setup failed: {e}"))?;
        let verb = if report.dry_run { "would be written" } else { "written" };
        println!("Setup: {} task record(s) {verb} to {}", report.count(), state_dir.display());
    }

    if !cli.dry_run {
        let report = prereq::check(ctx, &prereq::runner_probes(config), config.probe_timeout())
            .await
            .map_err(|e| e.to_string())?;
        if !report.ready {
            print!("{}", report.render());
            return Err("Cannot proceed until prerequisites are met.".to_string());
        }
    }

    let options = RunOptions {
        phases: cli.phases.clone(),
        dry_run: cli.dry_run,
        max_iterations: cli.max_iterations.unwrap_or(config.max_iterations),
        confirm: !cli.yes,
        concept_mode: cli.concept_mode,
        lead_agent: cli.lead_agent.clone().unwrap_or_else(|| config.agents.lead.clone()),
        drafter_agent: cli.drafter_agent.clone().unwrap_or_else(|| config.agents.drafter.clone()),
        timeout: cli.timeout.map(Duration::from_secs).or_else(|| config.workflow_timeout()),
    };
    let runner = Runner::new(ctx, &state_dir)
        .with_log_dir(config.output_dir.join("logs"))
        .with_artifact_dir(config.output_dir.clone());
    let summary = runner.run(&options).await.map_err(|e| e.to_string())?;

    print_summary(&summary, &options);

    if let Some(path) = &cli.output {
        let meta = ReportMeta {
            demo: format!("{DEMO_NAME}/{}", Catalog::for_mode(cli.concept_mode).name()),
            lead_agent: options.lead_agent.clone(),
            drafter_agent: options.drafter_agent.clone(),
            max_iterations: options.max_iterations,
        };
        summary
            .to_report(meta, ctx.clock.now())
            .write(ctx.fs.as_ref(), path)
            .map_err(|e| format!("Failed to write run report: {e}"))?;
        println!("Results written to {}", path.display());
    }

    if summary.aborted || summary.success() {
        Ok(())
    } else {
        Err(format!("{} of {} task(s) failed.", summary.failed(), summary.results.len()))
    }
}

fn plan_table(summary: &RunSummary) -> String {
    let rows: Vec<_> = summary
        .planned
        .iter()
        .map(|t| {
            let deps =
                if t.depends_on.is_empty() { "-".to_string() } else { t.depends_on.join(",") };
            [t.task_id.clone(), t.phase.to_string(), deps, t.title.clone()]
        })
        .collect();
    table(["ID", "PHASE", "DEPS", "TITLE"], &rows)
}

fn print_summary(summary: &RunSummary, options: &RunOptions) {
    if summary.dry_run {
        println!("[DRY RUN] Workflow configuration:");
        println!("  Lead agent:     {}", options.lead_agent);
        println!("  Drafter agent:  {}", options.drafter_agent);
        println!("  Max iterations: {}", options.max_iterations);
        println!("\n[DRY RUN] Would run {} task(s):", summary.planned.len());
        println!("{}", plan_table(summary));
        return;
    }
    if summary.aborted {
        println!("Aborted; no tasks were run.");
        return;
    }

    let rows: Vec<_> = summary
        .results
        .iter()
        .map(|r| {
            let outcome = match r.outcome {
                TaskOutcome::Succeeded => "ok",
                TaskOutcome::Failed => "FAILED",
                TaskOutcome::Skipped => "skipped",
            };
            let detail = match (r.error_kind, &r.error_detail) {
                (Some(kind), Some(detail)) => format!("{}: {detail}", kind.label()),
                (None, Some(detail)) => detail.clone(),
                _ => String::new(),
            };
            let secs = Duration::from_millis(r.duration_ms).as_secs_f64();
            [r.task_id.clone(), outcome.to_string(), format!("{secs:.1}s"), detail]
        })
        .collect();
    println!("{}", table(["ID", "RESULT", "TIME", "DETAIL"], &rows));
    println!(
        "\nSucceeded: {}  Failed: {}  Skipped: {}  ({:.1}s)",
        summary.succeeded(),
        summary.failed(),
        summary.skipped(),
        summary.duration.as_secs_f64()
    );
    let artifacts = summary.artifact_counts();
    if !artifacts.is_empty() {
        let counts: Vec<_> =
            artifacts.iter().map(|(kind, n)| format!("{}: {n}", kind.dir())).collect();
        println!("Artifacts: {}", counts.join("  "));
    }
}
