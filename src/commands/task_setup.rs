//! `task-setup` command.

use crate::catalog::Catalog;
use crate::cli::TaskSetupCli;
use crate::config::{DemoConfig, DEMO_PROJECT};
use crate::context::ServiceContext;
use crate::materialize::{CreateOptions, MaterializeReport, Materializer};

use super::{load_config, table};

/// Execute the `task-setup` command.
///
/// # Errors
///
/// Returns an error string on configuration, state-directory, duplicate, or
/// catalog failures.
pub fn run(cli: &TaskSetupCli) -> Result<(), String> {
    crate::logging::init(cli.common.verbose)?;
    let config = load_config(&cli.common)?;
    let ctx = ServiceContext::live(&config);
    run_with_context(&ctx, &config, cli)
}

/// Execute the `task-setup` command against the given context.
///
/// # Errors
///
/// Returns an error string if materialization fails.
pub fn run_with_context(
    ctx: &ServiceContext,
    config: &DemoConfig,
    cli: &TaskSetupCli,
) -> Result<(), String> {
    let state_dir = config.state_dir();
    let materializer = Materializer::new(ctx, &state_dir);

    if cli.list {
        print_list(&materializer, Catalog::for_mode(cli.concept_mode), &cli.phases);
        return Ok(());
    }

    if cli.common.verbose {
        println!("Demo project: {DEMO_PROJECT}");
        println!("State directory: {}", state_dir.display());
    }

    let options = CreateOptions {
        phases: cli.phases.clone(),
        clean: cli.clean,
        concept_mode: cli.concept_mode,
        dry_run: cli.dry_run,
    };
    let report = materializer.create(&options).map_err(|e| e.to_string())?;
    print_report(&report);
    Ok(())
}

fn print_list(materializer: &Materializer<'_>, catalog: Catalog, phases: &[u8]) {
    let rows = list_rows(materializer, catalog, phases);
    let persisted = rows.iter().filter(|r| r[3] != "-").count();

    println!("{}", table(["ID", "PHASE", "KIND", "STATUS", "DEPS", "TITLE"], &rows));
    println!(
        "\n{persisted} of {} {} catalog task(s) materialized in {}.",
        rows.len(),
        catalog.name(),
        materializer.store().dir().display()
    );
}

fn list_rows(materializer: &Materializer<'_>, catalog: Catalog, phases: &[u8]) -> Vec<[String; 6]> {
    let store = materializer.store();
    let mut rows = Vec::new();
    for task in materializer.list(catalog, phases) {
        let status = match store.load(task.id) {
            Ok(Some(record)) => record.status.as_str().to_string(),
            Ok(None) => "-".to_string(),
            Err(e) => {
                tracing::warn!(task = task.id, error = %e, "unreadable record");
                "unreadable".to_string()
            }
        };
        rows.push([
            task.id.to_string(),
            task.phase.to_string(),
            task.kind.to_string(),
            status,
            if task.depends_on.is_empty() { "-".to_string() } else { task.depends_on.join(",") },
            task.title.to_string(),
        ]);
    }
    rows
}

fn print_report(report: &MaterializeReport) {
    let prefix = if report.dry_run { "[DRY RUN] Would remove" } else { "Removed" };
    for id in &report.removed {
        println!("{prefix}: {}", report.path_of(id).display());
    }
    if let Some(id) = &report.reused_epic {
        println!("Kept existing epic: {id}");
    }
    let prefix = if report.dry_run { "[DRY RUN] Would create" } else { "Created" };
    for id in &report.written {
        println!("{prefix}: {id}");
    }

    if report.dry_run {
        println!(
            "\n[DRY RUN] {} {} task record(s) would be written to {}",
            report.count(),
            report.catalog.name(),
            report.state_dir.display()
        );
        return;
    }
    println!(
        "\n{} {} task record(s) written to {}",
        report.count(),
        report.catalog.name(),
        report.state_dir.display()
    );
    let concept = if report.catalog == Catalog::Concept { " --concept-mode" } else { "" };
    println!("Next: demo-runner{concept} --dry-run   (preview)");
    println!("      demo-runner{concept}             (execute)");
}
