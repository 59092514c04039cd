//! `setup-environment` command.

use crate::cli::SetupEnvironmentCli;
use crate::config::DemoConfig;
use crate::context::ServiceContext;
use crate::pipeline::{Pipeline, PipelineReport};

use super::{load_config, runtime};

/// Execute the `setup-environment` command.
///
/// # Errors
///
/// Returns an error string if configuration fails or a step halts the pipeline.
pub fn run(cli: &SetupEnvironmentCli) -> Result<(), String> {
    crate::logging::init(cli.common.verbose)?;
    let config = load_config(&cli.common)?;
    let ctx = ServiceContext::live(&config);
    runtime()?.block_on(run_with_context(&ctx, &config))
}

/// Execute the environment pipeline against the given context.
///
/// # Errors
///
/// Returns an error string naming the step that halted the pipeline.
pub async fn run_with_context(ctx: &ServiceContext, config: &DemoConfig) -> Result<(), String> {
    println!("Setting up the demo environment");
    println!("  Grafana: {}", config.endpoints.grafana);
    println!("  Output:  {}\n", config.output_dir.display());

    let report = Pipeline::environment(config)
        .run(ctx, |step| {
            println!("[{:<7}] {:<16} {}", step.outcome.label(), step.name, step.outcome.message());
        })
        .await;
    finish(&report)
}

fn finish(report: &PipelineReport) -> Result<(), String> {
    if report.halted {
        let step = report.steps.last().map_or("unknown", |s| s.name.as_str());
        return Err(format!("Environment setup halted at step '{step}'."));
    }
    println!("\nEnvironment setup complete ({} warning(s)).", report.warnings());
    println!("Next: demo-runner --concept-mode --dry-run");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[tokio::test]
    async fn missing_contextcore_halts_at_prerequisites() {
        let ctx = ServiceContext::in_memory();
        let config = DemoConfig { state_root: PathBuf::from("/state"), ..DemoConfig::default() };

        let err = run_with_context(&ctx, &config).await.unwrap_err();
        assert_eq!(err, "Environment setup halted at step 'prerequisites'.");
        assert!(ctx.fs.list_dir(&config.state_dir()).is_err());
    }
}
