//! The concrete steps of the environment setup pipeline.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{Step, StepFuture, StepOutcome};
use crate::config::DemoConfig;
use crate::context::ServiceContext;
use crate::materialize::{CreateOptions, Materializer};
use crate::ports::BasicAuth;
use crate::prereq::{self, CheckStatus, Probe};

/// Runs a probe set. As a gate, an unready environment is fatal; as a final
/// verification, anything short of fully ready is a warning.
pub struct ReadinessStep {
    name: &'static str,
    probes: Vec<Probe>,
    timeout: Duration,
    fatal: bool,
}

impl ReadinessStep {
    /// The opening gate: `contextcore_installed` and `grafana_reachable` are required.
    #[must_use]
    pub fn gate(config: &DemoConfig) -> Self {
        Self {
            name: "prerequisites",
            probes: prereq::environment_probes(config),
            timeout: config.probe_timeout(),
            fatal: true,
        }
    }

    /// The closing re-probe.
    #[must_use]
    pub fn verification(config: &DemoConfig) -> Self {
        Self {
            name: "verification",
            probes: prereq::environment_probes(config),
            timeout: config.probe_timeout(),
            fatal: false,
        }
    }

    async fn evaluate(&self, ctx: &ServiceContext) -> StepOutcome {
        let report = match prereq::check(ctx, &self.probes, self.timeout).await {
            Ok(report) => report,
            Err(e) if self.fatal => return StepOutcome::Fatal(e.to_string()),
            Err(e) => return StepOutcome::Warning(e.to_string()),
        };
        let names = |status| {
            report.with_status(status).map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
        };
        if report.fully_ready() {
            StepOutcome::Ok(format!("all {} checks passed", report.checks.len()))
        } else if !report.ready && self.fatal {
            StepOutcome::Fatal(format!("missing required: {}", names(CheckStatus::Missing)))
        } else if !report.ready {
            StepOutcome::Warning(format!(
                "partially ready; missing {}",
                names(CheckStatus::Missing)
            ))
        } else {
            StepOutcome::Warning(format!(
                "ready; optional missing: {}",
                names(CheckStatus::Warning)
            ))
        }
    }
}

impl Step for ReadinessStep {
    fn name(&self) -> &str {
        self.name
    }

    fn run<'a>(&'a self, ctx: &'a ServiceContext) -> StepFuture<'a> {
        Box::pin(self.evaluate(ctx))
    }
}

/// Runs one external command; any failure is a warning.
pub struct CommandStep {
    name: &'static str,
    command: String,
}

impl CommandStep {
    /// Creates a step running `command` through the shell.
    #[must_use]
    pub fn new(name: &'static str, command: String) -> Self {
        Self { name, command }
    }

    /// Generates historical project telemetry into the output directory.
    #[must_use]
    pub fn historical_data(config: &DemoConfig) -> Self {
        Self::new(
            "historical-data",
            format!(
                "contextcore demo generate --project {} --output {}",
                crate::config::DEMO_PROJECT,
                shell_quote(&config.output_dir.display().to_string())
            ),
        )
    }

    /// Loads generated spans into the OTLP endpoint.
    #[must_use]
    pub fn telemetry_load(config: &DemoConfig) -> Self {
        let spans = config.output_dir.join("demo_spans.json");
        Self::new(
            "telemetry-load",
            format!(
                "contextcore demo load --file {} --endpoint {}",
                shell_quote(&spans.display().to_string()),
                shell_quote(&config.endpoints.otlp)
            ),
        )
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

impl Step for CommandStep {
    fn name(&self) -> &str {
        self.name
    }

    fn run<'a>(&'a self, ctx: &'a ServiceContext) -> StepFuture<'a> {
        let outcome = match ctx.shell.run(&self.command) {
            Ok(out) if out.success() => {
                StepOutcome::Ok(out.last_line(false).unwrap_or("done").to_string())
            }
            Ok(out) if out.not_found() => {
                StepOutcome::Warning(format!("command not found: {}", self.command))
            }
            Ok(out) => {
                let reason = out.last_line(true).unwrap_or_default();
                StepOutcome::Warning(format!("exit code {}: {reason}", out.exit_code))
            }
            Err(e) => StepOutcome::Warning(format!("could not run: {e}")),
        };
        Box::pin(async move { outcome })
    }
}

/// POSTs every `*.json` dashboard in a directory to Grafana.
pub struct DashboardImportStep {
    dir: PathBuf,
    url: String,
    auth: BasicAuth,
    timeout: Duration,
}

impl DashboardImportStep {
    /// Imports from `<output_dir>/dashboards` into the configured Grafana.
    #[must_use]
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            dir: config.output_dir.join("dashboards"),
            url: format!("{}/api/dashboards/db", config.endpoints.grafana.trim_end_matches('/')),
            auth: BasicAuth::from(&config.grafana_auth),
            timeout: config.probe_timeout() * 5,
        }
    }

    async fn import(&self, ctx: &ServiceContext) -> StepOutcome {
        if !ctx.fs.exists(&self.dir) {
            return StepOutcome::Warning(format!("no dashboards in {}", self.dir.display()));
        }
        let files = match ctx.fs.list_dir(&self.dir) {
            Ok(names) => names.into_iter().filter(|n| n.ends_with(".json")).collect::<Vec<_>>(),
            Err(e) => {
                return StepOutcome::Warning(format!("cannot list {}: {e}", self.dir.display()));
            }
        };

        let (mut imported, mut failed) = (0usize, 0usize);
        for name in &files {
            match self.import_one(ctx, name).await {
                Ok(()) => {
                    imported += 1;
                    debug!(dashboard = %name, "imported");
                }
                Err(reason) => {
                    failed += 1;
                    warn!(dashboard = %name, %reason, "dashboard import failed");
                }
            }
        }

        let message = format!("{imported} imported, {failed} failed");
        if failed == 0 && imported > 0 {
            StepOutcome::Ok(message)
        } else {
            StepOutcome::Warning(message)
        }
    }

    async fn import_one(&self, ctx: &ServiceContext, name: &str) -> Result<(), String> {
        let path = self.dir.join(name);
        let text = ctx.fs.read_to_string(&path).map_err(|e| e.to_string())?;
        let dashboard: Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;
        let body = import_payload(dashboard);
        let response = ctx
            .http
            .post_json(&self.url, &body, Some(&self.auth), self.timeout)
            .await
            .map_err(|e| e.to_string())?;
        if response.is_success() {
            Ok(())
        } else {
            Err(format!("grafana answered {}", response.status))
        }
    }
}

impl Step for DashboardImportStep {
    fn name(&self) -> &str {
        "dashboard-import"
    }

    fn run<'a>(&'a self, ctx: &'a ServiceContext) -> StepFuture<'a> {
        Box::pin(self.import(ctx))
    }
}

/// Wraps a dashboard model in Grafana's import envelope.
///
/// Files that already carry the envelope are sent as-is with `overwrite`
/// forced on. Bare models lose their numeric `id` so Grafana matches by uid.
fn import_payload(mut dashboard: Value) -> Value {
    if let Some(envelope) = dashboard.as_object_mut().filter(|o| o.contains_key("dashboard")) {
        envelope.insert("overwrite".into(), Value::Bool(true));
        return dashboard;
    }
    if let Some(model) = dashboard.as_object_mut() {
        model.insert("id".into(), Value::Null);
    }
    json!({ "dashboard": dashboard, "overwrite": true, "folderId": 0 })
}

/// Materializes the concept catalog, falling back to the full catalog.
pub struct ConceptTasksStep {
    state_dir: PathBuf,
}

impl ConceptTasksStep {
    /// Writes records into `state_dir`.
    #[must_use]
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }
}

impl Step for ConceptTasksStep {
    fn name(&self) -> &str {
        "concept-tasks"
    }

    fn run<'a>(&'a self, ctx: &'a ServiceContext) -> StepFuture<'a> {
        let materializer = Materializer::new(ctx, &self.state_dir);
        let full = CreateOptions { clean: true, ..CreateOptions::default() };
        let concept = CreateOptions { concept_mode: true, ..full.clone() };
        let outcome = match materializer.create(&concept) {
            Ok(report) => {
                StepOutcome::Ok(format!("{} concept tasks materialized", report.count()))
            }
            Err(e) => {
                warn!(error = %e, "concept materialization failed; falling back to full catalog");
                match materializer.create(&full) {
                    Ok(report) => StepOutcome::Warning(format!(
                        "concept mode failed ({e}); {} full tasks materialized",
                        report.count()
                    )),
                    Err(err) => {
                        StepOutcome::Warning(format!("task materialization failed: {err}"))
                    }
                }
            }
        };
        Box::pin(async move { outcome })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::adapters::memory::{MemoryFileSystem, ScriptedHttp, ScriptedShell};
    use crate::pipeline::Pipeline;
    use crate::ports::FileSystem;

    fn config() -> DemoConfig {
        DemoConfig {
            state_root: "/state".into(),
            output_dir: "/out".into(),
            contextcore_root: "/dev/ContextCore".into(),
            sdk_root: "/dev/startd8-sdk".into(),
            ..DemoConfig::default()
        }
    }

    fn healthy_http() -> ScriptedHttp {
        ScriptedHttp::new()
            .on("http://localhost:3000/api/health", 200)
            .on("http://localhost:3200/ready", 200)
            .on("http://localhost:3100/ready", 200)
            .on("http://localhost:9009/ready", 200)
            .on("http://localhost:3000/api/dashboards/db", 200)
    }

    #[tokio::test]
    async fn gate_is_fatal_without_grafana() {
        let mut ctx = ServiceContext::in_memory();
        ctx.shell = Box::new(ScriptedShell::new().on("contextcore", 0, "contextcore 0.9\n"));

        let outcome = ReadinessStep::gate(&config()).run(&ctx).await;
        assert_eq!(outcome, StepOutcome::Fatal("missing required: grafana_reachable".into()));
    }

    #[tokio::test]
    async fn verification_is_a_warning_when_partial() {
        let mut ctx = ServiceContext::in_memory();
        ctx.shell = Box::new(ScriptedShell::new().on("contextcore", 0, ""));
        ctx.http = Box::new(ScriptedHttp::new().on("http://localhost:3000/api/health", 200));

        let outcome = ReadinessStep::verification(&config()).run(&ctx).await;
        assert!(
            matches!(outcome, StepOutcome::Warning(m) if m.starts_with("ready; optional missing"))
        );
    }

    #[tokio::test]
    async fn missing_generator_is_a_warning() {
        let ctx = ServiceContext::in_memory();
        let outcome = CommandStep::historical_data(&config()).run(&ctx).await;
        assert!(matches!(outcome, StepOutcome::Warning(m) if m.starts_with("command not found")));
    }

    #[test]
    fn paths_are_shell_quoted() {
        let spaced = DemoConfig { output_dir: "/my out".into(), ..config() };
        let step = CommandStep::telemetry_load(&spaced);
        assert_eq!(
            step.command,
            "contextcore demo load --file '/my out/demo_spans.json' --endpoint 'localhost:4317'"
        );
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[tokio::test]
    async fn dashboards_are_posted_and_counted() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("/out/dashboards/a.json"), r#"{"id": 7, "uid": "a"}"#).unwrap();
        fs.write(Path::new("/out/dashboards/b.json"), "{not json").unwrap();
        fs.write(Path::new("/out/dashboards/readme.md"), "ignored").unwrap();
        let http = healthy_http();
        let mut ctx = ServiceContext::in_memory();
        ctx.fs = Box::new(fs);
        ctx.http = Box::new(http.clone());

        let outcome = DashboardImportStep::new(&config()).run(&ctx).await;

        assert_eq!(outcome, StepOutcome::Warning("1 imported, 1 failed".into()));
        let posts = http.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "http://localhost:3000/api/dashboards/db");
        assert_eq!(posts[0].1["dashboard"]["id"], Value::Null);
        assert_eq!(posts[0].1["overwrite"], true);
    }

    #[test]
    fn envelope_is_kept() {
        let payload = import_payload(json!({"dashboard": {"uid": "x"}, "folderId": 3}));
        assert_eq!(payload, json!({"dashboard": {"uid": "x"}, "folderId": 3, "overwrite": true}));
    }

    #[tokio::test]
    async fn concept_tasks_replace_full_tasks() {
        let fs = MemoryFileSystem::new();
        let mut ctx = ServiceContext::in_memory();
        ctx.fs = Box::new(fs.clone());
        let dir = config().state_dir();
        Materializer::new(&ctx, &dir).create(&CreateOptions::default()).unwrap();

        let outcome = ConceptTasksStep::new(dir).run(&ctx).await;
        assert_eq!(outcome, StepOutcome::Ok("7 concept tasks materialized".into()));
        assert_eq!(fs.paths().len(), 7);
    }

    #[tokio::test]
    async fn concept_failure_is_a_warning() {
        let fs = MemoryFileSystem::new();
        fs.deny_writes_under("/state");
        let mut ctx = ServiceContext::in_memory();
        ctx.fs = Box::new(fs);

        let outcome = ConceptTasksStep::new(config().state_dir()).run(&ctx).await;
        assert!(matches!(
            outcome,
            StepOutcome::Warning(m) if m.starts_with("task materialization failed")
        ));
    }

    #[tokio::test]
    async fn full_pipeline_on_a_healthy_machine() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("/dev/ContextCore/README.md"), "").unwrap();
        fs.write(Path::new("/dev/startd8-sdk/scripts/run_contextcore_workflow.py"), "").unwrap();
        fs.write(Path::new("/out/dashboards/portfolio.json"), r#"{"uid": "p"}"#).unwrap();
        let shell = ScriptedShell::new()
            .on("contextcore --version", 0, "contextcore 0.9\n")
            .on("contextcore demo generate", 0, "generated 3 months\n")
            .on("contextcore demo load", 0, "loaded 412 spans\n");
        let mut ctx = ServiceContext::in_memory();
        ctx.fs = Box::new(fs);
        ctx.shell = Box::new(shell.clone());
        ctx.http = Box::new(healthy_http());

        let report = Pipeline::environment(&config()).run(&ctx, |_| {}).await;

        assert!(!report.halted);
        assert_eq!(report.warnings(), 0, "{report:?}");
        assert_eq!(report.steps[2].outcome, StepOutcome::Ok("loaded 412 spans".into()));
        assert_eq!(shell.calls().len(), 4);
    }
}
