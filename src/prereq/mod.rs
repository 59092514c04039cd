//! Prerequisite checker.
//!
//! Every probe is read-only. A failed probe is a normal result, never an
//! error; [`PrereqError`] is reserved for probes that cannot be evaluated at
//! all, such as a malformed URL.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::config::{DemoConfig, API_KEY_ENV_VAR};
use crate::context::ServiceContext;
use crate::error::PrereqError;
use crate::store::TaskStore;

const VERSION_COMMAND: &str = "contextcore --version";

/// What a probe looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeKind {
    /// Environment variable is set and non-empty.
    EnvVar(String),
    /// Path exists.
    Path(PathBuf),
    /// Shell command exits zero.
    Command(String),
    /// HTTP GET answers 2xx.
    Http(String),
    /// Directory holds at least one task record.
    StateRecords(PathBuf),
}

/// One named dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// Dependency name, e.g. `api_key_set`.
    pub name: String,
    /// Whether a miss makes the environment unready.
    pub required: bool,
    /// What to look at.
    pub kind: ProbeKind,
}

impl Probe {
    /// A probe whose miss makes the environment unready.
    #[must_use]
    pub fn required(name: &str, kind: ProbeKind) -> Self {
        Self { name: name.to_string(), required: true, kind }
    }

    /// A probe whose miss only produces a warning.
    #[must_use]
    pub fn optional(name: &str, kind: ProbeKind) -> Self {
        Self { name: name.to_string(), required: false, kind }
    }
}

/// Tri-state result of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Dependency present.
    Ok,
    /// Optional dependency absent.
    Warning,
    /// Required dependency absent.
    Missing,
}

impl CheckStatus {
    /// Short label for reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Missing => "missing",
        }
    }
}

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Dependency name.
    pub name: String,
    /// Outcome.
    pub status: CheckStatus,
    /// Human-readable detail.
    pub detail: String,
}

/// Aggregate result of a set of probes, in probe order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessReport {
    /// One entry per probe.
    pub checks: Vec<CheckResult>,
    /// `false` when any required dependency is missing.
    pub ready: bool,
}

impl ReadinessReport {
    /// Looks up a result by dependency name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Returns `true` when `name` was probed and found.
    #[must_use]
    pub fn is_ok(&self, name: &str) -> bool {
        self.get(name).is_some_and(|c| c.status == CheckStatus::Ok)
    }

    /// Results with the given status.
    pub fn with_status(&self, status: CheckStatus) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(move |c| c.status == status)
    }

    /// Returns `true` when every probe passed.
    #[must_use]
    pub fn fully_ready(&self) -> bool {
        self.checks.iter().all(|c| c.status == CheckStatus::Ok)
    }

    /// Renders the report as an aligned table followed by a verdict line.
    #[must_use]
    pub fn render(&self) -> String {
        let width = self.checks.iter().map(|c| c.name.len()).max().unwrap_or(0);
        let mut out = String::new();
        for check in &self.checks {
            let _ = writeln!(
                out,
                "  [{:<7}] {:<width$}  {}",
                check.status.label(),
                check.name,
                check.detail
            );
        }
        let missing: Vec<_> =
            self.with_status(CheckStatus::Missing).map(|c| c.name.as_str()).collect();
        if self.ready {
            let _ = writeln!(out, "Ready.");
        } else {
            let _ = writeln!(out, "Not ready: missing {}", missing.join(", "));
        }
        out
    }
}

/// Probes run by the demo runner before dispatching tasks.
#[must_use]
pub fn runner_probes(config: &DemoConfig) -> Vec<Probe> {
    let grafana = health_url(&config.endpoints.grafana, "api/health");
    let tempo = health_url(&config.endpoints.tempo, "ready");
    vec![
        Probe::required("contextcore_installed", ProbeKind::Command(VERSION_COMMAND.into())),
        Probe::required("sdk_installed", workflow_probe(config)),
        Probe::required("api_key_set", ProbeKind::EnvVar(API_KEY_ENV_VAR.into())),
        Probe::required("tasks_exist", ProbeKind::StateRecords(config.state_dir())),
        Probe::optional("grafana_reachable", ProbeKind::Http(grafana)),
        Probe::optional("tempo_reachable", ProbeKind::Http(tempo)),
    ]
}

/// Probes run by the environment pipeline, before and after setup.
#[must_use]
pub fn environment_probes(config: &DemoConfig) -> Vec<Probe> {
    let endpoints = &config.endpoints;
    vec![
        Probe::required("contextcore_installed", ProbeKind::Command(VERSION_COMMAND.into())),
        Probe::required(
            "grafana_reachable",
            ProbeKind::Http(health_url(&endpoints.grafana, "api/health")),
        ),
        Probe::optional("tempo_reachable", ProbeKind::Http(health_url(&endpoints.tempo, "ready"))),
        Probe::optional("loki_reachable", ProbeKind::Http(health_url(&endpoints.loki, "ready"))),
        Probe::optional("mimir_reachable", ProbeKind::Http(health_url(&endpoints.mimir, "ready"))),
        Probe::optional("contextcore_root", ProbeKind::Path(config.contextcore_root.clone())),
        Probe::optional("sdk_installed", workflow_probe(config)),
    ]
}

/// A configured engine program must resolve on `PATH`; otherwise the SDK
/// script must exist.
fn workflow_probe(config: &DemoConfig) -> ProbeKind {
    match &config.workflow.program {
        Some(program) => {
            ProbeKind::Command(format!("command -v '{}'", program.replace('\'', r"'\''")))
        }
        None => ProbeKind::Path(config.workflow_script()),
    }
}

fn health_url(base: &str, path: &str) -> String {
    format!("{}/{path}", base.trim_end_matches('/'))
}

/// Runs every probe and aggregates the results.
///
/// URLs are validated up front, so a malformed probe fails before anything
/// is contacted.
///
/// # Errors
///
/// Returns [`PrereqError::InvalidProbe`] for an HTTP probe whose URL does not
/// parse or is not `http`/`https`.
pub async fn check(
    ctx: &ServiceContext,
    probes: &[Probe],
    timeout: Duration,
) -> Result<ReadinessReport, PrereqError> {
    for probe in probes {
        if let ProbeKind::Http(url) = &probe.kind {
            validate_url(&probe.name, url)?;
        }
    }

    let mut checks = Vec::with_capacity(probes.len());
    for probe in probes {
        let (found, detail) = evaluate(ctx, &probe.kind, timeout).await;
        let status = match (found, probe.required) {
            (true, _) => CheckStatus::Ok,
            (false, true) => CheckStatus::Missing,
            (false, false) => CheckStatus::Warning,
        };
        debug!(probe = %probe.name, status = status.label(), %detail, "probe");
        checks.push(CheckResult { name: probe.name.clone(), status, detail });
    }
    let ready = checks.iter().all(|c| c.status != CheckStatus::Missing);
    Ok(ReadinessReport { checks, ready })
}

fn validate_url(name: &str, url: &str) -> Result<(), PrereqError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| PrereqError::InvalidProbe {
        name: name.to_string(),
        message: format!("{url}: {e}"),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(PrereqError::InvalidProbe {
            name: name.to_string(),
            message: format!("{url}: unsupported scheme {other}"),
        }),
    }
}

async fn evaluate(ctx: &ServiceContext, kind: &ProbeKind, timeout: Duration) -> (bool, String) {
    match kind {
        ProbeKind::EnvVar(key) => {
            if ctx.env.var(key).is_some() {
                (true, format!("{key} is set"))
            } else {
                (false, format!("{key} is not set"))
            }
        }
        ProbeKind::Path(path) => {
            let found = ctx.fs.exists(path);
            let verb = if found { "found" } else { "not found" };
            (found, format!("{} {verb}", path.display()))
        }
        ProbeKind::Command(command) => match ctx.shell.run(command) {
            Ok(out) if out.success() => {
                (true, out.first_line().unwrap_or(command.as_str()).to_string())
            }
            Ok(out) if out.not_found() => (false, format!("`{command}` not found on PATH")),
            Ok(out) => (false, format!("`{command}` exited with {}", out.exit_code)),
            Err(e) => (false, format!("`{command}` could not run: {e}")),
        },
        ProbeKind::Http(url) => match ctx.http.get(url, timeout).await {
            Ok(resp) if resp.is_success() => (true, format!("{url} ({})", resp.status)),
            Ok(resp) => (false, format!("{url} answered {}", resp.status)),
            Err(e) => (false, format!("{url} unreachable: {e}")),
        },
        ProbeKind::StateRecords(dir) => match TaskStore::new(ctx, dir).list_ids() {
            Ok(ids) if !ids.is_empty() => {
                (true, format!("{} task record(s) in {}", ids.len(), dir.display()))
            }
            Ok(_) => (false, format!("no task records in {} (run task-setup)", dir.display())),
            Err(e) => (false, e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::adapters::memory::{
        MemoryFileSystem, ScriptedHttp, ScriptedShell, StaticEnvironment,
    };
    use crate::ports::FileSystem;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn config() -> DemoConfig {
        DemoConfig {
            state_root: "/state".into(),
            sdk_root: "/sdk".into(),
            ..DemoConfig::default()
        }
    }

    fn healthy_context(env: StaticEnvironment) -> ServiceContext {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("/sdk/scripts/run_contextcore_workflow.py"), "").unwrap();
        fs.write(Path::new("/state/ecosystem-demo/DEMO-P0-EPIC.json"), "{}").unwrap();
        let mut ctx = ServiceContext::in_memory();
        ctx.fs = Box::new(fs);
        ctx.env = Box::new(env);
        ctx.shell =
            Box::new(ScriptedShell::new().on(VERSION_COMMAND, 0, "contextcore 0.9.1\n"));
        ctx.http = Box::new(
            ScriptedHttp::new()
                .on("http://localhost:3000/api/health", 200)
                .on("http://localhost:3200/ready", 200),
        );
        ctx
    }

    #[tokio::test]
    async fn everything_present_is_ready() {
        let ctx = healthy_context(StaticEnvironment::new().with(API_KEY_ENV_VAR, "sk-test"));
        let report = check(&ctx, &runner_probes(&config()), TIMEOUT).await.unwrap();
        assert!(report.ready);
        assert!(report.fully_ready());
        assert_eq!(report.get("contextcore_installed").unwrap().detail, "contextcore 0.9.1");
        assert_eq!(
            report.get("tasks_exist").unwrap().detail,
            "1 task record(s) in /state/ecosystem-demo"
        );
    }

    #[tokio::test]
    async fn unset_api_key_is_missing_and_unready() {
        let ctx = healthy_context(StaticEnvironment::new());
        let report = check(&ctx, &runner_probes(&config()), TIMEOUT).await.unwrap();

        assert!(!report.ready);
        let key = report.get("api_key_set").unwrap();
        assert_eq!(key.status, CheckStatus::Missing);
        assert!(key.detail.contains("ANTHROPIC_API_KEY"));
        assert!(report.render().contains("Not ready: missing api_key_set"));
    }

    #[tokio::test]
    async fn only_optional_missing_is_ready_with_one_warning() {
        let mut ctx = healthy_context(StaticEnvironment::new().with(API_KEY_ENV_VAR, "sk-test"));
        ctx.http = Box::new(ScriptedHttp::new().on("http://localhost:3000/api/health", 200));

        let report = check(&ctx, &runner_probes(&config()), TIMEOUT).await.unwrap();
        assert!(report.ready);
        assert!(!report.fully_ready());
        let warnings: Vec<_> =
            report.with_status(CheckStatus::Warning).map(|c| c.name.as_str()).collect();
        assert_eq!(warnings, ["tempo_reachable"]);
    }

    #[tokio::test]
    async fn non_2xx_health_is_a_miss_not_an_error() {
        let mut ctx = healthy_context(StaticEnvironment::new());
        ctx.http = Box::new(ScriptedHttp::new().on("http://localhost:3000/api/health", 503));
        let report = check(&ctx, &environment_probes(&config()), TIMEOUT).await.unwrap();
        assert_eq!(report.get("grafana_reachable").unwrap().status, CheckStatus::Missing);
    }

    #[tokio::test]
    async fn malformed_url_is_a_machinery_error_before_any_probe() {
        let http = ScriptedHttp::new();
        let mut ctx = ServiceContext::in_memory();
        ctx.http = Box::new(http.clone());
        let probes = [
            Probe::optional("good", ProbeKind::Http("http://localhost:3000/api/health".into())),
            Probe::optional("bad", ProbeKind::Http("not a url".into())),
        ];

        let err = check(&ctx, &probes, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, PrereqError::InvalidProbe { ref name, .. } if name == "bad"));
        assert!(http.gets().is_empty());
    }

    #[test]
    fn health_urls_tolerate_trailing_slash() {
        assert_eq!(health_url("http://g:3000/", "api/health"), "http://g:3000/api/health");
    }

    #[tokio::test]
    async fn configured_engine_replaces_the_sdk_script_check() {
        let mut config = config();
        config.workflow.program = Some("/opt/engine/run".into());
        let mut ctx = healthy_context(StaticEnvironment::new().with(API_KEY_ENV_VAR, "sk-test"));
        ctx.fs = Box::new(MemoryFileSystem::new());
        ctx.fs.write(Path::new("/state/ecosystem-demo/DEMO-P0-EPIC.json"), "{}").unwrap();
        ctx.shell = Box::new(
            ScriptedShell::new()
                .on(VERSION_COMMAND, 0, "contextcore 0.9.1\n")
                .on("command -v '/opt/engine/run'", 0, "/opt/engine/run\n"),
        );

        let report = check(&ctx, &runner_probes(&config), TIMEOUT).await.unwrap();
        let sdk = report.get("sdk_installed").unwrap();
        assert_eq!(sdk.status, CheckStatus::Ok);
        assert_eq!(sdk.detail, "/opt/engine/run");
        assert!(report.ready);
    }
}
