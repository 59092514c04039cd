//! Demo configuration.
//!
//! Resolution order: built-in defaults, then an optional YAML file, then
//! environment variables. CLI flags are applied last by the command layer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::{BasicAuth, Environment, FileSystem};

/// Project id every demo record is scoped to.
pub const DEMO_PROJECT: &str = "ecosystem-demo";
/// Sprint id stamped on every demo record.
pub const DEMO_SPRINT: &str = "demo-sprint-1";

/// Environment variable naming an optional YAML config file.
pub const CONFIG_ENV_VAR: &str = "CONTEXTCORE_DEMO_CONFIG";
/// Environment variable overriding the state root directory.
pub const STATE_DIR_ENV_VAR: &str = "CONTEXTCORE_STATE_DIR";
/// Environment variable that must hold the lead agent's API key.
pub const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {message}")]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// The config file is not valid YAML for [`DemoConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Base URLs of the observability backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Grafana base URL.
    pub grafana: String,
    /// Tempo base URL.
    pub tempo: String,
    /// Loki base URL.
    pub loki: String,
    /// Mimir base URL.
    pub mimir: String,
    /// OTLP gRPC endpoint telemetry is loaded into.
    pub otlp: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            grafana: "http://localhost:3000".into(),
            tempo: "http://localhost:3200".into(),
            loki: "http://localhost:3100".into(),
            mimir: "http://localhost:9009".into(),
            otlp: "localhost:4317".into(),
        }
    }
}

/// Grafana credentials used for dashboard import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrafanaAuth {
    /// Grafana user.
    pub user: String,
    /// Grafana password.
    pub password: String,
}

impl Default for GrafanaAuth {
    fn default() -> Self {
        Self { user: "admin".into(), password: "admin".into() }
    }
}

impl From<&GrafanaAuth> for BasicAuth {
    fn from(auth: &GrafanaAuth) -> Self {
        Self { user: auth.user.clone(), password: auth.password.clone() }
    }
}

/// How the external workflow engine is launched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Program to execute; `None` means `python3 <sdk_root>/scripts/run_contextcore_workflow.py`.
    pub program: Option<String>,
    /// Leading arguments, used only together with `program`.
    pub args: Vec<String>,
    /// Per-task wall-clock bound in seconds.
    pub timeout_secs: Option<u64>,
}

/// Lead/drafter agent specs handed to the workflow engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Lead agent spec.
    pub lead: String,
    /// Drafter agent spec.
    pub drafter: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            lead: "anthropic:claude-sonnet-4-20250514".into(),
            drafter: "openai:gpt-4o-mini".into(),
        }
    }
}

/// Fully resolved demo configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Directory holding one sub-directory of task records per project.
    pub state_root: PathBuf,
    /// Directory the sibling repositories are checked out in.
    pub dev_root: PathBuf,
    /// ContextCore checkout.
    pub contextcore_root: PathBuf,
    /// Workflow SDK checkout.
    pub sdk_root: PathBuf,
    /// Where generated telemetry, dashboards, and workflow logs live.
    pub output_dir: PathBuf,
    /// Backend URLs.
    pub endpoints: Endpoints,
    /// Grafana credentials.
    pub grafana_auth: GrafanaAuth,
    /// Timeout for each health probe, in seconds.
    pub probe_timeout_secs: u64,
    /// Workflow engine launch settings.
    pub workflow: WorkflowConfig,
    /// Agent specs.
    pub agents: AgentConfig,
    /// Default bound on review iterations.
    pub max_iterations: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let dev_root = default_dev_root();
        Self {
            state_root: PathBuf::from(".contextcore").join("state"),
            contextcore_root: dev_root.join("ContextCore"),
            sdk_root: dev_root.join("startd8-sdk"),
            output_dir: repo_root().join("output"),
            dev_root,
            endpoints: Endpoints::default(),
            grafana_auth: GrafanaAuth::default(),
            probe_timeout_secs: 3,
            workflow: WorkflowConfig::default(),
            agents: AgentConfig::default(),
            max_iterations: 3,
        }
    }
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn default_dev_root() -> PathBuf {
    repo_root().parent().map_or_else(repo_root, Path::to_path_buf)
}

impl DemoConfig {
    /// Loads configuration from an optional file plus the environment.
    ///
    /// `explicit` wins over `CONTEXTCORE_DEMO_CONFIG`. A named file that does
    /// not exist is an error; no file at all means defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(
        env: &dyn Environment,
        fs: &dyn FileSystem,
        explicit: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env.var(CONFIG_ENV_VAR).map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                let text = fs
                    .read_to_string(&path)
                    .map_err(|e| ConfigError::Read { path: path.clone(), message: e.to_string() })?;
                serde_yaml::from_str::<Self>(&text)
                    .map_err(|source| ConfigError::Parse { path, source })?
            }
            None => Self::default(),
        };
        // A relative state root is anchored at the user's home directory.
        if config.state_root.is_relative() {
            if let Some(home) = env.var("HOME").or_else(|| env.var("USERPROFILE")) {
                config.state_root = PathBuf::from(home).join(&config.state_root);
            }
        }
        config.apply_env(env);
        Ok(config)
    }

    fn apply_env(&mut self, env: &dyn Environment) {
        if let Some(dir) = env.var(STATE_DIR_ENV_VAR) {
            self.state_root = PathBuf::from(dir);
        }
        if let Some(root) = env.var("CONTEXTCORE_DEV_ROOT") {
            self.dev_root = PathBuf::from(root);
            self.contextcore_root = self.dev_root.join("ContextCore");
            self.sdk_root = self.dev_root.join("startd8-sdk");
        }
        if let Some(root) = env.var("CONTEXTCORE_ROOT") {
            self.contextcore_root = PathBuf::from(root);
        }
        if let Some(root) = env.var("STARTD8_SDK_ROOT") {
            self.sdk_root = PathBuf::from(root);
        }
        if let Some(url) = env.var("GRAFANA_URL") {
            self.endpoints.grafana = url;
        }
        if let Some(user) = env.var("GRAFANA_USER") {
            self.grafana_auth.user = user;
        }
        if let Some(password) = env.var("GRAFANA_PASSWORD") {
            self.grafana_auth.password = password;
        }
    }

    /// Directory holding this demo's task records.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.state_root.join(DEMO_PROJECT)
    }

    /// Path of the SDK script that runs one task through the workflow.
    #[must_use]
    pub fn workflow_script(&self) -> PathBuf {
        self.sdk_root.join("scripts").join("run_contextcore_workflow.py")
    }

    /// Program and leading arguments used to launch the workflow engine.
    #[must_use]
    pub fn workflow_command(&self) -> (String, Vec<String>) {
        match &self.workflow.program {
            Some(program) => (program.clone(), self.workflow.args.clone()),
            None => {
                ("python3".to_string(), vec![self.workflow_script().display().to_string()])
            }
        }
    }

    /// Per-probe timeout.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Per-task workflow timeout, if one is configured.
    #[must_use]
    pub fn workflow_timeout(&self) -> Option<Duration> {
        self.workflow.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryFileSystem, StaticEnvironment};

    #[test]
    fn defaults_put_state_under_home() {
        let env = StaticEnvironment::new().with("HOME", "/home/demo");
        let config = DemoConfig::load(&env, &MemoryFileSystem::new(), None).unwrap();
        assert_eq!(
            config.state_dir(),
            PathBuf::from("/home/demo/.contextcore/state/ecosystem-demo")
        );
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.agents.drafter, "openai:gpt-4o-mini");
    }

    #[test]
    fn environment_overrides_roots() {
        let env = StaticEnvironment::new()
            .with(STATE_DIR_ENV_VAR, "/tmp/state")
            .with("CONTEXTCORE_DEV_ROOT", "/dev")
            .with("STARTD8_SDK_ROOT", "/opt/sdk");
        let config = DemoConfig::load(&env, &MemoryFileSystem::new(), None).unwrap();
        assert_eq!(config.state_root, PathBuf::from("/tmp/state"));
        assert_eq!(config.contextcore_root, PathBuf::from("/dev/ContextCore"));
        assert_eq!(
            config.workflow_script(),
            PathBuf::from("/opt/sdk/scripts/run_contextcore_workflow.py")
        );
    }

    #[test]
    fn yaml_file_fills_partial_fields() {
        let fs = MemoryFileSystem::new();
        fs.write(
            Path::new("/cfg/demo.yaml"),
            "endpoints:\n  grafana: http://grafana:3000\n\
             workflow:\n  program: ./fake\n  timeout_secs: 30\n",
        )
        .unwrap();
        let env = StaticEnvironment::new().with(CONFIG_ENV_VAR, "/cfg/demo.yaml");
        let config = DemoConfig::load(&env, &fs, None).unwrap();

        assert_eq!(config.endpoints.grafana, "http://grafana:3000");
        assert_eq!(config.endpoints.tempo, "http://localhost:3200");
        assert_eq!(config.workflow_command(), ("./fake".to_string(), vec![]));
        assert_eq!(config.workflow_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = DemoConfig::load(
            &StaticEnvironment::new(),
            &MemoryFileSystem::new(),
            Some(Path::new("/nope.yaml")),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("/bad.yaml"), "max_iterations: [oops").unwrap();
        let err = DemoConfig::load(&StaticEnvironment::new(), &fs, Some(Path::new("/bad.yaml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
