//! Scripted stand-ins for the non-filesystem ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::ports::http::{BasicAuth, HttpClient, HttpFuture, HttpResponse};
use crate::ports::shell::{ShellExecutor, ShellOutput};
use crate::ports::workflow::{
    WorkflowEngine, WorkflowError, WorkflowFuture, WorkflowOutput, WorkflowRequest,
};
use crate::ports::{Clock, Environment, IdGenerator, PortError, Prompt};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock frozen at a single instant.
#[derive(Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(Utc.with_ymd_and_hms(2025, 3, 15, 14, 30, 0).single().unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Produces `000…001`, `000…002`, … for trace and span ids.
#[derive(Clone, Default)]
pub struct SequentialIdGenerator {
    next: Arc<AtomicU64>,
}

impl IdGenerator for SequentialIdGenerator {
    fn trace_id(&self) -> String {
        format!("{:032x}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn span_id(&self) -> String {
        format!("{:016x}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Fixed set of environment variables.
#[derive(Clone, Default)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
}

impl StaticEnvironment {
    /// Creates an environment with no variables set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for StaticEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.trim().is_empty()).cloned()
    }
}

/// Shell whose commands resolve to canned outputs.
///
/// Commands are matched by prefix in registration order; unmatched commands
/// behave like a missing program (exit 127).
#[derive(Clone, Default)]
pub struct ScriptedShell {
    responses: Arc<Mutex<Vec<(String, ShellOutput)>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedShell {
    /// Creates a shell where every command is "not found".
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes commands starting with `prefix` exit with `exit_code`.
    #[must_use]
    pub fn on(self, prefix: &str, exit_code: i32, stdout: &str) -> Self {
        lock(&self.responses).push((
            prefix.to_string(),
            ShellOutput { exit_code, stdout: stdout.to_string(), stderr: String::new() },
        ));
        self
    }

    /// Returns every command run so far.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

impl ShellExecutor for ScriptedShell {
    fn run(&self, command: &str) -> Result<ShellOutput, PortError> {
        lock(&self.calls).push(command.to_string());
        let responses = lock(&self.responses);
        Ok(responses
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map_or_else(
                || ShellOutput {
                    exit_code: 127,
                    stdout: String::new(),
                    stderr: format!("sh: {command}: not found"),
                },
                |(_, out)| out.clone(),
            ))
    }
}

/// HTTP client with canned status codes per URL.
///
/// Unregistered URLs fail like a refused connection.
#[derive(Clone, Default)]
pub struct ScriptedHttp {
    statuses: Arc<Mutex<HashMap<String, u16>>>,
    posts: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    gets: Arc<Mutex<Vec<String>>>,
}

impl ScriptedHttp {
    /// Creates a client for which every request fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes requests to exactly `url` answer with `status`.
    #[must_use]
    pub fn on(self, url: &str, status: u16) -> Self {
        lock(&self.statuses).insert(url.to_string(), status);
        self
    }

    /// Returns every URL fetched with GET so far.
    #[must_use]
    pub fn gets(&self) -> Vec<String> {
        lock(&self.gets).clone()
    }

    /// Returns every POST so far as `(url, body)`.
    #[must_use]
    pub fn posts(&self) -> Vec<(String, serde_json::Value)> {
        lock(&self.posts).clone()
    }

    fn answer(&self, url: &str) -> Result<HttpResponse, PortError> {
        lock(&self.statuses)
            .get(url)
            .map(|&status| HttpResponse { status, body: String::new() })
            .ok_or_else(|| format!("connection refused: {url}").into())
    }
}

impl HttpClient for ScriptedHttp {
    fn get(&self, url: &str, _timeout: Duration) -> HttpFuture<'_> {
        lock(&self.gets).push(url.to_string());
        let result = self.answer(url);
        Box::pin(async move { result })
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        _auth: Option<&BasicAuth>,
        _timeout: Duration,
    ) -> HttpFuture<'_> {
        lock(&self.posts).push((url.to_string(), body.clone()));
        let result = self.answer(url);
        Box::pin(async move { result })
    }
}

/// Workflow engine with canned per-task results.
///
/// Tasks without a scripted result succeed with an empty log.
#[derive(Clone, Default)]
pub struct ScriptedWorkflow {
    results: Arc<Mutex<HashMap<String, Result<WorkflowOutput, WorkflowError>>>>,
    requests: Arc<Mutex<Vec<WorkflowRequest>>>,
}

impl ScriptedWorkflow {
    /// Creates an engine on which every task succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `task_id` fail with `error`.
    #[must_use]
    pub fn failing(self, task_id: &str, error: WorkflowError) -> Self {
        lock(&self.results).insert(task_id.to_string(), Err(error));
        self
    }

    /// Makes `task_id` succeed with the given log text.
    #[must_use]
    pub fn succeeding_with(self, task_id: &str, log: &str) -> Self {
        lock(&self.results).insert(task_id.to_string(), Ok(WorkflowOutput { log: log.into() }));
        self
    }

    /// Returns every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<WorkflowRequest> {
        lock(&self.requests).clone()
    }
}

impl WorkflowEngine for ScriptedWorkflow {
    fn execute(&self, request: &WorkflowRequest) -> WorkflowFuture<'_> {
        lock(&self.requests).push(request.clone());
        let result = lock(&self.results)
            .get(&request.task_id)
            .cloned()
            .unwrap_or_else(|| Ok(WorkflowOutput::default()));
        Box::pin(async move { result })
    }
}

/// Prompt that always gives the same answer.
#[derive(Clone, Copy)]
pub struct ScriptedPrompt(pub bool);

impl Prompt for ScriptedPrompt {
    fn confirm(&self, _question: &str) -> bool {
        self.0
    }
}
