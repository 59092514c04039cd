//! Live adapter for the `WorkflowEngine` port.
//!
//! Shells out to the SDK's workflow script once per task and waits for it,
//! optionally under a timeout. Everything the engine does internally (lead
//! and drafter agents, review iterations) is opaque here.

use std::process::Stdio;

use tokio::process::Command;

use crate::ports::workflow::{
    WorkflowEngine, WorkflowError, WorkflowFuture, WorkflowOutput, WorkflowRequest,
};

/// Environment variable through which the rendered prompt is handed over.
pub const PROMPT_ENV_VAR: &str = "CONTEXTCORE_TASK_PROMPT";

/// Runs `program args… --from-contextcore …` as a child process.
pub struct CommandWorkflowEngine {
    program: String,
    args: Vec<String>,
}

impl CommandWorkflowEngine {
    /// Creates an engine that invokes `program` with the given leading `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// Builds the full argument list for one request.
    #[must_use]
    pub fn arguments(&self, request: &WorkflowRequest) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--from-contextcore".to_string(),
            "--project-id".to_string(),
            request.project_id.clone(),
            "--sprint-id".to_string(),
            request.sprint_id.clone(),
            "--task-id".to_string(),
            request.task_id.clone(),
            "--lead-agent".to_string(),
            request.lead_agent.clone(),
            "--drafter-agent".to_string(),
            request.drafter_agent.clone(),
            "--max-iterations".to_string(),
            request.max_iterations.to_string(),
            "--yes".to_string(),
        ]);
        args
    }
}

impl WorkflowEngine for CommandWorkflowEngine {
    fn execute(&self, request: &WorkflowRequest) -> WorkflowFuture<'_> {
        let args = self.arguments(request);
        let prompt = request.prompt.clone();
        let timeout = request.timeout;
        let task_id = request.task_id.clone();

        Box::pin(async move {
            let mut command = Command::new(&self.program);
            command
                .args(&args)
                .env(PROMPT_ENV_VAR, &prompt)
                .stdin(Stdio::null())
                .kill_on_drop(true);

            tracing::debug!(task_id = %task_id, program = %self.program, "dispatching workflow");
            let child = command.output();
            let output = match timeout {
                Some(limit) => tokio::time::timeout(limit, child)
                    .await
                    .map_err(|_| WorkflowError::Timeout(limit))?,
                None => child.await,
            }
            .map_err(|e| WorkflowError::Failed(format!("failed to start {}: {e}", self.program)))?;

            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            if output.status.success() {
                Ok(WorkflowOutput { log: stdout })
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let detail = stderr.lines().last().unwrap_or("no stderr output").trim().to_string();
                Err(WorkflowError::Failed(format!(
                    "exit code {}: {detail}",
                    output.status.code().unwrap_or(-1)
                )))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn request(timeout: Option<Duration>) -> WorkflowRequest {
        WorkflowRequest {
            task_id: "DEMO-P1-ALERTS".into(),
            project_id: "ecosystem-demo".into(),
            sprint_id: "demo-sprint-1".into(),
            prompt: "do the thing".into(),
            lead_agent: "anthropic:lead".into(),
            drafter_agent: "openai:drafter".into(),
            max_iterations: 2,
            timeout,
        }
    }

    #[test]
    fn arguments_carry_task_and_agents() {
        let engine = CommandWorkflowEngine::new("python3", vec!["run.py".into()]);
        let args = engine.arguments(&request(None));
        assert_eq!(args[0], "run.py");
        assert!(args.windows(2).any(|w| w == ["--task-id", "DEMO-P1-ALERTS"]));
        assert!(args.windows(2).any(|w| w == ["--max-iterations", "2"]));
        assert_eq!(args.last().map(String::as_str), Some("--yes"));
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let engine = CommandWorkflowEngine::new("sh", vec!["-c".into(), "echo ok".into()]);
        let output = engine.execute(&request(None)).await.unwrap();
        assert_eq!(output.log.trim(), "ok");
    }

    #[tokio::test]
    async fn nonzero_exit_is_failure() {
        let engine =
            CommandWorkflowEngine::new("sh", vec!["-c".into(), "echo boom >&2; exit 3".into()]);
        let err = engine.execute(&request(None)).await.unwrap_err();
        assert_eq!(err, WorkflowError::Failed("exit code 3: boom".into()));
    }

    #[tokio::test]
    async fn slow_engine_times_out() {
        let engine = CommandWorkflowEngine::new("sh", vec!["-c".into(), "sleep 5".into()]);
        let err = engine.execute(&request(Some(Duration::from_millis(100)))).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Timeout(_)));
    }

    #[tokio::test]
    async fn missing_program_is_failure() {
        let engine = CommandWorkflowEngine::new("/nonexistent/workflow-bin", vec![]);
        let err = engine.execute(&request(None)).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Failed(_)));
    }
}
