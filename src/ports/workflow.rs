//! Workflow engine port for the external multi-agent task executor.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed future type alias used by [`WorkflowEngine`] to keep the trait dyn-compatible.
pub type WorkflowFuture<'a> =
    Pin<Box<dyn Future<Output = Result<WorkflowOutput, WorkflowError>> + Send + 'a>>;

/// Everything the engine needs to execute one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRequest {
    /// Task id being executed.
    pub task_id: String,
    /// Owning project id.
    pub project_id: String,
    /// Owning sprint id.
    pub sprint_id: String,
    /// Rendered prompt handed to the lead agent.
    pub prompt: String,
    /// Lead agent spec, e.g. `anthropic:claude-sonnet-4-20250514`.
    pub lead_agent: String,
    /// Drafter agent spec, e.g. `openai:gpt-4o-mini`.
    pub drafter_agent: String,
    /// Upper bound on the engine's internal review cycles.
    pub max_iterations: u32,
    /// Wall-clock bound on the call, if any.
    pub timeout: Option<Duration>,
}

/// Output of a workflow call that completed successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOutput {
    /// Captured log/artifact text.
    pub log: String,
}

/// Failure modes of a single workflow call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The engine ran and reported failure, or could not be started.
    #[error("workflow failed: {0}")]
    Failed(String),
    /// The call exceeded its configured bound.
    #[error("workflow timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Executes one task through the external workflow engine.
///
/// The engine's own retry and review loop is opaque; each call is a single
/// blocking unit that either succeeds or fails.
pub trait WorkflowEngine: Send + Sync {
    /// Runs the task described by `request`.
    fn execute(&self, request: &WorkflowRequest) -> WorkflowFuture<'_>;
}
