//! Service context bundling all port trait objects.

use crate::adapters::live::clock::SystemClock;
use crate::adapters::live::environment::LiveEnvironment;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::http::LiveHttpClient;
use crate::adapters::live::id_gen::LiveIdGenerator;
use crate::adapters::live::prompt::StdinPrompt;
use crate::adapters::live::shell::LiveShellExecutor;
use crate::adapters::live::workflow::CommandWorkflowEngine;
use crate::adapters::memory::{
    FixedClock, MemoryFileSystem, ScriptedHttp, ScriptedPrompt, ScriptedShell, ScriptedWorkflow,
    SequentialIdGenerator, StaticEnvironment,
};
use crate::config::DemoConfig;
use crate::ports::{
    Clock, Environment, FileSystem, HttpClient, IdGenerator, Prompt, ShellExecutor, WorkflowEngine,
};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Components take a
/// `&ServiceContext` instead of reaching for globals, so tests swap in the
/// in-memory adapters field by field.
pub struct ServiceContext {
    /// Clock for record timestamps.
    pub clock: Box<dyn Clock>,
    /// Filesystem holding the task-state directory.
    pub fs: Box<dyn FileSystem>,
    /// Shell executor for CLI probes and external generators.
    pub shell: Box<dyn ShellExecutor>,
    /// Trace and span id generator.
    pub id_gen: Box<dyn IdGenerator>,
    /// HTTP client for health probes and dashboard import.
    pub http: Box<dyn HttpClient>,
    /// Process environment.
    pub env: Box<dyn Environment>,
    /// External workflow engine.
    pub workflow: Box<dyn WorkflowEngine>,
    /// Interactive confirmation.
    pub prompt: Box<dyn Prompt>,
}

impl ServiceContext {
    /// Creates a context backed by the real machine.
    #[must_use]
    pub fn live(config: &DemoConfig) -> Self {
        let (program, args) = config.workflow_command();
        Self {
            clock: Box::new(SystemClock),
            fs: Box::new(LiveFileSystem),
            shell: Box::new(LiveShellExecutor),
            id_gen: Box::new(LiveIdGenerator::new()),
            http: Box::new(LiveHttpClient::new()),
            env: Box::new(LiveEnvironment),
            workflow: Box::new(CommandWorkflowEngine::new(program, args)),
            prompt: Box::new(StdinPrompt),
        }
    }

    /// Creates a context where nothing leaves the process.
    ///
    /// The filesystem starts empty, every shell command is "not found", every
    /// HTTP request is refused, the environment is empty, every workflow call
    /// succeeds, and confirmations are accepted. Tests replace individual
    /// fields to script other behavior.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            clock: Box::new(FixedClock::default()),
            fs: Box::new(MemoryFileSystem::new()),
            shell: Box::new(ScriptedShell::new()),
            id_gen: Box::new(SequentialIdGenerator::default()),
            http: Box::new(ScriptedHttp::new()),
            env: Box::new(StaticEnvironment::new()),
            workflow: Box::new(ScriptedWorkflow::new()),
            prompt: Box::new(ScriptedPrompt(true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn in_memory_context_is_isolated() {
        let ctx = ServiceContext::in_memory();
        assert!(!ctx.fs.exists(Path::new("/")));
        assert!(ctx.env.var("HOME").is_none());
        assert!(!ctx.shell.run("contextcore --version").unwrap().success());
        assert!(ctx.prompt.confirm("go?"));
    }

    #[test]
    fn in_memory_ids_have_span_widths() {
        let ctx = ServiceContext::in_memory();
        assert_eq!(ctx.id_gen.trace_id().len(), 32);
        assert_eq!(ctx.id_gen.span_id().len(), 16);
    }
}
