//! In-memory and scripted adapters.
//!
//! These stand in for the real machine in unit and integration tests. Each
//! one is cheaply cloneable and shares its state through an `Arc`, so a test
//! can hand a clone to a [`crate::context::ServiceContext`] and keep another
//! to inspect afterwards.

mod filesystem;
mod scripted;

pub use filesystem::MemoryFileSystem;
pub use scripted::{
    FixedClock, ScriptedHttp, ScriptedPrompt, ScriptedShell, ScriptedWorkflow,
    SequentialIdGenerator, StaticEnvironment,
};
