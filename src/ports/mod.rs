//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the demo tooling and something
//! it does not own: time, the state directory, the shell, identifier
//! generation, HTTP health endpoints, process environment, the external
//! workflow engine, and the operator at the terminal. Implementations live
//! in `src/adapters/`.

pub mod clock;
pub mod environment;
pub mod filesystem;
pub mod http;
pub mod id_gen;
pub mod prompt;
pub mod shell;
pub mod workflow;

/// Boxed error type shared by every port method.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

pub use clock::Clock;
pub use environment::Environment;
pub use filesystem::FileSystem;
pub use http::{BasicAuth, HttpClient, HttpFuture, HttpResponse};
pub use id_gen::IdGenerator;
pub use prompt::Prompt;
pub use shell::{ShellExecutor, ShellOutput};
pub use workflow::{WorkflowEngine, WorkflowError, WorkflowFuture, WorkflowOutput, WorkflowRequest};
