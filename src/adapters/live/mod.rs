//! Live adapters for real external interactions.

pub mod clock;
pub mod environment;
pub mod filesystem;
pub mod http;
pub mod id_gen;
pub mod prompt;
pub mod shell;
pub mod workflow;
