//! Live shell executor using `std::process::Command`.
//!
//! Stdin is closed so a probe or generator never waits on the terminal.

use std::process::{Command, Stdio};

use crate::ports::shell::{ShellExecutor, ShellOutput};
use crate::ports::PortError;

/// Live shell executor that runs commands via the system shell.
pub struct LiveShellExecutor;

impl ShellExecutor for LiveShellExecutor {
    fn run(&self, command: &str) -> Result<ShellOutput, PortError> {
        tracing::debug!(command, "running shell command");
        let output =
            Command::new("sh").arg("-c").arg(command).stdin(Stdio::null()).output()?;
        Ok(ShellOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
