//! Shell executor port for running external commands.

use super::PortError;

/// The output of a shell command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// The exit code of the process.
    pub exit_code: i32,
    /// The captured standard output.
    pub stdout: String,
    /// The captured standard error.
    pub stderr: String,
}

impl ShellOutput {
    /// Returns `true` when the command exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns `true` when the shell could not find the program (exit 127).
    #[must_use]
    pub fn not_found(&self) -> bool {
        self.exit_code == 127
    }

    /// First non-empty stdout line, trimmed. Version probes report this.
    #[must_use]
    pub fn first_line(&self) -> Option<&str> {
        self.stdout.lines().map(str::trim).find(|l| !l.is_empty())
    }

    /// Last non-empty line of stdout, or of stderr when `stderr` is set.
    #[must_use]
    pub fn last_line(&self, stderr: bool) -> Option<&str> {
        let text = if stderr { &self.stderr } else { &self.stdout };
        text.lines().map(str::trim).rfind(|l| !l.is_empty())
    }
}

/// Executes shell commands.
///
/// Used for `--version` probes and the external data generator/loader.
pub trait ShellExecutor: Send + Sync {
    /// Runs a command string in the system shell and returns its output.
    ///
    /// A command that runs and exits non-zero is `Ok` with that exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell itself cannot be spawned.
    fn run(&self, command: &str) -> Result<ShellOutput, PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(exit_code: i32, stdout: &str, stderr: &str) -> ShellOutput {
        ShellOutput { exit_code, stdout: stdout.into(), stderr: stderr.into() }
    }

    #[test]
    fn lines_skip_blank_padding() {
        let out = output(0, "\ncontextcore 0.4.1\n\nwrote 120 spans\n\n", "");
        assert_eq!(out.first_line(), Some("contextcore 0.4.1"));
        assert_eq!(out.last_line(false), Some("wrote 120 spans"));
        assert_eq!(out.last_line(true), None);
    }

    #[test]
    fn exit_127_means_not_found() {
        assert!(output(127, "", "sh: contextcore: not found").not_found());
        assert!(!output(1, "", "").not_found());
    }
}
