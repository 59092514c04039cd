//! Task setup, replay, and environment verification for the ContextCore
//! self-tracking demo.
//!
//! Three entry points back the three binaries: [`run_task_setup`],
//! [`run_demo_runner`], and [`run_setup_environment`].

pub mod adapters;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod materialize;
pub mod pipeline;
pub mod ports;
pub mod prereq;
pub mod runner;
pub mod store;

use std::ffi::OsString;

use clap::Parser;

/// Parses arguments, printing help or version and returning `None` when asked.
fn parse<P, I, T>(args: I) -> Result<Option<P>, String>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match P::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            Ok(None)
        }
        Err(err) => Err(err.to_string()),
    }
}

/// Run `task-setup` with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or materialization fails.
pub fn run_task_setup<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match parse::<cli::TaskSetupCli, _, _>(args)? {
        Some(cli) => commands::task_setup::run(&cli),
        None => Ok(()),
    }
}

/// Run `demo-runner` with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails, prerequisites are
/// unmet, or a task fails.
pub fn run_demo_runner<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match parse::<cli::DemoRunnerCli, _, _>(args)? {
        Some(cli) => commands::demo_runner::run(&cli),
        None => Ok(()),
    }
}

/// Run `setup-environment` with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or the pipeline halts.
pub fn run_setup_environment<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match parse::<cli::SetupEnvironmentCli, _, _>(args)? {
        Some(cli) => commands::setup_environment::run(&cli),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_is_not_an_error() {
        assert!(run_task_setup(["task-setup", "--help"]).is_ok());
        assert!(run_demo_runner(["demo-runner", "--version"]).is_ok());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        let err = run_demo_runner(["demo-runner", "--bogus"]).unwrap_err();
        assert!(err.contains("--bogus"));
    }
}
