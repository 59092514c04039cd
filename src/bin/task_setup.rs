//! Binary entrypoint for `task-setup`.

use std::process::ExitCode;

fn main() -> ExitCode {
    match contextcore_demo::run_task_setup(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
