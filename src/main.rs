//! Binary entrypoint for `demo-runner`.

use std::process::ExitCode;

fn main() -> ExitCode {
    match contextcore_demo::run_demo_runner(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
