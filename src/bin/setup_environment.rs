//! Binary entrypoint for `setup-environment`.

use std::process::ExitCode;

fn main() -> ExitCode {
    match contextcore_demo::run_setup_environment(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
