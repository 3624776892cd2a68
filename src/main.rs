//! taskmaster - plain-text task list with subtasks and recurring tasks

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = taskmaster::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
