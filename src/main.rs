//! Taskgate: schema-driven checklist gates for agentic coding pipelines.
//!
//! This is the main entry point for the `taskgate` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and handles errors with
//! proper exit codes.

use std::process::ExitCode;
use taskgate::cli::Cli;
use taskgate::error::TaskgateError;
use taskgate::{commands, exit_codes, logging};

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse_args();

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // A block is an expected outcome; its directive is the whole message.
            match &err {
                TaskgateError::Blocked(directive) => eprintln!("{}", directive),
                _ => eprintln!("Error: {}", err),
            }

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
