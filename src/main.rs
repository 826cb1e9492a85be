//! Quire: compile reusable text fragments into agent documents.
//!
//! This is the main entry point for the `quire` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and handles errors with
//! proper exit codes.

mod cli;
mod commands;
pub mod compile;
pub mod config;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod fragment;
pub mod fs;
mod logging;
pub mod profile;
pub mod registry;
pub mod resolve;
pub mod validate;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose());

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
