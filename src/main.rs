//! `available` entry point.

use std::io;
use std::process::ExitCode;

use available::cli::{init_tracing, AvailableCli, Command, StatusCommand};
use clap::Parser;

/// Exit code for invalid users and missing privileges.
const VALIDATION_EXIT: u8 = 2;

fn main() -> ExitCode {
    let cli = AvailableCli::parse();
    init_tracing(cli.debug);

    tracing::debug!("available starting with args: {:?}", cli);

    let command = StatusCommand::new(cli);
    let mut stdout = io::stdout().lock();

    match command.execute(&mut stdout) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) if e.is_validation() => {
            eprintln!("Error: {}", e);
            ExitCode::from(VALIDATION_EXIT)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
