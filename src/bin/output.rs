//! `output` entry point.

use std::io;
use std::process::ExitCode;

use available::cli::{init_tracing, Command, OutputCli, OutputCommand};
use clap::Parser;

fn main() -> ExitCode {
    let cli = OutputCli::parse();
    init_tracing(cli.debug);

    tracing::debug!("output starting with args: {:?}", cli);

    let command = OutputCommand::new(cli);
    let mut stdout = io::stdout().lock();

    match command.execute(&mut stdout) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
