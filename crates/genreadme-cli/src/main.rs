//! gen-readme binary entry point.

use colored::Colorize;
use std::process::ExitCode;

use genreadme_cli::error::exit_code_from_error;

fn main() -> ExitCode {
    match genreadme_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
