//! gen-readme CLI: README.rst and HTML previews for Odoo addons.
//!
//! The binary is a thin wrapper around [`run`]; exit codes are derived from
//! the returned error with [`error::exit_code_from_error`].

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

mod cli;
mod commands;
pub mod error;
mod utils;

pub use cli::Cli;

use crate::utils::initialize_logging;

/// Execute gen-readme with the process arguments.
///
/// # Errors
///
/// Returns an error, usually a categorized [`error::CliError`], when a check
/// fails or an addon could not be processed.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;
    execute(&cli)
}

fn execute(cli: &Cli) -> Result<()> {
    if !cli.files.is_empty() {
        let root = cli.addons_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        return commands::check_changed_files(&root, &cli.files, cli.quiet);
    }
    match cli.addons_dir.as_deref() {
        Some(addons_dir) => commands::generate_readmes(cli, addons_dir),
        None => {
            Cli::command().print_help()?;
            Ok(())
        },
    }
}
