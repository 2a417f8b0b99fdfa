//! Pre-commit mode: every changed addon must have a `readme/` directory.
//!
//! ```bash
//! gen-readme sale_ux/models/sale_order.py crm_ux/__manifest__.py
//! ```

use anyhow::{Result, anyhow};
use colored::Colorize;
use genreadme_core::check_fragment_dirs;
use genreadme_core::fragment::FRAGMENTS_DIR;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::CliError;

/// Check the addons touched by `files`, relative to `root`.
///
/// Every offending addon is reported before the command fails.
pub fn execute(root: &Path, files: &[PathBuf], quiet: bool) -> Result<()> {
    debug!("checking {} changed files under {}", files.len(), root.display());
    let missing = check_fragment_dirs(root, files).map_err(CliError::from)?;

    for addon in &missing {
        eprintln!(
            "{} {}: no {FRAGMENTS_DIR}/ directory (run `gen-readme --addons-dir {} --init-fragments`)",
            "✗".red(),
            addon.name.bold(),
            root.display()
        );
    }

    if missing.is_empty() {
        if !quiet {
            println!("{} all changed addons have {FRAGMENTS_DIR}/ fragments", "✓".green());
        }
        return Ok(());
    }

    Err(CliError::missing_fragments(anyhow!(
        "{} addon(s) without a {FRAGMENTS_DIR}/ directory",
        missing.len()
    ))
    .into())
}
